//! Error handling for suffix scanning operations.
//!
//! Lookup failures are never fatal to a scan: the checker folds every
//! per-suffix error into a conservative "registered" verdict. The variants
//! here still carry enough context to explain *why* a suffix was folded.

use std::fmt;
use std::time::Duration;

/// Main error type for scanning operations.
#[derive(Debug, Clone)]
pub enum ScanError {
    /// Root name rejected before any lookup happened
    InvalidRoot { root: String, reason: String },

    /// The lookup server's hostname could not be resolved
    HostResolution { server: String, message: String },

    /// TCP connection to the lookup server failed
    Connection { server: String, message: String },

    /// Sending the query line failed
    Write { server: String, message: String },

    /// Reading the reply failed before end-of-stream
    Read { server: String, message: String },

    /// The reply exceeded the configured byte cap
    ResponseTooLarge { server: String, limit: usize },

    /// A network stage did not finish before the query deadline
    Timeout {
        operation: String,
        duration: Duration,
    },

    /// Configuration errors (invalid settings, bad TOML, etc.)
    ConfigError { message: String },

    /// File I/O errors when reading configuration
    FileError { path: String, message: String },

    /// Generic internal errors that don't fit other categories
    Internal { message: String },
}

impl ScanError {
    /// Create a new invalid root error.
    pub fn invalid_root<R: Into<String>, M: Into<String>>(root: R, reason: M) -> Self {
        Self::InvalidRoot {
            root: root.into(),
            reason: reason.into(),
        }
    }

    /// Create a new host resolution error.
    pub fn host_resolution<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::HostResolution {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new connection error.
    pub fn connection<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Connection {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new write error.
    pub fn write<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Write {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new read error.
    pub fn read<S: Into<String>, M: Into<String>>(server: S, message: M) -> Self {
        Self::Read {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Create a new timeout error.
    pub fn timeout<O: Into<String>>(operation: O, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create a new configuration error.
    pub fn config<M: Into<String>>(message: M) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a new file error.
    pub fn file_error<P: Into<String>, M: Into<String>>(path: P, message: M) -> Self {
        Self::FileError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a new internal error.
    pub fn internal<M: Into<String>>(message: M) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from talking to a lookup server.
    ///
    /// Network errors are absorbed per suffix; everything else is a
    /// problem with the caller's input or configuration.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::HostResolution { .. }
                | Self::Connection { .. }
                | Self::Write { .. }
                | Self::Read { .. }
                | Self::ResponseTooLarge { .. }
                | Self::Timeout { .. }
        )
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRoot { root, reason } => {
                write!(f, "Invalid root name '{}': {}", root, reason)
            }
            Self::HostResolution { server, message } => {
                write!(f, "Could not resolve '{}': {}", server, message)
            }
            Self::Connection { server, message } => {
                write!(f, "Connection to '{}' failed: {}", server, message)
            }
            Self::Write { server, message } => {
                write!(f, "Sending query to '{}' failed: {}", server, message)
            }
            Self::Read { server, message } => {
                write!(f, "Reading reply from '{}' failed: {}", server, message)
            }
            Self::ResponseTooLarge { server, limit } => {
                write!(f, "Reply from '{}' exceeded {} bytes", server, limit)
            }
            Self::Timeout {
                operation,
                duration,
            } => {
                write!(f, "Timeout after {:?} during: {}", duration, operation)
            }
            Self::ConfigError { message } => {
                write!(f, "Configuration error: {}", message)
            }
            Self::FileError { path, message } => {
                write!(f, "File error at '{}': {}", path, message)
            }
            Self::Internal { message } => {
                write!(f, "Internal error: {}", message)
            }
        }
    }
}

impl std::error::Error for ScanError {}

impl From<std::io::Error> for ScanError {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {}", err),
        }
    }
}

impl From<toml::de::Error> for ScanError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigError {
            message: format!("Failed to parse TOML configuration: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_failures_are_classified() {
        assert!(ScanError::connection("whois.nic.io", "refused").is_lookup_failure());
        assert!(ScanError::timeout("connect", Duration::from_secs(1)).is_lookup_failure());
        assert!(ScanError::ResponseTooLarge {
            server: "whois.nic.io".to_string(),
            limit: 10,
        }
        .is_lookup_failure());

        assert!(!ScanError::invalid_root("", "empty").is_lookup_failure());
        assert!(!ScanError::config("bad").is_lookup_failure());
    }

    #[test]
    fn test_display_names_the_server() {
        let err = ScanError::host_resolution("whois.nic.zz", "no such host");
        assert_eq!(
            err.to_string(),
            "Could not resolve 'whois.nic.zz': no such host"
        );
    }
}
