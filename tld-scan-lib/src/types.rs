//! Core data types for suffix scanning.
//!
//! This module defines the candidate queries fed to the dispatcher, the
//! verdicts the classifier produces, per-suffix results and the scan
//! configuration.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Default number of lookups allowed in flight at once.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Well-known WHOIS port (RFC 3912).
pub const WHOIS_PORT: u16 = 43;

/// Default cap on a single reply. Registry replies are a few KiB; this only
/// guards against a server that never stops talking.
pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// One root name paired with one suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateQuery {
    pub root: String,
    pub suffix: String,
}

impl CandidateQuery {
    pub fn new<R: Into<String>, S: Into<String>>(root: R, suffix: S) -> Self {
        Self {
            root: root.into(),
            suffix: suffix.into(),
        }
    }

    /// The fully-qualified name, e.g. `example.io`.
    pub fn fqdn(&self) -> String {
        format!("{}.{}", self.root, self.suffix)
    }
}

impl fmt::Display for CandidateQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.root, self.suffix)
    }
}

/// Binary outcome for one fully-qualified name.
///
/// `Registered` is the conservative default: anything that is not clear
/// evidence of a free name ends up here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Available,
    Registered,
}

impl Verdict {
    pub fn is_available(self) -> bool {
        matches!(self, Verdict::Available)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Available => write!(f, "available"),
            Verdict::Registered => write!(f, "registered"),
        }
    }
}

/// Result of probing one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// The fully-qualified name that was checked (e.g., "example.io")
    pub domain: String,

    /// Suffix this result belongs to
    pub suffix: String,

    /// Lookup server that was queried
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Final verdict for this name
    pub verdict: Verdict,

    /// The reply phrase that decided the verdict, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<String>,

    /// How long the lookup took
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_duration: Option<Duration>,

    /// Why the lookup failed, when the verdict was forced to `Registered`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl ScanResult {
    /// Build the conservative result for a candidate whose lookup failed.
    pub fn failed(query: &CandidateQuery, server: Option<String>, reason: String) -> Self {
        Self {
            domain: query.fqdn(),
            suffix: query.suffix.clone(),
            server,
            verdict: Verdict::Registered,
            matched: None,
            check_duration: None,
            error_message: Some(reason),
        }
    }

    /// Whether this verdict was forced by a failure rather than a reply.
    pub fn is_failure(&self) -> bool {
        self.error_message.is_some()
    }
}

/// Configuration options for a scan.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Maximum number of lookups in flight
    /// Default: 5, Range: 1-100
    pub concurrency: usize,

    /// Deadline for one whole lookup (resolve, connect, write, read)
    /// Default: 10 seconds
    pub timeout: Duration,

    /// TCP port of the lookup service
    /// Default: 43
    pub port: u16,

    /// Largest reply accepted before the lookup counts as failed
    pub max_response_bytes: usize,

    /// Suffixes to check. `None` means the built-in default list.
    pub suffixes: Option<Vec<String>>,

    /// User-defined suffix presets from config files
    pub custom_presets: HashMap<String, Vec<String>>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            timeout: Duration::from_secs(10),
            port: WHOIS_PORT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            suffixes: None,
            custom_presets: HashMap::new(),
        }
    }
}

impl ScanConfig {
    /// Set the admission limit. Clamped to 1..=100.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 100);
        self
    }

    /// Set the per-lookup deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the lookup port (tests point this at a local listener).
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the reply size cap.
    pub fn with_max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit.max(1);
        self
    }

    /// Set the suffixes to check.
    pub fn with_suffixes(mut self, suffixes: Vec<String>) -> Self {
        self.suffixes = Some(suffixes);
        self
    }
}
