//! Raw WHOIS (RFC 3912) client.
//!
//! One TCP connection per query: send `<name>\r\n`, then read until the
//! server closes the stream. Every network stage runs under a single
//! per-query deadline, and the reply is capped so a misbehaving server
//! cannot grow the buffer without bound.

use crate::error::ScanError;
use crate::types::{DEFAULT_MAX_RESPONSE_BYTES, WHOIS_PORT};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, trace};

/// Anything that can answer "what does this server say about this name".
///
/// The scanner only depends on this trait, so tests can swap in an
/// instrumented or scripted client.
#[async_trait]
pub trait LookupClient: Send + Sync {
    /// Query `server` for `domain` and return the raw reply text.
    async fn query(&self, domain: &str, server: &str) -> Result<String, ScanError>;
}

/// WHOIS client speaking the line protocol over TCP.
#[derive(Debug, Clone)]
pub struct WhoisClient {
    /// Deadline for the whole exchange
    timeout: Duration,
    /// Port to connect to
    port: u16,
    /// Largest reply accepted
    max_response_bytes: usize,
}

impl WhoisClient {
    /// Create a new WHOIS client with default settings.
    pub fn new() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            port: WHOIS_PORT,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
        }
    }

    /// Create a new WHOIS client with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::new()
        }
    }

    /// Use a non-standard port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Cap the reply size.
    pub fn max_response_bytes(mut self, limit: usize) -> Self {
        self.max_response_bytes = limit;
        self
    }

    /// Resolve, connect, exchange. The socket is dropped on every path out.
    async fn lookup(&self, domain: &str, server: &str) -> Result<String, ScanError> {
        let deadline = Instant::now() + self.timeout;

        let addrs: Vec<_> = timeout_at(deadline, tokio::net::lookup_host((server, self.port)))
            .await
            .map_err(|_| ScanError::timeout(format!("resolving {}", server), self.timeout))?
            .map_err(|e| ScanError::host_resolution(server, e.to_string()))?
            .collect();

        if addrs.is_empty() {
            return Err(ScanError::host_resolution(server, "no addresses returned"));
        }
        trace!(server, ?addrs, "resolved lookup server");

        let stream = timeout_at(deadline, TcpStream::connect(&addrs[..]))
            .await
            .map_err(|_| ScanError::timeout(format!("connecting to {}", server), self.timeout))?
            .map_err(|e| ScanError::connection(server, e.to_string()))?;

        exchange(
            stream,
            domain,
            server,
            self.max_response_bytes,
            deadline,
            self.timeout,
        )
        .await
    }
}

impl Default for WhoisClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LookupClient for WhoisClient {
    async fn query(&self, domain: &str, server: &str) -> Result<String, ScanError> {
        let started = std::time::Instant::now();
        let reply = self.lookup(domain, server).await?;
        debug!(
            domain,
            server,
            bytes = reply.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "whois reply received"
        );
        Ok(reply)
    }
}

/// Run the request/reply exchange on an already-open stream.
///
/// Writes `<domain>\r\n` as the whole request, then reads to end-of-stream.
/// A reply longer than `limit` bytes is an error rather than being silently
/// truncated.
pub(crate) async fn exchange<S>(
    mut stream: S,
    domain: &str,
    server: &str,
    limit: usize,
    deadline: Instant,
    budget: Duration,
) -> Result<String, ScanError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = format!("{}\r\n", domain);

    timeout_at(deadline, async {
        stream.write_all(request.as_bytes()).await?;
        stream.flush().await
    })
    .await
    .map_err(|_| ScanError::timeout(format!("sending query to {}", server), budget))?
    .map_err(|e| ScanError::write(server, e.to_string()))?;

    // Read one byte past the cap so an oversize reply is detectable.
    let mut buf = Vec::new();
    let mut limited = (&mut stream).take((limit as u64).saturating_add(1));
    timeout_at(deadline, limited.read_to_end(&mut buf))
        .await
        .map_err(|_| ScanError::timeout(format!("reading reply from {}", server), budget))?
        .map_err(|e| ScanError::read(server, e.to_string()))?;

    if buf.len() > limit {
        return Err(ScanError::ResponseTooLarge {
            server: server.to_string(),
            limit,
        });
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    fn far_deadline() -> Instant {
        Instant::now() + Duration::from_secs(30)
    }

    #[tokio::test]
    async fn test_exchange_sends_crlf_terminated_name() {
        let stream = Builder::new()
            .write(b"example.com\r\n")
            .read(b"Domain Name: EXAMPLE.COM\r\n")
            .build();

        let reply = exchange(
            stream,
            "example.com",
            "whois.test",
            1024,
            far_deadline(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(reply, "Domain Name: EXAMPLE.COM\r\n");
    }

    #[tokio::test]
    async fn test_exchange_reads_every_chunk_until_eof() {
        let chunk = vec![b'x'; 4096];
        let stream = Builder::new()
            .write(b"example.io\r\n")
            .read(&chunk)
            .read(&chunk)
            .read(&chunk)
            .read(b"\nNo match for EXAMPLE.IO\n")
            .build();

        let reply = exchange(
            stream,
            "example.io",
            "whois.test",
            64 * 1024,
            far_deadline(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert_eq!(reply.len(), 3 * 4096 + 25);
        assert!(reply.ends_with("No match for EXAMPLE.IO\n"));
    }

    #[tokio::test]
    async fn test_exchange_rejects_oversize_reply() {
        let stream = Builder::new()
            .write(b"example.io\r\n")
            .read(&[b'x'; 65])
            .build();

        let err = exchange(
            stream,
            "example.io",
            "whois.test",
            64,
            far_deadline(),
            Duration::from_secs(30),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScanError::ResponseTooLarge { limit: 64, .. }));
    }

    #[tokio::test]
    async fn test_exchange_surfaces_read_errors() {
        let stream = Builder::new()
            .write(b"example.io\r\n")
            .read(b"partial")
            .read_error(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "reset by peer",
            ))
            .build();

        let err = exchange(
            stream,
            "example.io",
            "whois.test",
            1024,
            far_deadline(),
            Duration::from_secs(30),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ScanError::Read { .. }));
    }

    #[tokio::test]
    async fn test_exchange_accepts_empty_reply() {
        let stream = Builder::new().write(b"example.io\r\n").build();

        let reply = exchange(
            stream,
            "example.io",
            "whois.test",
            1024,
            far_deadline(),
            Duration::from_secs(30),
        )
        .await
        .unwrap();
        assert!(reply.is_empty());
    }

    #[tokio::test]
    async fn test_unresolvable_host_is_a_resolution_error() {
        let client = WhoisClient::with_timeout(Duration::from_secs(5));
        let err = client
            .query("example.zz", "whois.nic.invalid")
            .await
            .unwrap_err();
        assert!(
            matches!(
                err,
                ScanError::HostResolution { .. } | ScanError::Timeout { .. }
            ),
            "unexpected error: {}",
            err
        );
    }

    #[test]
    fn test_whois_client_creation() {
        let client = WhoisClient::new();
        assert_eq!(client.timeout, Duration::from_secs(10));
        assert_eq!(client.port, 43);

        let custom = WhoisClient::with_timeout(Duration::from_secs(3)).port(4343);
        assert_eq!(custom.timeout, Duration::from_secs(3));
        assert_eq!(custom.port, 4343);
    }
}
