// tld-scan-lib/tests/integration.rs

//! End-to-end tests: the real WHOIS client against local fake servers.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tld_scan_lib::{
    default_suffixes, get_available_presets, get_preset_suffixes, LookupClient, ScanConfig,
    ScanError, SuffixChecker, SuffixRegistry, Verdict,
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;

/// What the fake server does for a given query.
enum Behavior {
    Reply(String),
    Chunked(Vec<String>),
    Hang,
}

/// Start a WHOIS-like server on an ephemeral port. Each connection reads
/// one CRLF-terminated name and acts according to `respond`.
async fn spawn_server<F>(respond: F) -> u16
where
    F: Fn(&str) -> Behavior + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let respond = Arc::new(respond);

    tokio::spawn(async move {
        loop {
            let Ok((socket, _)) = listener.accept().await else {
                return;
            };
            let respond = Arc::clone(&respond);
            tokio::spawn(async move {
                let mut reader = BufReader::new(socket);
                let mut line = String::new();
                if reader.read_line(&mut line).await.is_err() {
                    return;
                }
                let name = line.trim_end_matches(['\r', '\n']).to_string();
                let mut socket = reader.into_inner();

                match respond(&name) {
                    Behavior::Reply(text) => {
                        let _ = socket.write_all(text.as_bytes()).await;
                    }
                    Behavior::Chunked(chunks) => {
                        for chunk in chunks {
                            let _ = socket.write_all(chunk.as_bytes()).await;
                            let _ = socket.flush().await;
                            tokio::time::sleep(Duration::from_millis(5)).await;
                        }
                    }
                    Behavior::Hang => {
                        tokio::time::sleep(Duration::from_secs(30)).await;
                    }
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    port
}

fn local_registry(suffixes: &[&str]) -> SuffixRegistry {
    SuffixRegistry::new(suffixes.iter().map(|s| (*s, "127.0.0.1")))
}

fn suffix_list(suffixes: &[&str]) -> Vec<String> {
    suffixes.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_com_registered_io_available() {
    let port = spawn_server(|name| match name {
        "example.com" => Behavior::Reply(
            "   Domain Name: EXAMPLE.COM\r\n   Registrar: RESERVED-Internet Assigned Numbers Authority\r\n"
                .to_string(),
        ),
        _ => Behavior::Reply(format!("NOT FOUND\r\n>>> Last update: {}\r\n", name)),
    })
    .await;

    let config = ScanConfig::default()
        .with_port(port)
        .with_timeout(Duration::from_secs(5))
        .with_suffixes(suffix_list(&["com", "io"]));
    let checker = SuffixChecker::with_config(config).with_registry(local_registry(&["com", "io"]));

    let mut progress = Vec::new();
    let report = checker
        .scan_with_progress("example", |r| progress.push((r.domain.clone(), r.verdict)))
        .await
        .unwrap();

    assert_eq!(report.available(), &["example.io".to_string()]);
    assert_eq!(report.registered(), vec!["example.com"]);
    assert_eq!(report.failed_count, 0);
    assert_eq!(progress.len(), 2);
    assert!(progress.contains(&("example.io".to_string(), Verdict::Available)));
}

#[tokio::test]
async fn test_long_reply_is_read_to_end() {
    // The deciding phrase arrives only in the last chunk.
    let port = spawn_server(|_| {
        let mut chunks: Vec<String> = (0..20)
            .map(|i| format!("% comment line {} {}\r\n", i, "x".repeat(500)))
            .collect();
        chunks.push("%\r\n% No entries found for the selected source(s).\r\n".to_string());
        Behavior::Chunked(chunks)
    })
    .await;

    let config = ScanConfig::default()
        .with_port(port)
        .with_timeout(Duration::from_secs(5))
        .with_suffixes(suffix_list(&["de"]));
    let checker = SuffixChecker::with_config(config).with_registry(local_registry(&["de"]));

    let report = checker.scan("example").await.unwrap();
    assert_eq!(report.available(), &["example.de".to_string()]);
}

#[tokio::test]
async fn test_hung_server_counts_as_registered_without_blocking_others() {
    let port = spawn_server(|name| match name {
        "example.io" => Behavior::Hang,
        _ => Behavior::Reply("No match for domain\r\n".to_string()),
    })
    .await;

    let config = ScanConfig::default()
        .with_port(port)
        .with_timeout(Duration::from_millis(500))
        .with_concurrency(2)
        .with_suffixes(suffix_list(&["io", "com", "net", "org"]));
    let checker = SuffixChecker::with_config(config)
        .with_registry(local_registry(&["io", "com", "net", "org"]));

    let started = Instant::now();
    let report = checker.scan("example").await.unwrap();

    assert!(started.elapsed() < Duration::from_secs(10));
    assert_eq!(report.total(), 4);
    assert_eq!(
        report.available(),
        &[
            "example.com".to_string(),
            "example.net".to_string(),
            "example.org".to_string()
        ]
    );
    let hung = report
        .results
        .iter()
        .find(|r| r.domain == "example.io")
        .unwrap();
    assert_eq!(hung.verdict, Verdict::Registered);
    assert!(hung.is_failure());
}

#[tokio::test]
async fn test_oversize_reply_is_a_failure() {
    let port = spawn_server(|_| Behavior::Reply(format!("No match\r\n{}", "y".repeat(4096)))).await;

    let config = ScanConfig::default()
        .with_port(port)
        .with_timeout(Duration::from_secs(5))
        .with_max_response_bytes(1024)
        .with_suffixes(suffix_list(&["io"]));
    let checker = SuffixChecker::with_config(config).with_registry(local_registry(&["io"]));

    let report = checker.scan("example").await.unwrap();
    assert!(report.available().is_empty());
    assert_eq!(report.failed_count, 1);
}

#[tokio::test]
async fn test_refused_connection_counts_as_registered() {
    // Bind then drop to get a port with nothing listening.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };

    let config = ScanConfig::default()
        .with_port(port)
        .with_timeout(Duration::from_secs(2))
        .with_suffixes(suffix_list(&["io"]));
    let checker = SuffixChecker::with_config(config).with_registry(local_registry(&["io"]));

    let report = checker.scan("example").await.unwrap();
    assert!(report.available().is_empty());
    assert_eq!(report.results[0].verdict, Verdict::Registered);
    assert!(report.results[0].is_failure());
}

#[tokio::test]
async fn test_unresolvable_server_counts_as_registered() {
    let config = ScanConfig::default()
        .with_timeout(Duration::from_secs(3))
        .with_suffixes(suffix_list(&["zz"]));
    let checker = SuffixChecker::with_config(config)
        .with_registry(SuffixRegistry::new([("zz", "whois.nic.invalid")]));

    let report = checker.scan("example").await.unwrap();
    assert!(report.available().is_empty());
    assert_eq!(report.failed_count, 1);
}

/// Counts how many lookups are in flight at once.
struct InstrumentedClient {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

#[async_trait]
impl LookupClient for InstrumentedClient {
    async fn query(&self, _domain: &str, _server: &str) -> Result<String, ScanError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok("Domain Name: TAKEN\r\n".to_string())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_every_default_suffix_gets_a_result() {
    let client = InstrumentedClient {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        calls: AtomicUsize::new(0),
    };
    let config = ScanConfig::default().with_concurrency(4);
    let checker = SuffixChecker::with_client(config, client);

    let report = checker.scan("example").await.unwrap();

    let expected = default_suffixes().len();
    assert_eq!(report.total(), expected);
    assert!(report.available().is_empty());
    assert_eq!(report.registered_count, expected);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_peak_concurrency_never_exceeds_limit() {
    let client = Arc::new(InstrumentedClient {
        in_flight: AtomicUsize::new(0),
        peak: AtomicUsize::new(0),
        calls: AtomicUsize::new(0),
    });

    struct Shared(Arc<InstrumentedClient>);

    #[async_trait]
    impl LookupClient for Shared {
        async fn query(&self, domain: &str, server: &str) -> Result<String, ScanError> {
            self.0.query(domain, server).await
        }
    }

    let suffixes = get_preset_suffixes("all").unwrap();
    let config = ScanConfig::default()
        .with_concurrency(3)
        .with_suffixes(suffixes.clone());
    let checker = SuffixChecker::with_client(config, Shared(Arc::clone(&client)));

    let report = checker.scan("example").await.unwrap();

    assert_eq!(report.total(), suffixes.len());
    assert_eq!(client.calls.load(Ordering::SeqCst), suffixes.len());
    assert!(client.peak.load(Ordering::SeqCst) <= 3);
    assert!(client.peak.load(Ordering::SeqCst) >= 1);
    assert_eq!(client.in_flight.load(Ordering::SeqCst), 0);
}

#[test]
fn test_library_exports_work() {
    let all = default_suffixes();
    assert!(all.contains(&"com".to_string()));
    assert!(all.contains(&"io".to_string()));

    let presets = get_available_presets();
    assert!(presets.contains(&"classic"));
    assert!(presets.contains(&"all"));

    for preset in presets {
        let suffixes = get_preset_suffixes(preset).unwrap();
        for suffix in suffixes {
            assert!(all.contains(&suffix), "preset '{}' has '{}'", preset, suffix);
        }
    }
}
