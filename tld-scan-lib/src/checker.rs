//! Main suffix scanner implementation.
//!
//! This module provides the `SuffixChecker` that ties the pieces together:
//! resolve a suffix to its lookup server, query it, classify the reply, and
//! fan that out across every suffix under a bounded admission limit.

use crate::classifier::classify_detailed;
use crate::concurrent::ConcurrentProcessor;
use crate::error::ScanError;
use crate::protocols::{default_suffixes, LookupClient, SuffixRegistry, WhoisClient};
use crate::report::ScanReport;
use crate::types::{CandidateQuery, ScanConfig, ScanResult, Verdict};
use crate::utils::{build_candidates, normalize_suffixes, validate_root_name};
use futures::stream::{Stream, StreamExt};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Scans one root name across many suffixes.
///
/// The checker is generic over its [`LookupClient`] so the network layer can
/// be replaced; [`SuffixChecker::new`] and [`SuffixChecker::with_config`]
/// use the TCP [`WhoisClient`].
///
/// # Example
///
/// ```rust,no_run
/// use tld_scan_lib::{ScanConfig, SuffixChecker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ScanConfig::default()
///         .with_suffixes(vec!["com".to_string(), "io".to_string()]);
///     let checker = SuffixChecker::with_config(config);
///     let report = checker.scan("example").await?;
///     for name in report.available() {
///         println!("{}", name);
///     }
///     Ok(())
/// }
/// ```
pub struct SuffixChecker<L = WhoisClient> {
    config: ScanConfig,
    registry: Arc<SuffixRegistry>,
    client: Arc<L>,
}

impl<L> Clone for SuffixChecker<L> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            registry: Arc::clone(&self.registry),
            client: Arc::clone(&self.client),
        }
    }
}

impl SuffixChecker<WhoisClient> {
    /// Create a checker with default configuration and the built-in server table.
    pub fn new() -> Self {
        Self::with_config(ScanConfig::default())
    }

    /// Create a checker whose WHOIS client follows `config`'s timeout, port
    /// and reply cap.
    pub fn with_config(config: ScanConfig) -> Self {
        let client = WhoisClient::with_timeout(config.timeout)
            .port(config.port)
            .max_response_bytes(config.max_response_bytes);
        Self::with_client(config, client)
    }
}

impl Default for SuffixChecker<WhoisClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L> SuffixChecker<L>
where
    L: LookupClient + 'static,
{
    /// Create a checker around any lookup client.
    pub fn with_client(config: ScanConfig, client: L) -> Self {
        Self {
            config,
            registry: Arc::new(SuffixRegistry::builtin()),
            client: Arc::new(client),
        }
    }

    /// Replace the suffix -> server table.
    pub fn with_registry(mut self, registry: SuffixRegistry) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn registry(&self) -> &SuffixRegistry {
        &self.registry
    }

    /// The suffixes a scan will check: the configured list, or the default
    /// list when none is set. Normalised and deduplicated.
    pub fn suffixes(&self) -> Result<Vec<String>, ScanError> {
        match &self.config.suffixes {
            Some(list) => normalize_suffixes(list),
            None => Ok(default_suffixes()),
        }
    }

    /// Look up a single candidate.
    ///
    /// Never fails: a lookup error of any kind yields `Registered` with the
    /// error recorded on the result.
    pub async fn check_candidate(&self, query: &CandidateQuery) -> ScanResult {
        let server = self.registry.resolve_server(&query.suffix);
        let domain = query.fqdn();
        let started = Instant::now();

        let outcome = match tokio::time::timeout(
            self.config.timeout,
            self.client.query(&domain, &server),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(ScanError::timeout(
                format!("lookup of {}", domain),
                self.config.timeout,
            )),
        };

        match outcome {
            Ok(reply) => {
                let classification = classify_detailed(&reply);
                debug!(
                    domain = %domain,
                    server = %server,
                    verdict = %classification.verdict,
                    matched = ?classification.signal.phrase(),
                    "classified reply"
                );
                ScanResult {
                    domain,
                    suffix: query.suffix.clone(),
                    server: Some(server),
                    verdict: classification.verdict,
                    matched: classification.signal.phrase().map(str::to_string),
                    check_duration: Some(started.elapsed()),
                    error_message: None,
                }
            }
            Err(e) => {
                debug!(
                    domain = %domain,
                    server = %server,
                    error = %e,
                    "lookup failed, counting name as registered"
                );
                let mut result = ScanResult::failed(query, Some(server), e.to_string());
                result.check_duration = Some(started.elapsed());
                result
            }
        }
    }

    /// Check `root` under every suffix in `suffixes` and return one result
    /// per distinct suffix, in completion order.
    ///
    /// `on_result` sees each result as soon as it is recorded.
    pub async fn run_all<P>(
        &self,
        root: &str,
        suffixes: &[String],
        on_result: P,
    ) -> Result<Vec<ScanResult>, ScanError>
    where
        P: FnMut(&ScanResult),
    {
        let root = validate_root_name(root)?;
        let suffixes = normalize_suffixes(suffixes)?;
        let candidates = build_candidates(&root, &suffixes);

        info!(
            root = %root,
            suffixes = candidates.len(),
            concurrency = self.config.concurrency,
            "starting scan"
        );

        let checker = self.clone();
        let processor = ConcurrentProcessor::new(self.config.concurrency);
        let results = processor
            .run(
                candidates,
                move |query| {
                    let checker = checker.clone();
                    async move { checker.check_candidate(&query).await }
                },
                on_result,
            )
            .await;

        Ok(results)
    }

    /// Scan `root` across the configured suffixes and build a report.
    pub async fn scan(&self, root: &str) -> Result<ScanReport, ScanError> {
        self.scan_with_progress(root, |_| {}).await
    }

    /// Like [`SuffixChecker::scan`], calling `on_result` as each suffix finishes.
    pub async fn scan_with_progress<P>(
        &self,
        root: &str,
        on_result: P,
    ) -> Result<ScanReport, ScanError>
    where
        P: FnMut(&ScanResult),
    {
        let root = validate_root_name(root)?;
        let suffixes = self.suffixes()?;
        let started = Instant::now();

        let results = self.run_all(&root, &suffixes, on_result).await?;
        let report = ScanReport::new(root, results, started.elapsed());

        info!(
            root = %report.root,
            available = report.available_count,
            registered = report.registered_count,
            failed = report.failed_count,
            elapsed_ms = report.duration_ms,
            "scan finished"
        );
        Ok(report)
    }

    /// Scan `root` and yield results as they complete.
    ///
    /// At most `concurrency` lookups are polled at once.
    ///
    /// ```rust,no_run
    /// use futures::StreamExt;
    /// use tld_scan_lib::SuffixChecker;
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let checker = SuffixChecker::new();
    ///     let mut stream = checker.scan_stream("example")?;
    ///     while let Some(result) = stream.next().await {
    ///         println!("{}: {}", result.domain, result.verdict);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn scan_stream(
        &self,
        root: &str,
    ) -> Result<Pin<Box<dyn Stream<Item = ScanResult> + Send + '_>>, ScanError> {
        let root = validate_root_name(root)?;
        let candidates = build_candidates(&root, &self.suffixes()?);
        let limit = self.config.concurrency.max(1);

        let stream = futures::stream::iter(candidates)
            .map(move |query| async move { self.check_candidate(&query).await })
            .buffer_unordered(limit);

        Ok(Box::pin(stream))
    }

    /// Convenience: is `root.suffix` available?
    pub async fn is_available(&self, root: &str, suffix: &str) -> Result<bool, ScanError> {
        let root = validate_root_name(root)?;
        let suffix = normalize_suffixes(&[suffix.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| ScanError::config("Suffix cannot be empty"))?;
        let result = self
            .check_candidate(&CandidateQuery::new(root, suffix))
            .await;
        Ok(result.verdict == Verdict::Available)
    }
}
