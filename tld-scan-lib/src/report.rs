//! Scan report: the outcome of probing one root across all suffixes.

use crate::types::{ScanResult, Verdict};
use serde::Serialize;
use std::time::Duration;

/// Aggregated outcome of a scan.
///
/// `results` holds one entry per suffix, sorted by name. `available` lists
/// only the names whose verdict is `Available`, sorted ascending and free of
/// duplicates.
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub root: String,
    pub results: Vec<ScanResult>,
    pub available: Vec<String>,
    pub available_count: usize,
    pub registered_count: usize,
    /// Registered verdicts that were forced by a lookup failure
    pub failed_count: usize,
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn new(root: impl Into<String>, mut results: Vec<ScanResult>, elapsed: Duration) -> Self {
        results.sort_by(|a, b| a.domain.cmp(&b.domain));

        let mut available: Vec<String> = results
            .iter()
            .filter(|r| r.verdict == Verdict::Available)
            .map(|r| r.domain.clone())
            .collect();
        available.sort();
        available.dedup();

        let registered_count = results
            .iter()
            .filter(|r| r.verdict == Verdict::Registered)
            .count();
        let failed_count = results.iter().filter(|r| r.is_failure()).count();

        Self {
            root: root.into(),
            available_count: available.len(),
            available,
            registered_count,
            failed_count,
            duration_ms: elapsed.as_millis() as u64,
            results,
        }
    }

    /// Available names, sorted ascending.
    pub fn available(&self) -> &[String] {
        &self.available
    }

    /// Registered names (including failures), sorted ascending.
    pub fn registered(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.verdict == Verdict::Registered)
            .map(|r| r.domain.as_str())
            .collect()
    }

    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
