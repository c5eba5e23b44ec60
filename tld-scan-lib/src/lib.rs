//! # tld-scan Library
//!
//! Check one root name across many short top-level domains over raw WHOIS
//! and report which fully-qualified names look unregistered.
//!
//! Lookups run concurrently under a fixed admission limit. Every lookup
//! failure (unresolvable server, refused connection, timeout, oversize or
//! unreadable reply) is counted as *registered*, so a name is only reported
//! available when a registry actually said so.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tld_scan_lib::{ScanConfig, SuffixChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = SuffixChecker::with_config(ScanConfig::default().with_concurrency(8));
//!     let report = checker.scan("example").await?;
//!
//!     println!("{} of {} names available", report.available_count, report.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Raw WHOIS**: one TCP exchange per name, bounded by a per-query deadline
//! - **Bounded concurrency**: at most K lookups in flight
//! - **Conservative verdicts**: only explicit "not found" replies count as available
//! - **Injected tables**: suffix lists, presets and server overrides are plain values
//! - **Configurable**: TOML files and `TS_*` environment variables

pub use checker::SuffixChecker;
pub use classifier::{classify, classify_detailed, Classification, Signal};
pub use concurrent::ConcurrentProcessor;
pub use config::{
    load_env_config, parse_timeout_string, resolve_preset, ConfigManager, EnvConfig, FileConfig,
};
pub use error::ScanError;
pub use protocols::{
    default_suffixes, get_available_presets, get_preset_suffixes,
    get_preset_suffixes_with_custom, LookupClient, SuffixRegistry, WhoisClient,
};
pub use report::ScanReport;
pub use types::{
    CandidateQuery, ScanConfig, ScanResult, Verdict, DEFAULT_CONCURRENCY,
    DEFAULT_MAX_RESPONSE_BYTES, WHOIS_PORT,
};
pub use utils::{build_candidates, normalize_suffixes, validate_root_name};

// Public so callers can reach the pattern tables
pub mod classifier;

mod checker;
mod concurrent;
mod config;
mod error;
mod protocols;
mod report;
mod types;
mod utils;

pub type Result<T> = std::result::Result<T, ScanError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
