//! Protocol layer: where to ask, and how to ask.
//!
//! The registry maps suffixes to WHOIS servers; the WHOIS module speaks
//! the line protocol to them.

/// WHOIS protocol implementation
pub mod whois;

/// Suffix -> server mappings, default suffix list and presets
pub mod registry;

// Re-export commonly used functions and types
pub use registry::{
    default_suffixes, get_available_presets, get_preset_suffixes,
    get_preset_suffixes_with_custom, SuffixRegistry,
};
pub use whois::{LookupClient, WhoisClient};
