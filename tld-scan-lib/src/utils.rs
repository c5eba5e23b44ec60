//! Utility functions for input validation and candidate construction.

use crate::error::ScanError;
use crate::types::CandidateQuery;

/// Longest DNS label (RFC 1035).
const MAX_LABEL_LEN: usize = 63;

/// Validate and normalise a root name.
///
/// The root is a single DNS label: ASCII letters, digits and hyphens, not
/// starting or ending with a hyphen, at most 63 characters. Returns the
/// trimmed, lowercased name.
pub fn validate_root_name(root: &str) -> Result<String, ScanError> {
    let trimmed = root.trim();

    if trimmed.is_empty() {
        return Err(ScanError::invalid_root(root, "Root name cannot be empty"));
    }

    if trimmed.contains('.') {
        return Err(ScanError::invalid_root(
            trimmed,
            "Give the name without a suffix (e.g. 'example', not 'example.com')",
        ));
    }

    if trimmed.len() > MAX_LABEL_LEN {
        return Err(ScanError::invalid_root(
            trimmed,
            format!("Root name longer than {} characters", MAX_LABEL_LEN),
        ));
    }

    if trimmed.starts_with('-') || trimmed.ends_with('-') {
        return Err(ScanError::invalid_root(
            trimmed,
            "Root name cannot start or end with a hyphen",
        ));
    }

    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        return Err(ScanError::invalid_root(
            trimmed,
            "Only letters, digits and hyphens are allowed",
        ));
    }

    Ok(trimmed.to_ascii_lowercase())
}

/// Check a single suffix label.
pub(crate) fn is_valid_suffix(suffix: &str) -> bool {
    !suffix.is_empty()
        && suffix.len() <= MAX_LABEL_LEN
        && !suffix.starts_with('-')
        && !suffix.ends_with('-')
        && suffix.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Normalise a suffix list: trim, drop a leading dot, lowercase, and
/// remove duplicates keeping the first occurrence.
///
/// Blank entries are skipped; anything else that is not a valid label is an
/// error, and so is a list with nothing left to check.
pub fn normalize_suffixes(suffixes: &[String]) -> Result<Vec<String>, ScanError> {
    let mut out: Vec<String> = Vec::with_capacity(suffixes.len());

    for raw in suffixes {
        let suffix = raw.trim().trim_start_matches('.').to_ascii_lowercase();
        if suffix.is_empty() {
            continue;
        }
        if !is_valid_suffix(&suffix) {
            return Err(ScanError::config(format!("Invalid suffix '{}'", raw.trim())));
        }
        if !out.contains(&suffix) {
            out.push(suffix);
        }
    }

    if out.is_empty() {
        return Err(ScanError::config("no suffixes to check"));
    }

    Ok(out)
}

/// Pair a (validated) root with every suffix.
pub fn build_candidates(root: &str, suffixes: &[String]) -> Vec<CandidateQuery> {
    suffixes
        .iter()
        .map(|suffix| CandidateQuery::new(root, suffix.as_str()))
        .collect()
}
