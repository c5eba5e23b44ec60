//! Heuristic classification of free-text WHOIS replies.
//!
//! WHOIS has no structured "not found" signal, so the verdict is decided by
//! phrase matching on the lowercased reply. Negative phrases (no record
//! exists) are checked before positive ones, and a reply with neither is
//! treated as registered.

use crate::types::Verdict;

/// Phrases meaning no registration exists. Checked first.
pub const NEGATIVE_PATTERNS: &[&str] = &[
    "no match",
    "not found",
    "no data found",
    "available for registration",
    "domain not found",
    "no entries found",
    "status: free",
    "status: available",
    "not registered",
    "no object found",
];

/// Phrases that appear in an existing registration record.
pub const POSITIVE_PATTERNS: &[&str] = &[
    "domain name:",
    "registrar:",
    "creation date:",
    "updated date:",
    "expiry date:",
    "name server:",
    "status: active",
    "status: registered",
    "registered",
    "registrant:",
    "admin contact:",
    "tech contact:",
];

/// Which evidence decided a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// A "no such record" phrase was found
    Negative(&'static str),
    /// A registration-record phrase was found
    Positive(&'static str),
    /// Neither kind of phrase was present
    Ambiguous,
}

impl Signal {
    /// The phrase that matched, if any.
    pub fn phrase(&self) -> Option<&'static str> {
        match *self {
            Signal::Negative(p) | Signal::Positive(p) => Some(p),
            Signal::Ambiguous => None,
        }
    }
}

/// A verdict together with the evidence behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: Verdict,
    pub signal: Signal,
}

/// Classify a reply, keeping the phrase that decided it.
pub fn classify_detailed(reply: &str) -> Classification {
    let reply = reply.to_lowercase();

    if let Some(p) = NEGATIVE_PATTERNS
        .iter()
        .copied()
        .find(|p| reply.contains(*p))
    {
        return Classification {
            verdict: Verdict::Available,
            signal: Signal::Negative(p),
        };
    }

    if let Some(p) = POSITIVE_PATTERNS
        .iter()
        .copied()
        .find(|p| reply.contains(*p))
    {
        return Classification {
            verdict: Verdict::Registered,
            signal: Signal::Positive(p),
        };
    }

    Classification {
        verdict: Verdict::Registered,
        signal: Signal::Ambiguous,
    }
}

/// Classify a reply as `Available` or `Registered`.
pub fn classify(reply: &str) -> Verdict {
    classify_detailed(reply).verdict
}
