//! Suffix registry: which WHOIS server answers for which suffix.
//!
//! The registry is an immutable value built once per run and shared
//! read-only by every worker. Suffixes without an explicit entry resolve
//! through a fixed naming convention (`whois.<provider>.<suffix>`), so
//! resolution is total and never touches the network.
//!
//! This module also carries the curated default suffix list and the
//! built-in presets drawn from it.

use std::collections::HashMap;

/// Host label used by the fallback naming convention.
const FALLBACK_SERVICE: &str = "whois";

/// Default provider label for the fallback convention (`whois.nic.<suffix>`).
pub const DEFAULT_FALLBACK_PROVIDER: &str = "nic";

lazy_static::lazy_static! {
    /// Suffixes whose registry does not follow the `whois.nic.<suffix>` convention,
    /// plus a few that do but are queried often enough to pin explicitly.
    static ref BUILTIN_SERVERS: HashMap<&'static str, &'static str> = HashMap::from([
        ("com", "whois.verisign-grs.com"),
        ("net", "whois.verisign-grs.com"),
        ("org", "whois.pir.org"),
        ("info", "whois.afilias.net"),
        ("biz", "whois.neulevel.biz"),
        ("io", "whois.nic.io"),
        ("co", "whois.nic.co"),
        ("ai", "whois.nic.ai"),
        // Google registry
        ("app", "whois.nic.google"),
        ("dev", "whois.nic.google"),
        // ccTLDs
        ("uk", "whois.nic.uk"),
        ("de", "whois.denic.de"),
        ("fr", "whois.nic.fr"),
        ("it", "whois.nic.it"),
        ("es", "whois.nic.es"),
        ("nl", "whois.domain-registry.nl"),
        ("ca", "whois.cira.ca"),
        ("au", "whois.auda.org.au"),
        ("jp", "whois.jprs.jp"),
        ("cn", "whois.cnnic.cn"),
        ("us", "whois.nic.us"),
    ]);
}

const CLASSIC: &[&str] = &["com", "net", "org", "info", "biz", "pro"];

const COUNTRY: &[&str] = &[
    "us", "uk", "de", "fr", "it", "es", "nl", "ca", "au", "jp", "cn", "in", "ru", "br", "mx",
];

const STARTUP: &[&str] = &[
    "io", "co", "ai", "tv", "me", "cc", "ws", "vg", "je", "gg", "fm", "to", "ms", "nu",
];

const NEW_GENERIC: &[&str] = &[
    "xyz", "top", "app", "dev", "art", "fit", "fun", "new", "now", "one", "red", "run", "sex",
    "tax", "box", "car", "cat", "dog", "eat", "fly", "gay", "god", "hot", "ink", "job", "law",
    "men", "mom", "pet", "pub", "rip", "sbs", "sky", "soy", "tab", "tel", "vet", "web", "win",
    "xxx", "yes", "zip",
];

const OTHER_COUNTRY: &[&str] = &[
    "ac", "ad", "ae", "af", "ag", "am", "as", "at", "aw", "ax", "az", "ba", "bb", "bd", "be",
    "bf", "bg", "bh", "bi", "bj", "bm", "bn", "bo", "bq", "bs", "bt", "bw", "by", "bz", "cd",
    "cf", "cg", "ch", "ci", "ck", "cl", "cm", "cr", "cu", "cv", "cw", "cx", "cy", "cz", "dj",
    "dk", "dm", "do", "dz", "ec", "ee", "eg", "eh", "er", "et", "eu", "fi", "fj", "fk", "ga",
    "gd", "ge", "gf", "gh", "gi", "gl", "gm", "gn", "gp", "gq", "gr", "gt", "gu", "gw", "gy",
    "hk", "hn", "hr", "ht", "hu", "id", "ie", "il", "im", "iq", "ir", "is", "jt", "ke", "kg",
    "kh", "ki", "km", "kn", "kp", "kr", "kw", "ky", "kz", "la", "lb", "lc", "li", "lk", "lr",
    "ls", "lt", "lu", "lv", "ly", "ma", "mc", "md", "mg", "mh", "mk", "ml", "mm", "mn", "mo",
    "mp", "mq", "mr", "mt", "mu", "mv", "mw", "my", "mz", "na", "nc", "ne", "nf", "ng", "ni",
    "no", "np", "nr", "nz", "om", "pa", "pe", "pf", "pg", "ph", "pk", "pl", "pm", "pn", "pr",
    "ps", "pt", "pw", "py", "qa", "re", "ro", "rs", "rw", "sa", "sb", "sc", "sd", "se", "sg",
    "sh", "si", "sj", "sk", "sl", "sm", "sn", "so", "sr", "ss", "st", "su", "sv", "sx", "sy",
    "sz", "tc", "td", "tf", "tg", "th", "tj", "tk", "tl", "tm", "tn", "tr", "tt", "tw", "tz",
    "ua", "ug", "uy", "uz", "va", "vc", "ve", "vn", "vu", "wf", "ye", "yt", "za", "zm", "zw",
];

/// Immutable suffix -> lookup server mapping with a naming-convention fallback.
#[derive(Debug, Clone)]
pub struct SuffixRegistry {
    servers: HashMap<String, String>,
    fallback_provider: String,
}

impl SuffixRegistry {
    /// Create a registry from an explicit table.
    ///
    /// Keys are normalised to lowercase; the fallback uses the default
    /// `nic` provider.
    pub fn new<I, K, V>(servers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            servers: servers
                .into_iter()
                .map(|(k, v)| (k.into().to_lowercase(), v.into()))
                .collect(),
            fallback_provider: DEFAULT_FALLBACK_PROVIDER.to_string(),
        }
    }

    /// Registry seeded with the built-in server table.
    pub fn builtin() -> Self {
        Self::new(BUILTIN_SERVERS.iter().map(|(k, v)| (*k, *v)))
    }

    /// Override (or add) the server for one suffix.
    pub fn with_server<K: Into<String>, V: Into<String>>(mut self, suffix: K, server: V) -> Self {
        self.servers
            .insert(suffix.into().to_lowercase(), server.into());
        self
    }

    /// Replace the provider label used for unlisted suffixes.
    pub fn with_fallback_provider<P: Into<String>>(mut self, provider: P) -> Self {
        self.fallback_provider = provider.into();
        self
    }

    /// Resolve the lookup server for a suffix. Never fails.
    ///
    /// Lookup order:
    /// 1. Exact (case-insensitive) entry in the table
    /// 2. `whois.<provider>.<suffix>`
    pub fn resolve_server(&self, suffix: &str) -> String {
        let suffix = suffix.trim_start_matches('.').to_lowercase();

        match self.servers.get(&suffix) {
            Some(server) => server.clone(),
            None => format!(
                "{}.{}.{}",
                FALLBACK_SERVICE, self.fallback_provider, suffix
            ),
        }
    }

    /// Whether the suffix has an explicit entry.
    pub fn has_explicit(&self, suffix: &str) -> bool {
        self.servers.contains_key(&suffix.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}

impl Default for SuffixRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// The curated default suffix list, in lookup order, without duplicates.
pub fn default_suffixes() -> Vec<String> {
    let mut all = Vec::new();
    for group in [CLASSIC, COUNTRY, STARTUP, NEW_GENERIC, OTHER_COUNTRY] {
        for suffix in group {
            if !all.iter().any(|s: &String| s == suffix) {
                all.push(suffix.to_string());
            }
        }
    }
    all
}

/// Get a built-in suffix preset.
///
/// # Examples
///
/// ```rust
/// use tld_scan_lib::get_preset_suffixes;
///
/// let classic = get_preset_suffixes("classic").unwrap();
/// assert!(classic.contains(&"com".to_string()));
/// ```
pub fn get_preset_suffixes(preset: &str) -> Option<Vec<String>> {
    let group: &[&str] = match preset.to_lowercase().as_str() {
        "classic" => CLASSIC,
        "country" => COUNTRY,
        "startup" => STARTUP,
        "new" => NEW_GENERIC,
        "all" => return Some(default_suffixes()),
        _ => return None,
    };
    Some(group.iter().map(|s| s.to_string()).collect())
}

/// Get a preset, preferring user-defined presets over built-in ones.
pub fn get_preset_suffixes_with_custom(
    preset: &str,
    custom_presets: Option<&HashMap<String, Vec<String>>>,
) -> Option<Vec<String>> {
    let preset_lower = preset.to_lowercase();

    if let Some(custom_map) = custom_presets {
        if let Some(custom) = custom_map
            .get(preset)
            .or_else(|| custom_map.get(&preset_lower))
        {
            return Some(custom.clone());
        }
    }

    get_preset_suffixes(&preset_lower)
}

/// Names of the built-in presets, for help text and `--list-presets`.
pub fn get_available_presets() -> Vec<&'static str> {
    vec!["all", "classic", "country", "new", "startup"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_entry_wins() {
        let registry = SuffixRegistry::builtin();
        assert_eq!(registry.resolve_server("com"), "whois.verisign-grs.com");
        assert_eq!(registry.resolve_server("NET"), "whois.verisign-grs.com");
        assert_eq!(registry.resolve_server("nl"), "whois.domain-registry.nl");
        assert_eq!(registry.resolve_server("dev"), "whois.nic.google");
    }

    #[test]
    fn test_unlisted_suffix_uses_fallback() {
        let registry = SuffixRegistry::builtin();
        assert!(!registry.has_explicit("zip"));
        assert_eq!(registry.resolve_server("zip"), "whois.nic.zip");
        assert_eq!(registry.resolve_server(".Tv"), "whois.nic.tv");
    }

    #[test]
    fn test_custom_table_and_provider() {
        let registry = SuffixRegistry::new([("com", "lookup.A"), ("IO", "lookup.B")])
            .with_fallback_provider("registry");
        assert_eq!(registry.resolve_server("com"), "lookup.A");
        assert_eq!(registry.resolve_server("io"), "lookup.B");
        assert_eq!(registry.resolve_server("me"), "whois.registry.me");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_override_replaces_builtin() {
        let registry = SuffixRegistry::builtin().with_server("com", "127.0.0.1");
        assert_eq!(registry.resolve_server("com"), "127.0.0.1");
        assert_eq!(registry.resolve_server("net"), "whois.verisign-grs.com");
    }

    #[test]
    fn test_default_suffixes_unique_and_short() {
        let suffixes = default_suffixes();
        let mut seen = std::collections::HashSet::new();
        for s in &suffixes {
            assert!(seen.insert(s.clone()), "duplicate suffix {}", s);
            assert!(s.len() <= 4, "suffix too long: {}", s);
        }
        assert_eq!(suffixes[0], "com");
        assert!(suffixes.contains(&"io".to_string()));
        assert!(suffixes.contains(&"zw".to_string()));
    }

    #[test]
    fn test_presets() {
        assert_eq!(get_preset_suffixes("classic").unwrap().len(), 6);
        assert_eq!(get_preset_suffixes("CLASSIC"), get_preset_suffixes("classic"));
        assert_eq!(get_preset_suffixes("all").unwrap(), default_suffixes());
        assert!(get_preset_suffixes("nonexistent").is_none());

        let startup = get_preset_suffixes("startup").unwrap();
        for suffix in ["io", "co", "ai", "me"] {
            assert!(startup.contains(&suffix.to_string()));
        }

        for name in get_available_presets() {
            assert!(
                !get_preset_suffixes(name).unwrap().is_empty(),
                "preset {} is empty",
                name
            );
        }
    }

    #[test]
    fn test_custom_preset_takes_precedence() {
        let mut custom = HashMap::new();
        custom.insert("classic".to_string(), vec!["com".to_string()]);
        custom.insert("mine".to_string(), vec!["io".to_string(), "dev".to_string()]);

        assert_eq!(
            get_preset_suffixes_with_custom("classic", Some(&custom)).unwrap(),
            vec!["com"]
        );
        assert_eq!(
            get_preset_suffixes_with_custom("mine", Some(&custom)).unwrap(),
            vec!["io", "dev"]
        );
        assert_eq!(
            get_preset_suffixes_with_custom("new", None),
            get_preset_suffixes("new")
        );
    }
}
