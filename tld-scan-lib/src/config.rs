//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files, reading
//! `TS_*` environment variables, and merging them with proper precedence
//! rules. Command-line flags are layered on top by the binary.

use crate::error::ScanError;
use crate::protocols::{get_preset_suffixes_with_custom, SuffixRegistry};
use crate::types::ScanConfig;
use crate::utils::is_valid_suffix;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for CLI options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Suffix -> lookup server overrides
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servers: Option<HashMap<String, String>>,

    /// Server naming convention for unlisted suffixes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry: Option<RegistryConfig>,

    /// User-defined suffix presets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_presets: Option<HashMap<String, Vec<String>>>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Per-lookup deadline (as string, e.g., "5s", "2m")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Default suffix preset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    /// Default suffix list (alternative to preset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suffixes: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_response_bytes: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfig {
    /// Provider label in `whois.<provider>.<suffix>`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Emit the JSON report instead of text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json: Option<bool>,
}

impl FileConfig {
    /// Layer this file's `[defaults]` and `[custom_presets]` onto `config`.
    pub fn apply_to(&self, mut config: ScanConfig) -> Result<ScanConfig, ScanError> {
        if let Some(presets) = &self.custom_presets {
            config.custom_presets = presets.clone();
        }

        let Some(defaults) = &self.defaults else {
            return Ok(config);
        };

        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = &defaults.timeout {
            let secs = parse_timeout_string(timeout).ok_or_else(|| invalid_timeout(timeout))?;
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(port) = defaults.port {
            config = config.with_port(port);
        }
        if let Some(limit) = defaults.max_response_bytes {
            config = config.with_max_response_bytes(limit);
        }
        if let Some(suffixes) = &defaults.suffixes {
            config = config.with_suffixes(suffixes.clone());
        } else if let Some(preset) = &defaults.preset {
            let suffixes = resolve_preset(preset, &config.custom_presets)?;
            config = config.with_suffixes(suffixes);
        }

        Ok(config)
    }

    /// Built-in server table with this file's `[servers]` and `[registry]`
    /// applied on top.
    pub fn build_registry(&self) -> SuffixRegistry {
        let mut registry = SuffixRegistry::builtin();

        if let Some(servers) = &self.servers {
            for (suffix, server) in servers {
                registry = registry.with_server(suffix.trim_start_matches('.'), server.trim());
            }
        }
        if let Some(provider) = self
            .registry
            .as_ref()
            .and_then(|r| r.fallback_provider.as_ref())
        {
            registry = registry.with_fallback_provider(provider.trim());
        }

        registry
    }

    pub fn json_output(&self) -> Option<bool> {
        self.output.as_ref().and_then(|o| o.json)
    }
}

/// Resolve a preset name against custom presets first, then built-ins.
pub fn resolve_preset(
    name: &str,
    custom_presets: &HashMap<String, Vec<String>>,
) -> Result<Vec<String>, ScanError> {
    get_preset_suffixes_with_custom(name, Some(custom_presets)).ok_or_else(|| {
        ScanError::config(format!(
            "Unknown preset '{}'. Use --list-presets to see the available presets",
            name
        ))
    })
}

/// Configuration discovery and loading functionality.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    /// Candidate files, lowest precedence first
    search_paths: Vec<PathBuf>,
}

impl ConfigManager {
    /// Manager that searches the standard locations.
    pub fn new() -> Self {
        Self {
            search_paths: default_search_paths(),
        }
    }

    /// Manager that searches exactly `paths`, lowest precedence first.
    pub fn with_search_paths(paths: Vec<PathBuf>) -> Self {
        Self {
            search_paths: paths,
        }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, ScanError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ScanError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            ScanError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content)?;
        self.validate_config(&config)?;

        debug!(path = %path.display(), "loaded configuration file");
        Ok(config)
    }

    /// Load every existing file on the search path and merge them, later
    /// files overriding earlier ones.
    ///
    /// A discovered file that fails to parse or validate is an error: a
    /// config the user wrote should not be silently ignored.
    pub fn discover_and_load(&self) -> Result<FileConfig, ScanError> {
        let mut merged = FileConfig::default();
        let mut loaded = Vec::new();

        for path in &self.search_paths {
            if !path.is_file() {
                continue;
            }
            let config = self.load_file(path)?;
            merged = self.merge_configs(merged, config);
            loaded.push(path.display().to_string());
        }

        if loaded.len() > 1 {
            debug!(files = ?loaded, "merged multiple configuration files");
        }

        Ok(merged)
    }

    /// Merge two configurations. Values from `higher` take precedence.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(mut lo), Some(hi)) => {
                    if hi.concurrency.is_some() {
                        lo.concurrency = hi.concurrency;
                    }
                    if hi.timeout.is_some() {
                        lo.timeout = hi.timeout;
                    }
                    if hi.port.is_some() {
                        lo.port = hi.port;
                    }
                    if hi.max_response_bytes.is_some() {
                        lo.max_response_bytes = hi.max_response_bytes;
                    }
                    // preset and suffixes are alternatives; the higher file's choice replaces both
                    if hi.preset.is_some() || hi.suffixes.is_some() {
                        lo.preset = hi.preset;
                        lo.suffixes = hi.suffixes;
                    }
                    Some(lo)
                }
                (lo, hi) => hi.or(lo),
            },
            servers: merge_maps(lower.servers, higher.servers),
            registry: match (lower.registry, higher.registry) {
                (Some(lo), Some(hi)) => Some(RegistryConfig {
                    fallback_provider: hi.fallback_provider.or(lo.fallback_provider),
                }),
                (lo, hi) => hi.or(lo),
            },
            custom_presets: merge_maps(lower.custom_presets, higher.custom_presets),
            output: match (lower.output, higher.output) {
                (Some(lo), Some(hi)) => Some(OutputConfig {
                    json: hi.json.or(lo.json),
                }),
                (lo, hi) => hi.or(lo),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), ScanError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 100 {
                    return Err(ScanError::config("Concurrency must be between 1 and 100"));
                }
            }

            if let Some(timeout) = &defaults.timeout {
                if parse_timeout_string(timeout).is_none() {
                    return Err(invalid_timeout(timeout));
                }
            }

            if defaults.port == Some(0) {
                return Err(ScanError::config("Port must be between 1 and 65535"));
            }

            if defaults.max_response_bytes == Some(0) {
                return Err(ScanError::config("max_response_bytes must be positive"));
            }

            if defaults.preset.is_some() && defaults.suffixes.is_some() {
                return Err(ScanError::config(
                    "Cannot specify both 'preset' and 'suffixes' in defaults",
                ));
            }

            if let Some(suffixes) = &defaults.suffixes {
                if suffixes.is_empty() {
                    return Err(ScanError::config(
                        "'suffixes' in defaults cannot be empty",
                    ));
                }
                for suffix in suffixes {
                    check_suffix(suffix, "defaults.suffixes")?;
                }
            }
        }

        if let Some(servers) = &config.servers {
            for (suffix, server) in servers {
                check_suffix(suffix, "servers")?;
                let server = server.trim();
                if server.is_empty() || server.contains(char::is_whitespace) {
                    return Err(ScanError::config(format!(
                        "Invalid server '{}' for suffix '{}'",
                        server, suffix
                    )));
                }
            }
        }

        if let Some(provider) = config
            .registry
            .as_ref()
            .and_then(|r| r.fallback_provider.as_ref())
        {
            if !is_valid_suffix(provider.trim()) {
                return Err(ScanError::config(format!(
                    "Invalid fallback_provider '{}'",
                    provider
                )));
            }
        }

        if let Some(presets) = &config.custom_presets {
            for (name, suffixes) in presets {
                if name.is_empty() {
                    return Err(ScanError::config("Custom preset names cannot be empty"));
                }

                if suffixes.is_empty() {
                    return Err(ScanError::config(format!(
                        "Custom preset '{}' cannot have an empty suffix list",
                        name
                    )));
                }

                for suffix in suffixes {
                    check_suffix(suffix, &format!("preset '{}'", name))?;
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Standard config locations, lowest precedence first:
/// XDG, then home directory, then current directory.
fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let home = env::var_os("HOME").map(PathBuf::from);

    let xdg = env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| home.as_ref().map(|h| h.join(".config")));
    if let Some(dir) = xdg {
        paths.push(dir.join("tld-scan").join("config.toml"));
    }

    if let Some(home) = &home {
        paths.extend(first_existing(&[
            home.join(".tld-scan.toml"),
            home.join("tld-scan.toml"),
        ]));
    }

    paths.extend(first_existing(&[
        PathBuf::from("./tld-scan.toml"),
        PathBuf::from("./.tld-scan.toml"),
    ]));

    paths
}

fn first_existing(candidates: &[PathBuf]) -> Option<PathBuf> {
    candidates.iter().find(|p| p.exists()).cloned()
}

fn merge_maps<V>(
    lower: Option<HashMap<String, V>>,
    higher: Option<HashMap<String, V>>,
) -> Option<HashMap<String, V>> {
    match (lower, higher) {
        (Some(mut lo), Some(hi)) => {
            lo.extend(hi);
            Some(lo)
        }
        (lo, hi) => hi.or(lo),
    }
}

fn check_suffix(suffix: &str, context: &str) -> Result<(), ScanError> {
    if is_valid_suffix(suffix.trim().trim_start_matches('.').to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ScanError::config(format!(
            "Invalid suffix '{}' in {}",
            suffix, context
        )))
    }
}

fn invalid_timeout(value: &str) -> ScanError {
    ScanError::config(format!(
        "Invalid timeout format '{}'. Use format like '5s', '30s', '2m'",
        value
    ))
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via `TS_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvConfig {
    pub concurrency: Option<usize>,
    pub timeout: Option<String>,
    pub port: Option<u16>,
    pub preset: Option<String>,
    pub suffixes: Option<Vec<String>>,
    pub json: Option<bool>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Layer environment values onto `config`. An explicit suffix list wins
    /// over a preset.
    pub fn apply_to(&self, mut config: ScanConfig) -> Result<ScanConfig, ScanError> {
        if let Some(concurrency) = self.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(secs) = self.timeout.as_deref().and_then(parse_timeout_string) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(port) = self.port {
            config = config.with_port(port);
        }
        if let Some(suffixes) = &self.suffixes {
            config = config.with_suffixes(suffixes.clone());
        } else if let Some(preset) = &self.preset {
            let suffixes = resolve_preset(preset, &config.custom_presets)?;
            config = config.with_suffixes(suffixes);
        }
        Ok(config)
    }
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    env_config_from(|name| env::var(name).ok())
}

/// Parse `TS_*` variables through `lookup`.
pub(crate) fn env_config_from<F>(lookup: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    if let Some(val) = lookup("TS_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(n) if (1..=100).contains(&n) => env_config.concurrency = Some(n),
            _ => warn!(value = %val, "ignoring invalid TS_CONCURRENCY, must be 1-100"),
        }
    }

    if let Some(val) = lookup("TS_TIMEOUT") {
        if parse_timeout_string(&val).is_some() {
            env_config.timeout = Some(val);
        } else {
            warn!(value = %val, "ignoring invalid TS_TIMEOUT, use a format like '5s', '30s', '2m'");
        }
    }

    if let Some(val) = lookup("TS_PORT") {
        match val.trim().parse::<u16>() {
            Ok(port) if port > 0 => env_config.port = Some(port),
            _ => warn!(value = %val, "ignoring invalid TS_PORT"),
        }
    }

    if let Some(val) = lookup("TS_PRESET") {
        if !val.trim().is_empty() {
            env_config.preset = Some(val.trim().to_string());
        }
    }

    if let Some(val) = lookup("TS_SUFFIXES") {
        let suffixes: Vec<String> = val
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !suffixes.is_empty() {
            env_config.suffixes = Some(suffixes);
        }
    }

    if let Some(val) = lookup("TS_JSON") {
        match parse_bool(&val) {
            Some(flag) => env_config.json = Some(flag),
            None => warn!(value = %val, "ignoring invalid TS_JSON, use true/false"),
        }
    }

    if let Some(val) = lookup("TS_CONFIG") {
        if !val.trim().is_empty() {
            env_config.config = Some(val);
        }
    }

    debug!(?env_config, "environment configuration");
    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a timeout string like "5s", "30s", "2m" into seconds.
///
/// A bare number is taken as seconds. Zero is rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<u64> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let secs = if let Some(s) = timeout_str.strip_suffix('s') {
        s.parse::<u64>().ok()
    } else if let Some(m) = timeout_str.strip_suffix('m') {
        m.parse::<u64>().ok().and_then(|m| m.checked_mul(60))
    } else {
        timeout_str.parse::<u64>().ok()
    };

    secs.filter(|s| *s > 0)
}
