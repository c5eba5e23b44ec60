//! tld-scan CLI Application
//!
//! Reads one root name, checks it across many short top-level domains over
//! raw WHOIS, and prints which names look unregistered.

mod logging;
mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use console::Term;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::process;
use std::time::Duration;
use tld_scan_lib::{
    get_available_presets, get_preset_suffixes_with_custom, load_env_config,
    parse_timeout_string, resolve_preset, validate_root_name, ConfigManager, FileConfig,
    ScanConfig, SuffixChecker, SuffixRegistry,
};
use tracing::debug;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for tld-scan
#[derive(Parser, Debug)]
#[command(name = "tld-scan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Find which short TLDs are still free for a name, via raw WHOIS")]
#[command(
    long_about = "Check one root name (e.g. 'example') across many short top-level domains over raw WHOIS (port 43) and list the names that look unregistered.\n\nAny lookup that fails or times out is counted as registered. Results are advisory."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Root name without suffix (prompted for when omitted)
    #[arg(value_name = "ROOT", help_heading = "Name Selection")]
    pub root: Option<String>,

    /// Suffixes to check (comma-separated or multiple -s flags)
    #[arg(short = 's', long = "suffix", value_name = "SUFFIX", value_delimiter = ',', action = clap::ArgAction::Append, help_heading = "Name Selection")]
    pub suffixes: Option<Vec<String>>,

    /// Use a predefined suffix preset (use --list-presets to see all)
    #[arg(long = "preset", value_name = "NAME", help_heading = "Name Selection")]
    pub preset: Option<String>,

    /// List all available suffix presets and exit
    #[arg(long = "list-presets", help_heading = "Name Selection")]
    pub list_presets: bool,

    /// Output the full report as JSON
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Max lookups in flight (default: 5, max: 100)
    #[arg(short = 'c', long = "concurrency", value_name = "N", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Per-lookup deadline, e.g. "10s", "1m" (default: 10s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Lookup port (default: 43)
    #[arg(long = "port", value_name = "PORT", help_heading = "Protocol")]
    pub port: Option<u16>,

    /// Override the lookup server for a suffix (repeatable)
    #[arg(long = "server", value_name = "SUFFIX=HOST", action = clap::ArgAction::Append, help_heading = "Protocol")]
    pub servers: Vec<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show why failed lookups were counted as registered
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

/// Everything a run needs once file, environment and flags are merged.
struct Settings {
    scan: ScanConfig,
    registry: SuffixRegistry,
    json: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    logging::init_logging(args.verbose);

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn validate_args(args: &Args) -> Result<(), String> {
    if args.list_presets {
        return Ok(());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 100 {
            return Err("Concurrency must be between 1 and 100".to_string());
        }
    }

    if args.suffixes.is_some() && args.preset.is_some() {
        return Err("Cannot specify both -s/--suffix and --preset".to_string());
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    if args.port == Some(0) {
        return Err("Port must be between 1 and 65535".to_string());
    }

    for entry in &args.servers {
        parse_server_override(entry)?;
    }

    Ok(())
}

/// Parse `SUFFIX=HOST`.
fn parse_server_override(entry: &str) -> Result<(String, String), String> {
    let invalid = || format!("Invalid --server '{}'. Use SUFFIX=HOST, e.g. io=whois.nic.io", entry);

    let (suffix, host) = entry.split_once('=').ok_or_else(invalid)?;
    let suffix = suffix.trim().trim_start_matches('.').to_lowercase();
    let host = host.trim();

    if suffix.is_empty() || host.is_empty() || host.contains(char::is_whitespace) {
        return Err(invalid());
    }
    Ok((suffix, host.to_string()))
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = build_settings(&args)?;

    if args.list_presets {
        print_presets(&settings.scan, settings.json)?;
        return Ok(());
    }

    let root = match &args.root {
        Some(root) => root.clone(),
        None => prompt_for_root()?,
    };
    let root = validate_root_name(&root)?;

    let checker = SuffixChecker::with_config(settings.scan).with_registry(settings.registry);

    if settings.json {
        let report = checker.scan(&root).await?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let suffix_count = checker.suffixes()?.len();
    ui::print_header(&root, suffix_count, checker.config().concurrency);

    let debug = args.debug;
    let report = checker
        .scan_with_progress(&root, |result| ui::print_result(result, debug))
        .await?;

    ui::print_report(&report);
    Ok(())
}

/// Ask for a root name on the terminal. An empty answer ends the run.
fn prompt_for_root() -> Result<String, Box<dyn std::error::Error>> {
    let term = Term::stderr();
    term.write_str("Root name (without suffix): ")?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;

    let root = line.trim();
    if root.is_empty() {
        return Err("no root name given".into());
    }
    Ok(root.to_string())
}

/// Merge configuration: built-in defaults, then config files, then `TS_*`
/// environment variables, then command-line flags.
fn build_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let env_config = load_env_config();
    let manager = ConfigManager::new();

    let file_config: FileConfig = if let Some(path) = &args.config {
        debug!(path = %path, "using config file from --config");
        manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else if let Some(path) = &env_config.config {
        debug!(path = %path, "using config file from TS_CONFIG");
        manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else {
        manager.discover_and_load()?
    };

    // Step 1: config files
    let mut scan = file_config.apply_to(ScanConfig::default())?;
    let mut registry = file_config.build_registry();
    let mut json = file_config.json_output().unwrap_or(false);

    // Step 2: environment
    scan = env_config.apply_to(scan)?;
    if let Some(flag) = env_config.json {
        json = flag;
    }

    // Step 3: command line
    if let Some(concurrency) = args.concurrency {
        scan = scan.with_concurrency(concurrency);
    }
    if let Some(secs) = args.timeout.as_deref().and_then(parse_timeout_string) {
        scan = scan.with_timeout(Duration::from_secs(secs));
    }
    if let Some(port) = args.port {
        scan = scan.with_port(port);
    }
    if let Some(suffixes) = &args.suffixes {
        scan = scan.with_suffixes(suffixes.clone());
    } else if let Some(preset) = &args.preset {
        let suffixes = resolve_preset(preset, &scan.custom_presets)?;
        scan = scan.with_suffixes(suffixes);
    }
    for entry in &args.servers {
        let (suffix, host) = parse_server_override(entry)?;
        registry = registry.with_server(suffix, host);
    }
    if args.json {
        json = true;
    }

    debug!(
        concurrency = scan.concurrency,
        timeout_secs = scan.timeout.as_secs(),
        port = scan.port,
        "effective configuration"
    );

    Ok(Settings {
        scan,
        registry,
        json,
    })
}

fn print_presets(config: &ScanConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut presets: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in get_available_presets() {
        if let Some(suffixes) = get_preset_suffixes_with_custom(name, Some(&config.custom_presets))
        {
            presets.insert(name.to_string(), suffixes);
        }
    }
    for (name, suffixes) in &config.custom_presets {
        presets.insert(name.clone(), suffixes.clone());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&presets)?);
    } else {
        ui::print_presets(&presets);
    }
    Ok(())
}
