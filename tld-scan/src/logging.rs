use tracing_subscriber::EnvFilter;

/// Route `tracing` events to stderr so stdout carries only results.
///
/// RUST_LOG overrides the level chosen here, e.g.
///   RUST_LOG=tld_scan_lib=trace
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_ansi(console::Term::stderr().features().colors_supported())
        .without_time()
        .try_init()
        .ok();
}
