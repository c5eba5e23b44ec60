//! Terminal output for tld-scan: progress lines, the final report and the
//! preset listing. Uses only the `console` crate for styling.

use console::style;
use std::collections::BTreeMap;
use tld_scan_lib::{ScanReport, ScanResult, Verdict};

/// Width of the name column in progress lines.
const NAME_WIDTH: usize = 20;

const RULE_WIDTH: usize = 41;

pub fn print_header(root: &str, suffix_count: usize, concurrency: usize) {
    println!(
        "{} {} {}",
        style("tld-scan").bold(),
        style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim(),
        style(format!(
            "- Checking {} across {} suffix{} (concurrency {})",
            root,
            suffix_count,
            if suffix_count == 1 { "" } else { "es" },
            concurrency
        ))
        .dim(),
    );
    println!();
}

/// One line per finished suffix, e.g. `example.io            : available`.
///
/// With `debug`, failed lookups also show why they were counted as registered.
pub fn print_result(result: &ScanResult, debug: bool) {
    let name = format!("{:<width$}", result.domain, width = NAME_WIDTH);

    match result.verdict {
        Verdict::Available => {
            println!("{} : {}", name, style("available").green().bold());
        }
        Verdict::Registered => match (&result.error_message, debug) {
            (Some(reason), true) => println!(
                "{} : {}  {}",
                name,
                style("registered").red(),
                style(format!("(lookup failed: {})", reason)).dim()
            ),
            _ => println!("{} : {}", name, style("registered").red()),
        },
    }
}

/// The closing report: every available name, sorted, then a count.
pub fn print_report(report: &ScanReport) {
    let rule = "=".repeat(RULE_WIDTH);

    println!();
    println!("{}", rule);
    println!("{}", style("Available names:").yellow().bold());
    println!("{}", rule);

    if report.available().is_empty() {
        println!("No available names found");
    } else {
        for name in report.available() {
            println!("{}", style(name).green());
        }
        println!();
        println!(
            "Found {} available name{} (advisory only)",
            report.available_count,
            if report.available_count == 1 { "" } else { "s" }
        );
    }

    print_summary(report);
}

fn print_summary(report: &ScanReport) {
    let secs = report.duration_ms as f64 / 1000.0;
    let mut parts = vec![
        style(format!("{} available", report.available_count))
            .green()
            .to_string(),
        style(format!("{} registered", report.registered_count))
            .red()
            .to_string(),
    ];
    if report.failed_count > 0 {
        parts.push(
            style(format!("{} lookups failed", report.failed_count))
                .yellow()
                .to_string(),
        );
    }

    println!();
    println!(
        "{} {} in {:.1}s",
        style(format!("Checked {} names:", report.total())).dim(),
        parts.join(", "),
        secs
    );
}

pub fn print_presets(presets: &BTreeMap<String, Vec<String>>) {
    let heading = style("Available Suffix Presets:").yellow().bold();

    println!();
    println!("{}", heading);
    println!();

    for (name, suffixes) in presets {
        println!(
            "  {} {}  {}",
            style(format!("{:<12}", name)).green().bold(),
            style(format!("({})", suffixes.len())).cyan(),
            suffixes.join(", "),
        );
    }

    println!();
    println!("Use: tld-scan <name> --preset <preset>");
}
