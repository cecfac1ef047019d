use anyhow::{Context, Result};
use cgdiff::cli::{Cli, Mode};
use cgdiff::{diff, output, trace};
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Report records that were left out of the index
fn warn_rejected(path: &Path, index: &trace::TraceIndex) {
    let rejected = index.rejected();
    if rejected.is_empty() {
        return;
    }

    eprintln!(
        "warning: {}: skipped {} malformed record(s)",
        path.display(),
        rejected.len()
    );
    for record in rejected {
        eprintln!("  {}", record);
    }
}

fn run_summary(args: &Cli, path: &Path, out: &mut impl Write) -> Result<()> {
    let index = trace::parse_file(path, &args.parse_options())?;
    warn_rejected(path, &index);

    output::write_summary(out, &index, args.format).context("Failed to write summary")
}

fn run_diff(
    args: &Cli,
    baseline_path: &Path,
    candidate_path: &Path,
    out: &mut impl Write,
) -> Result<()> {
    let config = args.threshold_config()?;
    let options = args.parse_options();

    let baseline = trace::parse_file(baseline_path, &options)?;
    warn_rejected(baseline_path, &baseline);
    let candidate = trace::parse_file(candidate_path, &options)?;
    warn_rejected(candidate_path, &candidate);

    let report = diff::diff(&baseline, &candidate, &config)?;
    for mismatch in &report.mismatches {
        eprintln!("warning: skipped {}", mismatch);
    }

    output::write_diff(out, &report, args.format).context("Failed to write comparison")
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match args.mode() {
        Mode::Summary { trace: path } => run_summary(&args, path, &mut out),
        Mode::Diff {
            baseline,
            candidate,
        } => run_diff(&args, baseline, candidate, &mut out),
    }
}
