use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

use mnist_ingest::config::Args;
use mnist_ingest::dataset::{LabeledSet, NormalizedSet, render_ascii};

fn setup_logging(verbose: bool, quiet: bool) -> Result<()> {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn report(name: &str, set: &NormalizedSet) {
    if set.is_empty() {
        warn!("{name}: no samples");
        return;
    }
    let width = set.samples.first().map_or(0, Vec::len);
    info!(
        "{name}: {} samples of {} floats ({}x{}), {} labels",
        set.len(),
        width,
        set.rows,
        set.cols,
        set.labels.len()
    );
    if let Some((low, high)) = set.intensity_range() {
        info!("{name}: intensities span [{low}, {high}]");
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose, args.quiet)?;

    let paths = args.paths();
    info!(
        "Reading {:?} split from {:?} and {:?}",
        args.split, paths.images, paths.labels
    );
    let mut raw = LabeledSet::load(&paths, &args.reader_options())
        .with_context(|| format!("Failed to load {:?} split", args.split))?;

    let validation = args
        .validation_size
        .map(|size| raw.split_off(raw.len().saturating_sub(size)));

    let normalized = raw.normalize();
    report("samples", &normalized);

    if let Some(validation) = validation {
        report("validation", &validation.normalize());
    }

    for (sample, label) in normalized
        .samples
        .iter()
        .zip(&normalized.labels)
        .take(args.preview)
    {
        println!("{}", render_ascii(sample, normalized.cols));
        println!("Label: {label}\n");
    }

    Ok(())
}

/// Where a fatal error ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorSink {
    Log,
    Stderr,
}

/// Logging may not be installed yet (or may have failed to install), in which case
/// `error!` would drop the message.
fn error_sink() -> ErrorSink {
    if tracing::dispatcher::has_been_set() {
        ErrorSink::Log
    } else {
        ErrorSink::Stderr
    }
}

fn main() {
    if let Err(e) = run() {
        match error_sink() {
            ErrorSink::Log => error!("Error: {:#}", e),
            ErrorSink::Stderr => eprintln!("Error: {:#}", e),
        }
        std::process::exit(1);
    }
}
