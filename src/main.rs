//! zip-bruteforce - Parallel Password Recovery for Encrypted ZIP Archives
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::process::ExitCode;
use std::sync::atomic::Ordering;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use zip_bruteforce::archive::ArchiveTarget;
use zip_bruteforce::config::{CliArgs, SearchConfig};
use zip_bruteforce::progress::{print_header, print_summary, ProgressReporter};
use zip_bruteforce::search::{SearchCoordinator, SearchOutcome, SearchProgress};

/// Keyspace exhausted without a match
const EXIT_EXHAUSTED: u8 = 1;

/// Configuration error or any other failure
const EXIT_ERROR: u8 = 2;

/// Stopped by Ctrl-C (128 + SIGINT)
const EXIT_INTERRUPTED: u8 = 130;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run() -> Result<ExitCode> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = SearchConfig::from_args(args).context("Invalid configuration")?;

    // Everything about the archive is checked before any worker starts
    let target = ArchiveTarget::inspect(&config.archive_path)
        .context("Cannot attack archive")?;

    let show_progress = config.show_progress;
    if show_progress {
        print_header(&config, &target, Local::now());
    }

    let coordinator = SearchCoordinator::new(config, target);

    // Setup signal handler for graceful shutdown
    let interrupt = coordinator.interrupt_flag();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        interrupt.store(true, Ordering::SeqCst);
    })
    .context("Failed to set signal handler")?;

    // Create progress reporter
    let progress = show_progress.then(ProgressReporter::new);
    if let Some(ref p) = progress {
        p.set_status("Starting workers...");
    }

    let sink = progress.clone();
    let report = coordinator
        .run(move |snapshot: &SearchProgress| {
            if let Some(ref p) = sink {
                p.update(snapshot);
            }
        })
        .context("Search failed")?;

    // Finish progress
    if let Some(ref p) = progress {
        p.finish_and_clear();
    }

    // Print summary
    print_summary(&report);

    if report.is_partial() {
        warn!(
            failed = report.failed_workers,
            abandoned = report.abandoned_workers,
            "Search ended with untested partitions"
        );
    }

    let code = match report.outcome {
        SearchOutcome::Found(_) => ExitCode::SUCCESS,
        SearchOutcome::Exhausted => ExitCode::from(EXIT_EXHAUSTED),
        SearchOutcome::Interrupted => {
            info!("Search was interrupted before completion");
            ExitCode::from(EXIT_INTERRUPTED)
        }
    };

    Ok(code)
}

fn setup_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("zip_bruteforce=debug,warn")
    } else {
        EnvFilter::new("zip_bruteforce=info,warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
