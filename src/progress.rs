//! Progress reporting for the password search
//!
//! Provides real-time progress display using indicatif progress bars.
//! When stderr is not a terminal the same line is logged instead.

use crate::archive::ArchiveTarget;
use crate::config::SearchConfig;
use crate::search::{SearchOutcome, SearchProgress, SearchReport};
use chrono::{DateTime, Local};
use console::{style, Term};
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::info;

/// Progress reporter that displays search status
///
/// Cheap to clone; clones drive the same spinner.
#[derive(Clone)]
pub struct ProgressReporter {
    /// Spinner, absent when stderr is not a terminal
    bar: Option<ProgressBar>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        if !Term::stderr().is_term() {
            return Self { bar: None };
        }

        let bar = ProgressBar::new_spinner();

        if let Ok(spinner) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(spinner.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar: Some(bar) }
    }

    /// Update the progress display
    pub fn update(&self, progress: &SearchProgress) {
        let line = format_progress_line(progress);
        match &self.bar {
            Some(bar) => bar.set_message(line),
            None => info!("{}", line),
        }
    }

    /// Set a status message
    pub fn set_status(&self, status: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(status.to_string());
        }
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one status line
///
/// `Attempts: 1,234 | Elapsed: 00:01:02 | Progress: 0.05% | Rate: 12,345/s | ETA: 01:02:03`
pub fn format_progress_line(progress: &SearchProgress) -> String {
    let eta = match progress.eta() {
        Some(eta) => format_duration(eta),
        None => "--:--:--".to_string(),
    };

    format!(
        "Attempts: {} | Elapsed: {} | Progress: {:.2}% | Rate: {}/s | ETA: {}",
        format_number(progress.attempts),
        format_duration(progress.elapsed),
        progress.percent(),
        format_number(progress.rate() as u64),
        eta,
    )
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| {
            chunk
                .iter()
                .rev()
                .map(|&b| b as char)
                .collect::<String>()
        })
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Format a duration as HH:MM:SS (hours keep growing past 99)
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Print a header at the start of the search
pub fn print_header(config: &SearchConfig, target: &ArchiveTarget, started: DateTime<Local>) {
    let member = target.member();
    let keyspace = &config.keyspace;

    println!();
    println!(
        "{} {}",
        style(env!("CARGO_PKG_NAME")).cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!("{}", style("─".repeat(50)).dim());
    println!(
        "  {} {}",
        style("Archive:").bold(),
        target.path().display()
    );
    println!(
        "  {} {} ({}, {} of {} members)",
        style("Member:").bold(),
        member.name,
        format_size(member.compressed_size, BINARY),
        member.index + 1,
        target.member_count()
    );
    println!(
        "  {} {} ({} symbols)",
        style("Alphabet:").bold(),
        keyspace.alphabet_string(),
        keyspace.alphabet().len()
    );
    println!("  {} {}", style("Length:").bold(), keyspace.length());
    println!(
        "  {} {}",
        style("Keyspace:").bold(),
        format_number(keyspace.size())
    );
    println!("  {} {}", style("Workers:").bold(), config.worker_count);
    println!(
        "  {} {}",
        style("Started:").bold(),
        started.format("%Y-%m-%d %H:%M:%S")
    );
    println!();
}

/// Print a summary of the search results
pub fn print_summary(report: &SearchReport) {
    let progress = report.progress();

    println!();
    match &report.outcome {
        SearchOutcome::Found(_) => println!("{}", style("Password Found").green().bold()),
        SearchOutcome::Exhausted => {
            println!("{}", style("Keyspace Exhausted").yellow().bold())
        }
        SearchOutcome::Interrupted => println!("{}", style("Search Interrupted").red().bold()),
    }
    println!("{}", style("─".repeat(50)).dim());

    if let Some(discovery) = report.discovery() {
        println!(
            "  {} {}",
            style("Password:").bold(),
            style(&discovery.password).green()
        );
    }
    println!(
        "  {} {} of {} ({:.2}%)",
        style("Attempts:").bold(),
        format_number(report.attempts),
        format_number(report.keyspace_size),
        progress.percent()
    );
    println!(
        "  {} {} ({}/s)",
        style("Elapsed:").bold(),
        format_duration(report.duration),
        format_number(progress.rate() as u64)
    );
    println!("  {} {}", style("Workers:").bold(), report.workers);
    if report.failed_workers > 0 {
        println!(
            "  {} {}",
            style("Failed:").yellow().bold(),
            report.failed_workers
        );
    }
    if report.abandoned_workers > 0 {
        println!(
            "  {} {}",
            style("Abandoned:").yellow().bold(),
            report.abandoned_workers
        );
    }
    if let Some(path) = &report.output_path {
        println!("  {} {}", style("Output:").bold(), path.display());
    }
    if report.is_partial() && report.discovery().is_none() {
        println!(
            "  {}",
            style("Some partitions were not fully tested").yellow()
        );
    }
    println!();
}
