//! Configuration types for zip-bruteforce
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Charset presets for building the alphabet
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::search::Keyspace;
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 1024;

/// Batch size limits
const MIN_BATCH_SIZE: usize = 1;
const MAX_BATCH_SIZE: usize = 1_000_000;

/// Defaults shared by the CLI and the library builder
pub const DEFAULT_LENGTH: usize = 6;
pub const DEFAULT_BATCH_SIZE: usize = 100;
pub const DEFAULT_REPORT_INTERVAL_SECS: f64 = 2.5;
pub const DEFAULT_GRACE_SECS: f64 = 5.0;

/// Brute-force password recovery for encrypted ZIP archives
#[derive(Parser, Debug, Clone)]
#[command(
    name = "zip-bruteforce",
    version,
    about = "Brute-force password recovery for encrypted ZIP archives",
    long_about = "Tries every password of a fixed length over a fixed alphabet against the\n\
                  smallest encrypted member of a ZIP archive, using one worker thread per\n\
                  keyspace partition. The recovered password is written to a file.",
    after_help = "EXAMPLES:\n    \
        zip-bruteforce secret.zip\n    \
        zip-bruteforce secret.zip -l 4 -c digits -w 8\n    \
        zip-bruteforce secret.zip -a 01 -l 12 -o found.txt\n    \
        zip-bruteforce secret.zip -c digits,lower,upper -l 5 -i 10"
)]
pub struct CliArgs {
    /// Encrypted ZIP archive to attack
    #[arg(value_name = "ARCHIVE")]
    pub archive: PathBuf,

    /// File to write the recovered password to
    #[arg(short, long, default_value = "password.txt", value_name = "FILE")]
    pub output: PathBuf,

    /// Charset presets making up the alphabet, in order
    #[arg(
        short = 'c',
        long,
        value_enum,
        value_delimiter = ',',
        default_values_t = [Charset::Digits, Charset::Lower],
        value_name = "SET"
    )]
    pub charset: Vec<Charset>,

    /// Explicit alphabet (overrides --charset)
    #[arg(short = 'a', long, value_name = "SYMBOLS")]
    pub alphabet: Option<String>,

    /// Password length
    #[arg(short = 'l', long, default_value_t = DEFAULT_LENGTH, value_name = "NUM")]
    pub length: usize,

    /// Number of worker threads
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// Candidates tested between checks of the stop signal
    #[arg(short = 'b', long, default_value_t = DEFAULT_BATCH_SIZE, value_name = "NUM")]
    pub batch_size: usize,

    /// Seconds between progress reports
    #[arg(short = 'i', long, default_value_t = DEFAULT_REPORT_INTERVAL_SECS, value_name = "SECS")]
    pub interval: f64,

    /// Seconds to wait for workers after cancelling before abandoning them
    #[arg(long, default_value_t = DEFAULT_GRACE_SECS, value_name = "SECS")]
    pub grace: f64,

    /// Quiet mode - suppress progress output
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (per-worker events)
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Alphabet presets
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Charset {
    /// 0-9
    Digits,
    /// a-z
    Lower,
    /// A-Z
    Upper,
    /// Printable ASCII punctuation
    Symbols,
}

impl Charset {
    /// Symbols of this preset, in order
    pub fn symbols(self) -> &'static str {
        match self {
            Charset::Digits => "0123456789",
            Charset::Lower => "abcdefghijklmnopqrstuvwxyz",
            Charset::Upper => "ABCDEFGHIJKLMNOPQRSTUVWXYZ",
            Charset::Symbols => "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~",
        }
    }

    /// Concatenate presets, skipping repeated presets
    pub fn alphabet(sets: &[Charset]) -> String {
        let mut seen = Vec::with_capacity(sets.len());
        let mut alphabet = String::new();
        for set in sets {
            if !seen.contains(set) {
                seen.push(*set);
                alphabet.push_str(set.symbols());
            }
        }
        alphabet
    }
}

fn default_workers() -> usize {
    // Verification is CPU bound: one worker per core
    num_cpus::get()
}

fn seconds(name: &'static str, value: f64, allow_zero: bool) -> Result<Duration, ConfigError> {
    let valid = value.is_finite() && (value > 0.0 || (allow_zero && value == 0.0));
    if !valid {
        return Err(ConfigError::InvalidInterval {
            name,
            value,
            constraint: if allow_zero {
                " (0 or more)"
            } else {
                " greater than 0"
            },
        });
    }
    Duration::try_from_secs_f64(value).map_err(|_| ConfigError::InvalidInterval {
        name,
        value,
        constraint: "",
    })
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Archive to attack
    pub archive_path: PathBuf,

    /// Password file, written only on success
    pub output_path: Option<PathBuf>,

    /// Alphabet and length
    pub keyspace: Keyspace,

    /// Number of worker threads
    pub worker_count: usize,

    /// Candidates per batch
    pub batch_size: usize,

    /// Time between progress reports
    pub report_interval: Duration,

    /// How long to wait for cancelled workers
    pub grace_period: Duration,

    /// Show progress indicator
    pub show_progress: bool,
}

impl SearchConfig {
    /// Configuration with default tuning for `keyspace`
    pub fn new(archive_path: impl AsRef<Path>, keyspace: Keyspace) -> Self {
        Self {
            archive_path: archive_path.as_ref().to_path_buf(),
            output_path: None,
            keyspace,
            worker_count: default_workers(),
            batch_size: DEFAULT_BATCH_SIZE,
            report_interval: Duration::from_secs_f64(DEFAULT_REPORT_INTERVAL_SECS),
            grace_period: Duration::from_secs_f64(DEFAULT_GRACE_SECS),
            show_progress: false,
        }
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let alphabet = match args.alphabet {
            Some(alphabet) => alphabet,
            None => Charset::alphabet(&args.charset),
        };
        let keyspace = Keyspace::new(&alphabet, args.length)?;

        // Validate worker count
        if args.workers == 0 || args.workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: args.workers,
                max: MAX_WORKERS,
            });
        }

        // Validate batch size
        if args.batch_size < MIN_BATCH_SIZE || args.batch_size > MAX_BATCH_SIZE {
            return Err(ConfigError::InvalidBatchSize {
                size: args.batch_size,
                min: MIN_BATCH_SIZE,
                max: MAX_BATCH_SIZE,
            });
        }

        let report_interval = seconds("report interval", args.interval, false)?;
        let grace_period = seconds("grace period", args.grace, true)?;

        Ok(Self {
            archive_path: args.archive,
            output_path: Some(args.output),
            keyspace,
            worker_count: args.workers,
            batch_size: args.batch_size,
            report_interval,
            grace_period,
            show_progress: !args.quiet,
        })
    }

    /// Set the number of workers
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.worker_count = workers.clamp(1, MAX_WORKERS);
        self
    }

    /// Set the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(MIN_BATCH_SIZE, MAX_BATCH_SIZE);
        self
    }

    /// Set the progress report interval
    pub fn with_report_interval(mut self, interval: Duration) -> Self {
        self.report_interval = interval;
        self
    }

    /// Set the cancellation grace period
    pub fn with_grace_period(mut self, grace: Duration) -> Self {
        self.grace_period = grace;
        self
    }

    /// Write the password to `path` on success
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output_path = Some(path.as_ref().to_path_buf());
        self
    }
}
