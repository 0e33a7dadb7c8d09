//! Error types for zip-bruteforce
//!
//! This module defines the error hierarchy for:
//! - Configuration and archive inspection errors (fatal before any worker starts)
//! - Verifier I/O errors (fatal to the owning worker only)
//! - Worker thread errors
//!
//! A wrong password is never an error. The verifier reports it as `Ok(false)`.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for the password search
#[derive(Error, Debug)]
pub enum CrackError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Password found but could not be persisted
    #[error("Found password '{password}' but failed to write '{path}': {source}")]
    Output {
        path: PathBuf,
        password: String,
        source: std::io::Error,
    },

    /// I/O errors (progress monitor thread spawn, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration and archive inspection errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Archive path does not exist
    #[error("Archive not found: '{path}'")]
    ArchiveNotFound { path: PathBuf },

    /// File exists but could not be read as a ZIP archive
    #[error("Cannot read '{path}' as a ZIP archive: {reason}")]
    InvalidArchive { path: PathBuf, reason: String },

    /// Archive has no members to test against
    #[error("Archive '{path}' has no members")]
    EmptyArchive { path: PathBuf },

    /// Archive has members but none of them is encrypted
    #[error("Archive '{path}' has no encrypted members")]
    NotEncrypted { path: PathBuf },

    /// Alphabet has no symbols
    #[error("Alphabet is empty")]
    EmptyAlphabet,

    /// Alphabet lists a symbol twice
    #[error("Alphabet contains duplicate symbol '{symbol}'")]
    DuplicateSymbol { symbol: char },

    /// Candidate length out of range
    #[error("Invalid password length {length}: must be at least 1")]
    InvalidLength { length: usize },

    /// Keyspace size overflows the attempt counter
    #[error("Keyspace of {symbols} symbols at length {length} is too large to enumerate")]
    KeyspaceTooLarge { symbols: usize, length: usize },

    /// Invalid worker count
    #[error("Invalid worker count {count}: must be between 1 and {max}")]
    InvalidWorkerCount { count: usize, max: usize },

    /// Invalid batch size
    #[error("Invalid batch size {size}: must be between {min} and {max}")]
    InvalidBatchSize { size: usize, min: usize, max: usize },

    /// Report interval or grace period is not a usable duration
    #[error("Invalid {name} '{value}': must be a finite number of seconds{constraint}")]
    InvalidInterval {
        name: &'static str,
        value: f64,
        constraint: &'static str,
    },
}

/// Errors raised by a verifier that are unrelated to password correctness
#[derive(Error, Debug)]
pub enum VerifyError {
    /// Failed to open the archive for this worker
    #[error("Failed to open archive '{path}': {reason}")]
    Open { path: PathBuf, reason: String },

    /// Archive I/O failed while testing a candidate
    #[error("I/O error reading member '{member}': {source}")]
    Io {
        member: String,
        source: std::io::Error,
    },
}

/// Worker thread errors
#[derive(Error, Debug)]
pub enum WorkerError {
    /// Worker could not open its verifier
    #[error("Failed to initialize worker {id}: {reason}")]
    InitFailed { id: usize, reason: String },

    /// Verifier failed with an unexpected I/O error
    #[error("Worker {id} verifier error: {source}")]
    Verify { id: usize, source: VerifyError },

    /// Worker thread could not be spawned
    #[error("Failed to spawn worker {id}: {reason}")]
    SpawnFailed { id: usize, reason: String },

    /// Worker panicked
    #[error("Worker {id} panicked")]
    Panicked { id: usize },
}

/// Result type alias for CrackError
pub type Result<T> = std::result::Result<T, CrackError>;

/// Result type alias for VerifyError
pub type VerifyResult<T> = std::result::Result<T, VerifyError>;

/// Terminal state of a single worker
#[derive(Debug)]
pub enum WorkerOutcome {
    /// This worker published the password
    Found,

    /// Partition fully tested without a match
    Exhausted,

    /// Stopped early because the search was cancelled
    Cancelled,

    /// Stopped by an unexpected error; its partition is abandoned
    Failed(WorkerError),
}

impl WorkerOutcome {
    /// Returns true if this worker tested every candidate it owned
    pub fn is_exhausted(&self) -> bool {
        matches!(self, WorkerOutcome::Exhausted)
    }

    /// Returns true if the worker failed
    pub fn is_failed(&self) -> bool {
        matches!(self, WorkerOutcome::Failed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let config_err = ConfigError::EmptyAlphabet;
        let err: CrackError = config_err.into();
        assert!(matches!(err, CrackError::Config(ConfigError::EmptyAlphabet)));

        let io_err = std::io::Error::new(std::io::ErrorKind::WouldBlock, "spawn");
        let err: CrackError = io_err.into();
        assert!(matches!(err, CrackError::Io(_)));
    }

    #[test]
    fn test_error_messages() {
        let err = ConfigError::DuplicateSymbol { symbol: 'a' };
        assert_eq!(err.to_string(), "Alphabet contains duplicate symbol 'a'");

        let err = WorkerError::Panicked { id: 3 };
        assert_eq!(err.to_string(), "Worker 3 panicked");
    }

    #[test]
    fn test_worker_outcome_predicates() {
        assert!(WorkerOutcome::Exhausted.is_exhausted());
        assert!(!WorkerOutcome::Found.is_exhausted());
        assert!(WorkerOutcome::Failed(WorkerError::Panicked { id: 0 }).is_failed());
        assert!(!WorkerOutcome::Cancelled.is_failed());
    }
}
