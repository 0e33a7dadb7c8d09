//! zip-bruteforce - Parallel Password Recovery for Encrypted ZIP Archives
//!
//! Recovers the password of an encrypted ZIP archive member by exhaustive
//! search over every candidate of a fixed length drawn from a fixed
//! alphabet. The keyspace is split into disjoint partitions that are tested
//! concurrently, one worker thread per partition.
//!
//! # Features
//!
//! - **Disjoint Partitions**: Candidates are grouped by prefix and prefixes
//!   are dealt round-robin, so no candidate is tested twice and every
//!   candidate is owned by exactly one worker.
//!
//! - **Private Archive Handles**: Each worker opens its own reader on the
//!   archive and never shares it.
//!
//! - **Batched Accounting**: Workers add to the shared attempt counter once
//!   per batch and check the stop signal between batches, so a discovery
//!   halts everyone within one batch.
//!
//! - **Bounded Shutdown**: Cancelled workers get a grace period; stragglers
//!   are abandoned and reported rather than waited on forever.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Encrypted ZIP archive                        │
//! │              (smallest encrypted member selected)                │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//!                               │ decrypt + CRC check
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Worker Threads                              │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │Worker 0 │  │Worker 1 │  │Worker 2 │  ...    │Worker N │     │
//! │  │verifier │  │verifier │  │verifier │         │verifier │     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       │            │            │                    │          │
//! │       └────────────┼────────────┼────────────────────┘          │
//! │                    ▼            ▼                               │
//! │            ┌──────────────────────────┐                         │
//! │            │      Shared State        │◄──── Progress Monitor   │
//! │            │  - attempt counter       │                         │
//! │            │  - found / cancelled     │                         │
//! │            │  - result slot           │                         │
//! │            └────────────┬─────────────┘                         │
//! │                         ▼                                       │
//! │            ┌──────────────────────────┐                         │
//! │            │      Coordinator         │                         │
//! │            │  - grace-period joins    │                         │
//! │            └──────────────────────────┘                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//!                    ┌──────────────────┐
//!                    │  password.txt    │
//!                    └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```bash
//! # Six characters of digits and lowercase letters (the default)
//! zip-bruteforce secret.zip
//!
//! # Four digit PIN on eight workers
//! zip-bruteforce secret.zip -c digits -l 4 -w 8
//!
//! # Custom alphabet, custom output file
//! zip-bruteforce secret.zip -a 01 -l 12 -o found.txt
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod progress;
pub mod search;

pub use archive::{ArchiveTarget, Verifier, VerifierFactory, ZipVerifier};
pub use config::{Charset, CliArgs, SearchConfig};
pub use error::{ConfigError, CrackError, Result};
pub use search::{search, Discovery, Keyspace, SearchCoordinator, SearchOutcome, SearchReport};
