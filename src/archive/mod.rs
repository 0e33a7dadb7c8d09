//! Encrypted archive access
//!
//! This module inspects the archive once before the search and gives each
//! worker its own read-only handle for testing candidates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                   ArchiveTarget                      │
//! │  - Opened once by the coordinator                   │
//! │  - Picks the smallest encrypted member              │
//! │  - Implements VerifierFactory                       │
//! └──────────────────────────┬──────────────────────────┘
//!                            │ open() per worker
//!                            ▼
//! ┌─────────────────────────────────────────────────────┐
//! │                    ZipVerifier                       │
//! │  - One per worker thread (owns its file handle)     │
//! │  - Closed on drop, on every exit path               │
//! │  - Wrong password -> Ok(false), never an error      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use zip_bruteforce::archive::{ArchiveTarget, Verifier, VerifierFactory};
//!
//! let target = ArchiveTarget::inspect("secret.zip").unwrap();
//! println!("testing against {}", target.member().name);
//!
//! let mut verifier = target.open(0).unwrap();
//! if verifier.verify(b"hunter2").unwrap() {
//!     println!("password is hunter2");
//! }
//! ```

pub mod target;
pub mod verifier;

pub use target::{select_member, ArchiveMember, ArchiveTarget};
pub use verifier::{Verifier, VerifierFactory, ZipVerifier};
