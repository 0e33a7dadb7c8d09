//! Parallel keyspace search
//!
//! This module splits the candidate keyspace into disjoint partitions and
//! tests them concurrently, one worker thread per partition.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │   SearchCoordinator     │
//!                     │  - Partitions keyspace  │
//!                     │  - Waits / cancels      │
//!                     │  - Writes password file │
//!                     └───────────┬─────────────┘
//!                                 │
//!       ┌─────────────────────────┼─────────────────────────┐
//!       │                         │                         │
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 0 │             │  Worker 1 │             │  Worker N │
//! │ prefixes  │             │ prefixes  │             │ prefixes  │
//! │ 0, N, 2N  │             │ 1, N+1... │             │    ...    │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       │     fetch_add per batch │                         │
//!       └─────────────────────────┼─────────────────────────┘
//!                                 ▼
//!                     ┌─────────────────────────┐
//!                     │      SearchState        │
//!                     │  attempts / found /     │◄──── ProgressMonitor
//!                     │  result / cancelled     │      (samples on a timer)
//!                     └─────────────────────────┘
//! ```

pub mod coordinator;
pub mod keyspace;
pub mod monitor;
pub mod state;
pub mod worker;

pub use coordinator::{search, SearchCoordinator, SearchOutcome, SearchReport};
pub use keyspace::{CandidateCursor, Keyspace, Partition, Partitioner};
pub use monitor::{ProgressMonitor, SearchProgress};
pub use state::{Discovery, SearchState};
pub use worker::{search_partition, Worker, WorkerExit};
