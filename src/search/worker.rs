//! Worker thread logic for the parallel search
//!
//! Each worker:
//! - Opens its own verifier (private archive handle, closed on exit)
//! - Walks its partition in fixed-size batches
//! - Adds each finished batch to the shared counter with one `fetch_add`
//! - Checks the shared stop signal between batches
//! - Publishes the password and cancels the search on a match
//! - Sends exactly one exit notice to the coordinator, even on panic

use crate::archive::{Verifier, VerifierFactory};
use crate::error::{WorkerError, WorkerOutcome};
use crate::search::keyspace::Partition;
use crate::search::state::{Discovery, SearchState};
use crossbeam_channel::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, trace, warn};

/// Final report a worker sends to the coordinator
#[derive(Debug)]
pub struct WorkerExit {
    /// Worker ID (same as its partition index)
    pub id: usize,

    /// Terminal state
    pub outcome: WorkerOutcome,

    /// Candidates this worker tested and accounted to the shared counter
    pub tested: u64,
}

/// Sends the exit notice; reports a panic if dropped unsent
struct ExitNotice {
    id: usize,
    sender: Sender<WorkerExit>,
    sent: bool,
}

impl ExitNotice {
    fn new(id: usize, sender: Sender<WorkerExit>) -> Self {
        Self {
            id,
            sender,
            sent: false,
        }
    }

    fn send(mut self, exit: WorkerExit) {
        self.sent = true;
        // Coordinator may have given up on us already
        let _ = self.sender.send(exit);
    }
}

impl Drop for ExitNotice {
    fn drop(&mut self) {
        if !self.sent {
            let _ = self.sender.send(WorkerExit {
                id: self.id,
                outcome: WorkerOutcome::Failed(WorkerError::Panicked { id: self.id }),
                tested: 0,
            });
        }
    }
}

/// A worker thread searching one partition
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawn a new worker thread for `partition`
    pub fn spawn<F: VerifierFactory>(
        partition: Partition,
        factory: Arc<F>,
        state: Arc<SearchState>,
        batch_size: usize,
        exits: Sender<WorkerExit>,
    ) -> Result<Self, WorkerError> {
        let id = partition.index();

        let handle = thread::Builder::new()
            .name(format!("cracker-{}", id))
            .spawn(move || {
                let notice = ExitNotice::new(id, exits);
                let exit = worker_main(&partition, factory.as_ref(), &state, batch_size);
                notice.send(exit);
            })
            .map_err(|e| WorkerError::SpawnFailed {
                id,
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            handle: Some(handle),
        })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(mut self) -> Result<(), WorkerError> {
        match self.handle.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| WorkerError::Panicked { id: self.id }),
            None => Ok(()),
        }
    }

    /// Stop tracking a worker that did not exit in time
    ///
    /// The thread keeps running until its current verification returns,
    /// then sees the stop signal and exits on its own.
    pub fn detach(mut self) {
        self.handle.take();
    }
}

/// Thread body: open a verifier, search, report
fn worker_main<F: VerifierFactory>(
    partition: &Partition,
    factory: &F,
    state: &SearchState,
    batch_size: usize,
) -> WorkerExit {
    let id = partition.index();
    debug!(
        worker = id,
        prefixes = partition.prefixes().len(),
        candidates = partition.len(),
        "Worker starting"
    );

    let mut verifier = match factory.open(id) {
        Ok(verifier) => verifier,
        Err(e) => {
            warn!(worker = id, error = %e, "Failed to open archive");
            return WorkerExit {
                id,
                outcome: WorkerOutcome::Failed(WorkerError::InitFailed {
                    id,
                    reason: e.to_string(),
                }),
                tested: 0,
            };
        }
    };

    let exit = search_partition(partition, &mut verifier, state, batch_size);

    debug!(
        worker = id,
        tested = exit.tested,
        outcome = ?exit.outcome,
        "Worker shutting down"
    );
    exit
}

/// Test every candidate of `partition`, batch by batch
///
/// The stop signal is checked only between batches, so after another
/// worker publishes, this one verifies at most one more batch.
pub fn search_partition<V: Verifier>(
    partition: &Partition,
    verifier: &mut V,
    state: &SearchState,
    batch_size: usize,
) -> WorkerExit {
    let id = partition.index();
    let batch_size = batch_size.max(1) as u64;
    let mut cursor = partition.cursor();
    let mut tested: u64 = 0;

    let exit = |outcome: WorkerOutcome, tested: u64| WorkerExit {
        id,
        outcome,
        tested,
    };

    loop {
        if state.should_stop() {
            return exit(WorkerOutcome::Cancelled, tested);
        }

        let mut batch: u64 = 0;
        while batch < batch_size {
            let Some(candidate) = cursor.next_candidate() else {
                if batch > 0 {
                    state.record_attempts(batch);
                }
                return exit(WorkerOutcome::Exhausted, tested + batch);
            };
            batch += 1;

            match verifier.verify(candidate.as_bytes()) {
                Ok(false) => {}
                Ok(true) => {
                    let attempts = state.record_attempts(batch);
                    let won = state.publish(Discovery {
                        password: candidate.to_string(),
                        attempts,
                        worker: id,
                    });

                    if won {
                        info!(worker = id, attempts = attempts, "Password found");
                        return exit(WorkerOutcome::Found, tested + batch);
                    }
                    debug!(worker = id, "Another worker published first");
                    return exit(WorkerOutcome::Cancelled, tested + batch);
                }
                Err(e) => {
                    state.record_attempts(batch);
                    return exit(
                        WorkerOutcome::Failed(WorkerError::Verify { id, source: e }),
                        tested + batch,
                    );
                }
            }
        }

        let total = state.record_attempts(batch);
        tested += batch;
        trace!(worker = id, tested = tested, total = total, "Batch complete");
    }
}
