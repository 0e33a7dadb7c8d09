//! Search coordinator - orchestrates the parallel password search
//!
//! The coordinator is responsible for:
//! - Partitioning the keyspace and spawning one worker per partition
//! - Running the progress monitor
//! - Waiting for a result, exhaustion or an interrupt
//! - Cancelling workers and abandoning stragglers after a grace period
//! - Writing the password file once every worker has stopped
//! - Final statistics

use crate::archive::VerifierFactory;
use crate::config::SearchConfig;
use crate::error::{CrackError, Result, WorkerOutcome};
use crate::search::keyspace::Partitioner;
use crate::search::monitor::{ProgressMonitor, SearchProgress};
use crate::search::state::{Discovery, SearchState};
use crate::search::worker::{Worker, WorkerExit};
use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How often the coordinator re-checks the found and interrupt flags
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How the search ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A worker published the password
    Found(Discovery),

    /// Every worker finished without a match
    Exhausted,

    /// Stopped by an operator interrupt
    Interrupted,
}

/// Result of a completed search
#[derive(Debug)]
pub struct SearchReport {
    /// How the search ended
    pub outcome: SearchOutcome,

    /// Final value of the shared attempt counter
    pub attempts: u64,

    /// Total candidates in the keyspace
    pub keyspace_size: u64,

    /// Time taken for the search
    pub duration: Duration,

    /// Partitions the keyspace was split into (one worker each)
    pub workers: usize,

    /// Workers that stopped on an error (their partitions were not finished)
    pub failed_workers: usize,

    /// Workers still running when the grace period ran out
    pub abandoned_workers: usize,

    /// Where the password was written, if it was
    pub output_path: Option<PathBuf>,
}

impl SearchReport {
    /// The discovered password, if any
    pub fn discovery(&self) -> Option<&Discovery> {
        match &self.outcome {
            SearchOutcome::Found(discovery) => Some(discovery),
            _ => None,
        }
    }

    /// Final progress snapshot
    pub fn progress(&self) -> SearchProgress {
        SearchProgress {
            attempts: self.attempts,
            keyspace_size: self.keyspace_size,
            elapsed: self.duration,
        }
    }

    /// True if some partitions were never fully tested
    pub fn is_partial(&self) -> bool {
        self.failed_workers > 0 || self.abandoned_workers > 0
    }
}

/// Coordinates the parallel password search
pub struct SearchCoordinator<F: VerifierFactory> {
    /// Configuration
    config: Arc<SearchConfig>,

    /// Opens one verifier per worker
    factory: Arc<F>,

    /// Operator interrupt signal
    interrupt: Arc<AtomicBool>,
}

impl<F: VerifierFactory> SearchCoordinator<F> {
    /// Create a new search coordinator
    pub fn new(config: SearchConfig, factory: F) -> Self {
        Self {
            config: Arc::new(config),
            factory: Arc::new(factory),
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Get a clone of the interrupt flag (for signal handlers)
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupt)
    }

    /// Run the search, handing progress snapshots to `sink`
    pub fn run<S>(self, sink: S) -> Result<SearchReport>
    where
        S: FnMut(&SearchProgress) + Send + 'static,
    {
        let start_time = Instant::now();
        let keyspace = &self.config.keyspace;

        let partitions = Partitioner::partition(keyspace, self.config.worker_count);
        info!(
            keyspace = keyspace.size(),
            length = keyspace.length(),
            symbols = keyspace.alphabet().len(),
            workers = partitions.len(),
            prefix_len = partitions.first().map(|p| p.prefix_len()).unwrap_or(0),
            "Starting password search"
        );

        let state = Arc::new(SearchState::new());
        let (exit_tx, exit_rx) = unbounded::<WorkerExit>();

        // Started first: if it cannot spawn, no worker is running yet
        let monitor = ProgressMonitor::spawn(
            Arc::clone(&state),
            keyspace.size(),
            self.config.report_interval,
            start_time,
            sink,
        )?;

        let partition_count = partitions.len();

        let mut workers = Vec::with_capacity(partitions.len());
        let mut failed_workers = 0;
        for partition in partitions {
            let id = partition.index();
            match Worker::spawn(
                partition,
                Arc::clone(&self.factory),
                Arc::clone(&state),
                self.config.batch_size,
                exit_tx.clone(),
            ) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    warn!(worker = id, error = %e, "Partition abandoned");
                    failed_workers += 1;
                }
            }
        }
        // Workers hold the remaining senders
        drop(exit_tx);
        info!(count = workers.len(), "Workers spawned");

        let mut exited = HashSet::with_capacity(workers.len());
        let interrupted = self.wait_for_completion(
            &state,
            &exit_rx,
            workers.len(),
            &mut exited,
            &mut failed_workers,
        );

        // Stop everyone still scanning
        state.cancel();
        self.drain_exits(&exit_rx, workers.len(), &mut exited, &mut failed_workers);

        let mut abandoned_workers = 0;
        for worker in workers {
            if exited.contains(&worker.id()) {
                if let Err(e) = worker.join() {
                    debug!(error = %e, "Worker failed to join cleanly");
                }
            } else {
                warn!(
                    worker = worker.id(),
                    grace_secs = self.config.grace_period.as_secs_f64(),
                    "Worker did not stop within the grace period, abandoning it"
                );
                worker.detach();
                abandoned_workers += 1;
            }
        }

        monitor.stop();

        let outcome = match state.discovery() {
            Some(discovery) => SearchOutcome::Found(discovery.clone()),
            None if interrupted => SearchOutcome::Interrupted,
            None => SearchOutcome::Exhausted,
        };

        let output_path = match (&outcome, &self.config.output_path) {
            (SearchOutcome::Found(discovery), Some(path)) => {
                save_password(path, &discovery.password)?;
                info!(path = %path.display(), "Password saved");
                Some(path.clone())
            }
            _ => None,
        };

        let duration = start_time.elapsed();
        let attempts = state.attempts();

        info!(
            outcome = outcome_name(&outcome),
            attempts = attempts,
            failed = failed_workers,
            abandoned = abandoned_workers,
            duration_secs = duration.as_secs_f64(),
            "Search finished"
        );

        Ok(SearchReport {
            outcome,
            attempts,
            keyspace_size: keyspace.size(),
            duration,
            workers: partition_count,
            failed_workers,
            abandoned_workers,
            output_path,
        })
    }

    /// Wait until a password is published, every worker exits, or an interrupt
    ///
    /// Returns true if the wait ended because of an interrupt.
    fn wait_for_completion(
        &self,
        state: &SearchState,
        exits: &Receiver<WorkerExit>,
        spawned: usize,
        exited: &mut HashSet<usize>,
        failed: &mut usize,
    ) -> bool {
        loop {
            if state.is_found() {
                return false;
            }

            if self.interrupt.load(Ordering::Relaxed) {
                info!("Interrupt received, cancelling search");
                return true;
            }

            if exited.len() >= spawned {
                return false;
            }

            match exits.recv_timeout(POLL_INTERVAL) {
                Ok(exit) => record_exit(exit, exited, failed),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return false,
            }
        }
    }

    /// Collect exit notices from cancelled workers until the grace period runs out
    fn drain_exits(
        &self,
        exits: &Receiver<WorkerExit>,
        spawned: usize,
        exited: &mut HashSet<usize>,
        failed: &mut usize,
    ) {
        let deadline = Instant::now() + self.config.grace_period;

        while exited.len() < spawned {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match exits.recv_timeout(remaining) {
                Ok(exit) => record_exit(exit, exited, failed),
                Err(_) => break,
            }
        }
    }
}

fn record_exit(exit: WorkerExit, exited: &mut HashSet<usize>, failed: &mut usize) {
    match &exit.outcome {
        WorkerOutcome::Failed(e) => {
            warn!(worker = exit.id, tested = exit.tested, error = %e, "Worker failed, partition abandoned");
            *failed += 1;
        }
        outcome => {
            debug!(worker = exit.id, tested = exit.tested, outcome = ?outcome, "Worker exited");
        }
    }
    exited.insert(exit.id);
}

fn outcome_name(outcome: &SearchOutcome) -> &'static str {
    match outcome {
        SearchOutcome::Found(_) => "found",
        SearchOutcome::Exhausted => "exhausted",
        SearchOutcome::Interrupted => "interrupted",
    }
}

/// Write the password file: one line, the password
fn save_password(path: &Path, password: &str) -> Result<()> {
    fs::write(path, format!("{}\n", password)).map_err(|source| CrackError::Output {
        path: path.to_path_buf(),
        password: password.to_string(),
        source,
    })
}

/// Run a search without progress reporting
///
/// Returns the discovered password, or `None` if the keyspace was
/// exhausted.
pub fn search<F: VerifierFactory>(config: SearchConfig, factory: F) -> Result<Option<Discovery>> {
    let report = SearchCoordinator::new(config, factory).run(|_: &SearchProgress| {})?;
    Ok(report.discovery().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Verifier;
    use crate::error::{VerifyError, VerifyResult};
    use crate::search::keyspace::Keyspace;
    use std::io;
    use std::thread;

    /// Accepts one password; optionally fails or stalls on some workers
    struct FakeArchive {
        password: Option<&'static str>,
        failing_workers: Vec<usize>,
        stall_on: Option<&'static str>,
    }

    struct FakeVerifier {
        password: Option<&'static str>,
        fail: bool,
        stall_on: Option<&'static str>,
    }

    impl Verifier for FakeVerifier {
        fn verify(&mut self, candidate: &[u8]) -> VerifyResult<bool> {
            if self.fail {
                return Err(VerifyError::Io {
                    member: "fake".into(),
                    source: io::Error::from_raw_os_error(2),
                });
            }
            if self.stall_on.map(str::as_bytes) == Some(candidate) {
                thread::sleep(Duration::from_secs(2));
            }
            Ok(self.password.map(str::as_bytes) == Some(candidate))
        }
    }

    impl VerifierFactory for FakeArchive {
        type Verifier = FakeVerifier;

        fn open(&self, worker: usize) -> VerifyResult<FakeVerifier> {
            Ok(FakeVerifier {
                password: self.password,
                fail: self.failing_workers.contains(&worker),
                stall_on: self.stall_on,
            })
        }
    }

    fn fake(password: Option<&'static str>) -> FakeArchive {
        FakeArchive {
            password,
            failing_workers: Vec::new(),
            stall_on: None,
        }
    }

    fn config(alphabet: &str, length: usize, workers: usize) -> SearchConfig {
        SearchConfig::new("fake.zip", Keyspace::new(alphabet, length).unwrap())
            .with_workers(workers)
            .with_batch_size(16)
            .with_report_interval(Duration::from_millis(10))
            .with_grace_period(Duration::from_millis(500))
    }

    #[test]
    fn test_search_finds_password() {
        let found = search(config("01", 3, 2), fake(Some("101"))).unwrap().unwrap();
        assert_eq!(found.password, "101");
        assert!(found.attempts <= 8);
    }

    #[test]
    fn test_search_exhausts_keyspace() {
        let report = SearchCoordinator::new(config("abc", 4, 3), fake(Some("abcd")))
            .run(|_: &SearchProgress| {})
            .unwrap();

        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(report.attempts, 81);
        assert_eq!(report.attempts, report.keyspace_size);
        assert!(!report.is_partial());
    }

    #[test]
    fn test_failed_worker_does_not_stop_search() {
        let mut archive = fake(Some("yz"));
        archive.failing_workers = vec![0];

        let report = SearchCoordinator::new(config("0123456789xyz", 2, 3), archive)
            .run(|_: &SearchProgress| {})
            .unwrap();

        assert_eq!(report.failed_workers, 1);
        assert!(report.is_partial());
        // Prefix 'y' is #11 of 13, owned by worker 2
        assert_eq!(report.discovery().unwrap().password, "yz");
    }

    #[test]
    fn test_interrupt_reports_interrupted() {
        let coordinator = SearchCoordinator::new(config("0123456789", 7, 2), fake(None));
        coordinator.interrupt_flag().store(true, Ordering::SeqCst);

        let report = coordinator.run(|_: &SearchProgress| {}).unwrap();

        assert_eq!(report.outcome, SearchOutcome::Interrupted);
        assert!(report.attempts < report.keyspace_size);
    }

    #[test]
    fn test_stalled_worker_is_abandoned() {
        let mut archive = fake(Some("10"));
        // Worker 0 starts at "00" and hangs; worker 1 starts at "10" and wins
        archive.stall_on = Some("00");
        let cfg = config("01", 2, 2).with_grace_period(Duration::from_millis(100));

        let report = SearchCoordinator::new(cfg, archive)
            .run(|_: &SearchProgress| {})
            .unwrap();

        assert_eq!(report.discovery().unwrap().password, "10");
        assert_eq!(report.abandoned_workers, 1);
        assert!(report.is_partial());
    }

    #[test]
    fn test_password_file_written_on_success() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("password.txt");
        let cfg = config("ab", 4, 2).with_output(&output);

        let report = SearchCoordinator::new(cfg, fake(Some("baba")))
            .run(|_: &SearchProgress| {})
            .unwrap();

        assert_eq!(report.output_path.as_deref(), Some(output.as_path()));
        assert_eq!(fs::read_to_string(&output).unwrap(), "baba\n");
    }

    #[test]
    fn test_password_file_not_written_when_exhausted() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("password.txt");
        let cfg = config("ab", 3, 2).with_output(&output);

        let report = SearchCoordinator::new(cfg, fake(None))
            .run(|_: &SearchProgress| {})
            .unwrap();

        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert!(report.output_path.is_none());
        assert!(!output.exists());
    }
}
