//! Progress monitor - samples the shared counter on a timer
//!
//! Runs on its own thread and never touches worker state beyond a relaxed
//! load of the attempt counter. Snapshots are handed to a sink closure
//! (the CLI renders them, tests collect them).

use crate::search::state::SearchState;
use crossbeam_channel::{bounded, RecvTimeoutError, Sender};
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::warn;

/// Progress information for display
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchProgress {
    /// Candidates tested so far, all workers
    pub attempts: u64,

    /// Total candidates in the keyspace
    pub keyspace_size: u64,

    /// Time since the search started
    pub elapsed: Duration,
}

impl SearchProgress {
    /// Attempts per second since the start
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }

    /// Share of the keyspace covered, 0-100
    pub fn percent(&self) -> f64 {
        if self.keyspace_size == 0 {
            return 100.0;
        }
        (self.attempts as f64 / self.keyspace_size as f64 * 100.0).min(100.0)
    }

    /// Candidates not yet tested
    pub fn remaining(&self) -> u64 {
        self.keyspace_size.saturating_sub(self.attempts)
    }

    /// Estimated time to exhaust the keyspace; `None` until a rate is known
    pub fn eta(&self) -> Option<Duration> {
        let rate = self.rate();
        if rate <= 0.0 {
            return None;
        }
        Duration::try_from_secs_f64(self.remaining() as f64 / rate).ok()
    }
}

/// Handle on the monitor thread
pub struct ProgressMonitor {
    /// Dropping the sender wakes and stops the monitor
    stop: Option<Sender<()>>,

    handle: Option<JoinHandle<()>>,
}

impl ProgressMonitor {
    /// Start sampling `state` every `interval`
    pub fn spawn<S>(
        state: Arc<SearchState>,
        keyspace_size: u64,
        interval: Duration,
        started: Instant,
        mut sink: S,
    ) -> io::Result<Self>
    where
        S: FnMut(&SearchProgress) + Send + 'static,
    {
        let (stop_tx, stop_rx) = bounded::<()>(0);

        let handle = thread::Builder::new()
            .name("progress-monitor".into())
            .spawn(move || loop {
                match stop_rx.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {
                        let progress = SearchProgress {
                            attempts: state.attempts(),
                            keyspace_size,
                            elapsed: started.elapsed(),
                        };
                        sink(&progress);
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            })?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Stop the monitor and wait for its thread
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        drop(self.stop.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Progress monitor panicked");
            }
        }
    }
}

impl Drop for ProgressMonitor {
    fn drop(&mut self) {
        self.shutdown();
    }
}
