//! core::debounce
//!
//! Single-slot debounce timer.
//!
//! # Semantics
//!
//! [`Debouncer::schedule`] cancels whatever job is pending and arms the new
//! one to run once after `delay` of inactivity. Bursts of calls therefore
//! collapse into a single run once activity settles. A zero delay runs the
//! job at the next point where the runtime gets to poll other tasks.
//!
//! Jobs run on the ambient tokio runtime, on its blocking pool, so a job may
//! do synchronous I/O. When no runtime is current nothing ever fires on its
//! own: the job stays pending until [`Debouncer::run_pending`] runs it or a
//! later `schedule` replaces it.
//!
//! # Invariants
//!
//! - At most one job is pending at any time
//! - Every scheduled job is counted exactly once as either cancelled or fired
//!   once it is no longer pending
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use caja_metadata::core::debounce::Debouncer;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut debouncer = Debouncer::new(Duration::from_millis(10));
//! for _ in 0..3 {
//!     debouncer.schedule(|| println!("flush"));
//! }
//! tokio::time::sleep(Duration::from_millis(50)).await;
//!
//! let stats = debouncer.stats();
//! assert_eq!((stats.scheduled, stats.cancelled, stats.fired), (3, 2, 1));
//! # }
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Counters describing what happened to scheduled jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DebounceStats {
    /// Jobs passed to `schedule`.
    pub scheduled: u64,
    /// Jobs invalidated by re-arming or `cancel` before they ran.
    pub cancelled: u64,
    /// Jobs that ran.
    pub fired: u64,
}

#[derive(Debug, Default)]
struct Counters {
    scheduled: AtomicU64,
    cancelled: AtomicU64,
    fired: AtomicU64,
}

/// Holds the armed job until the timer, a cancel or `run_pending` takes it.
struct Slot(Mutex<Option<Job>>);

impl Slot {
    fn new(job: Job) -> Self {
        Self(Mutex::new(Some(job)))
    }

    fn take(&self) -> Option<Job> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).take()
    }

    fn is_armed(&self) -> bool {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).is_some()
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("armed", &self.is_armed())
            .finish()
    }
}

#[derive(Debug)]
struct PendingJob {
    slot: Arc<Slot>,
    /// Timer task; `None` when scheduled without a runtime.
    timer: Option<JoinHandle<()>>,
}

impl PendingJob {
    fn stop_timer(&self) {
        if let Some(timer) = &self.timer {
            timer.abort();
        }
    }
}

/// A cancel-and-replace timer holding at most one pending job.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<PendingJob>,
    counters: Arc<Counters>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm `job`, replacing any job that has not run yet.
    pub fn schedule<F>(&mut self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.cancel();
        self.counters.scheduled.fetch_add(1, Ordering::SeqCst);

        let slot = Arc::new(Slot::new(Box::new(job)));
        let timer = match Handle::try_current() {
            Ok(handle) => Some(self.spawn_timer(&handle, Arc::clone(&slot))),
            Err(_) => {
                tracing::debug!("no async runtime, debounced job waits for run_pending");
                None
            }
        };

        self.pending = Some(PendingJob { slot, timer });
    }

    fn spawn_timer(&self, handle: &Handle, slot: Arc<Slot>) -> JoinHandle<()> {
        let counters = Arc::clone(&self.counters);
        let delay = self.delay;

        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(job) = slot.take() else {
                return;
            };
            counters.fired.fetch_add(1, Ordering::SeqCst);
            if let Err(e) = tokio::task::spawn_blocking(job).await {
                tracing::warn!(error = %e, "debounced job failed");
            }
        })
    }

    /// Drop the pending job without running it.
    ///
    /// Returns `true` if a job was pending.
    pub fn cancel(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        // None: the timer already took it.
        if pending.slot.take().is_none() {
            return false;
        }

        pending.stop_timer();
        self.counters.cancelled.fetch_add(1, Ordering::SeqCst);
        true
    }

    /// Run the pending job on the calling thread instead of waiting for the
    /// timer.
    ///
    /// Returns `true` if a job was pending.
    pub fn run_pending(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };

        let Some(job) = pending.slot.take() else {
            return false;
        };

        pending.stop_timer();
        self.counters.fired.fetch_add(1, Ordering::SeqCst);
        job();
        true
    }

    /// Whether a job is armed and has not started yet.
    pub fn is_pending(&self) -> bool {
        self.pending
            .as_ref()
            .is_some_and(|pending| pending.slot.is_armed())
    }

    pub fn stats(&self) -> DebounceStats {
        DebounceStats {
            scheduled: self.counters.scheduled.load(Ordering::SeqCst),
            cancelled: self.counters.cancelled.load(Ordering::SeqCst),
            fired: self.counters.fired.load(Ordering::SeqCst),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_job(counter: &Arc<AtomicUsize>) -> impl FnOnce() + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_into_one_run() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        for _ in 0..10 {
            debouncer.schedule(counting_job(&runs));
        }
        assert!(debouncer.is_pending());

        tokio::time::sleep(Duration::from_millis(250)).await;

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(
            debouncer.stats(),
            DebounceStats {
                scheduled: 10,
                cancelled: 9,
                fired: 1
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_the_delay() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        debouncer.schedule(counting_job(&runs));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_restarts_the_delay() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(100));

        debouncer.schedule(counting_job(&runs));
        tokio::time::sleep(Duration::from_millis(80)).await;
        debouncer.schedule(counting_job(&runs));
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_delay_runs_after_yielding() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::ZERO);

        debouncer.schedule(counting_job(&runs));
        assert_eq!(runs.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_drops_pending_job() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        debouncer.schedule(counting_job(&runs));
        assert!(debouncer.cancel());
        assert!(!debouncer.is_pending());
        assert!(!debouncer.cancel());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(debouncer.stats().cancelled, 1);
        assert_eq!(debouncer.stats().fired, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_run_is_a_no_op() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_millis(10));

        debouncer.schedule(counting_job(&runs));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(!debouncer.cancel());
        assert_eq!(
            debouncer.stats(),
            DebounceStats {
                scheduled: 1,
                cancelled: 0,
                fired: 1
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_pending_fires_now() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_secs(60));

        debouncer.schedule(counting_job(&runs));
        assert!(debouncer.run_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.run_pending());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(debouncer.stats().fired, 1);
    }

    #[test]
    fn waits_for_run_pending_without_runtime() {
        let runs = Arc::new(AtomicUsize::new(0));
        let mut debouncer = Debouncer::new(Duration::from_secs(5));

        for _ in 0..5 {
            debouncer.schedule(counting_job(&runs));
        }
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert!(debouncer.is_pending());

        assert!(debouncer.run_pending());
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_pending());
        assert_eq!(
            debouncer.stats(),
            DebounceStats {
                scheduled: 5,
                cancelled: 4,
                fired: 1
            }
        );
    }
}
