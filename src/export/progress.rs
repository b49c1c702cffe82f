use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Progress reporting with cooperative cancellation.
///
/// Each export pass is one major step. A `false` return from
/// [`begin_step`](ProgressMonitor::begin_step) or
/// [`increment`](ProgressMonitor::increment) means the user asked to stop.
pub trait ProgressMonitor {
    /// Starts a step of `total` units of work.
    fn begin_step(&mut self, total: usize) -> bool {
        let _ = total;
        true
    }

    /// Reports one unit of work done.
    fn increment(&mut self) -> bool;

    /// Ends the current step. Called even when the step failed.
    fn end_step(&mut self) {}
}

/// Never cancels and reports nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressMonitor for NoProgress {
    fn increment(&mut self) -> bool {
        true
    }
}

/// Cancellation flag that can be raised from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
}

impl CancelFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the running export.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl ProgressMonitor for CancelFlag {
    fn begin_step(&mut self, _total: usize) -> bool {
        !self.is_cancelled()
    }

    fn increment(&mut self) -> bool {
        !self.is_cancelled()
    }
}
