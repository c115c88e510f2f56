use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Signal polled by a running search between iterations.
///
/// Clones share the same flag, so a clone can be handed to another thread or a timer.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
