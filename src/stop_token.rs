use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Asks a running trace to stop before its next hop. Clones share the flag.
#[derive(Clone, Debug, Default)]
pub struct StopToken {
    should_stop: Arc<AtomicBool>,
}

impl StopToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_should_stop(&self) {
        self.should_stop.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn get_should_stop(&self) -> bool {
        self.should_stop.load(Ordering::SeqCst)
    }
}
