//! At-most-one-in-flight render guard.
//!
//! A render requested while another one is still running is dropped, not
//! queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared "render in progress" flag.
///
/// Clones observe the same flag, so event callbacks can hold one and check
/// it before asking for a render.
#[derive(Debug, Clone, Default)]
pub struct RenderGuard {
    busy: Arc<AtomicBool>,
}

impl RenderGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the flag. Returns `None` if a render is already in flight.
    #[must_use]
    pub fn try_begin(&self) -> Option<InFlight> {
        self.busy
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| InFlight {
                busy: Arc::clone(&self.busy),
            })
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the guard on drop.
#[derive(Debug)]
pub struct InFlight {
    busy: Arc<AtomicBool>,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
    }
}
