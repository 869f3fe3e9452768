//! Monotonic time source for the effect scheduler.

use std::future::Future;
use std::time::Duration;

use crate::runtime::{self, Instant};

/// Trait for reading elapsed time and waiting.
///
/// [`RuntimeClock`] is backed by the selected async runtime. Tests can supply
/// a virtual clock to make scheduling deterministic.
pub trait Clock: Send + Sync {
    /// Time since the clock was created. Never decreases.
    fn elapsed(&self) -> Duration;

    /// Wait for the given duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

/// The runtime's monotonic clock.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeClock {
    origin: Instant,
}

impl Default for RuntimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeClock {
    pub fn new() -> Self {
        RuntimeClock {
            origin: Instant::now(),
        }
    }
}

impl Clock for RuntimeClock {
    fn elapsed(&self) -> Duration {
        self.origin.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        runtime::sleep(duration).await
    }
}
