use std::time::Duration;

use tokio::time::Instant;

/// A fixed window that starts when created and closes when it runs out or
/// is cancelled.
///
/// Reads the tokio clock, so tests can drive it with
/// [`tokio::time::advance`] on a paused runtime.
#[derive(Clone, Copy, Debug)]
pub struct Countdown {
    started_at: Instant,
    window: Duration,
    cancelled: bool,
}

impl Countdown {
    pub fn start(window: Duration) -> Self {
        Self {
            started_at: Instant::now(),
            window,
            cancelled: false,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed().min(self.window)
    }

    pub fn remaining(&self) -> Duration {
        if self.cancelled {
            return Duration::ZERO;
        }
        self.window.saturating_sub(self.started_at.elapsed())
    }

    /// Whole seconds left, rounded up, as a visitor would see them.
    pub fn remaining_secs(&self) -> u64 {
        let remaining = self.remaining();
        remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0)
    }

    pub fn is_open(&self) -> bool {
        !self.remaining().is_zero()
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }
}
