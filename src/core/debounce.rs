//! Debounced submit trigger - coalesces rapid control changes.
//!
//! When sliders fire on every drag event the app can either submit each
//! change (default, correctness carried by the sequence tokens) or coalesce
//! a burst into one submission after a quiet interval. This holds the
//! deadline; the newest parameter values are read at trigger time.
//!
//! # Usage
//! ```ignore
//! // On control change:
//! debounce.schedule();
//!
//! // In update loop:
//! if debounce.tick() {
//!     submit_current();
//! }
//! ```

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debounce {
    /// Quiet interval before triggering; zero disables coalescing.
    delay: Duration,
    pending: Option<Instant>,
}

impl Debounce {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            pending: None,
        }
    }

    /// Whether coalescing is active at all.
    pub fn enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    pub fn delay_ms(&self) -> u64 {
        self.delay.as_millis() as u64
    }

    /// Arm (or re-arm) the deadline. Re-scheduling while pending resets the
    /// timer (debounce behavior).
    pub fn schedule(&mut self) {
        let trigger_at = Instant::now() + self.delay;
        self.pending = Some(trigger_at);
        log::trace!("Debounce: scheduled in {}ms", self.delay.as_millis());
    }

    /// Cancel any pending trigger
    pub fn cancel(&mut self) {
        if self.pending.is_some() {
            log::trace!("Debounce: cancelled");
        }
        self.pending = None;
    }

    /// Check if the deadline has passed. Returns true exactly once per
    /// scheduled burst and clears the pending state.
    pub fn tick(&mut self) -> bool {
        let Some(trigger_at) = self.pending else {
            return false;
        };

        if Instant::now() >= trigger_at {
            self.pending = None;
            log::trace!("Debounce: triggered");
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_no_trigger() {
        let mut debounce = Debounce::new(100);
        debounce.schedule();
        assert!(debounce.is_pending());

        // Should not trigger immediately
        assert!(!debounce.tick());
    }

    #[test]
    fn test_trigger_after_delay() {
        let mut debounce = Debounce::new(10); // 10ms
        debounce.schedule();
        std::thread::sleep(Duration::from_millis(15));

        // Should trigger after delay, exactly once
        assert!(debounce.tick());
        assert!(!debounce.is_pending());
        assert!(!debounce.tick());
    }

    #[test]
    fn test_reschedule_resets_timer() {
        let mut debounce = Debounce::new(50);
        debounce.schedule();
        std::thread::sleep(Duration::from_millis(30));

        // Re-schedule - resets timer
        debounce.schedule();

        // Should not trigger yet (timer reset)
        assert!(!debounce.tick());
        assert!(debounce.is_pending());
    }

    #[test]
    fn test_zero_delay_disabled() {
        let debounce = Debounce::new(0);
        assert!(!debounce.enabled());
    }
}
