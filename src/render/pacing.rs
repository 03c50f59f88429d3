//! Throttle and debounce gates for high-frequency input.
//!
//! Both are explicit-time state machines: the caller passes `now` and polls
//! for trailing work, so they run the same under a browser event loop, a
//! native timer pump or a test.

use std::time::Duration;

use web_time::Instant;

/// Outcome of [`Throttle::call`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    /// Run the work now.
    Run,
    /// A trailing run was armed; it becomes due after the given wait.
    Deferred(Duration),
    /// A trailing run is already armed; drop this call.
    Suppressed,
}

/// Limits work to once per `limit`, with one trailing run for calls that
/// arrive inside the window.
#[derive(Debug, Clone)]
pub struct Throttle {
    limit: Duration,
    last_run: Option<Instant>,
    trailing: Option<Instant>,
}

impl Throttle {
    pub fn new(limit: Duration) -> Self {
        Self {
            limit,
            last_run: None,
            trailing: None,
        }
    }

    pub fn call(&mut self, now: Instant) -> ThrottleDecision {
        let remaining = self.last_run.map_or(Duration::ZERO, |last| {
            self.limit.saturating_sub(now.saturating_duration_since(last))
        });

        if remaining.is_zero() {
            self.trailing = None;
            self.last_run = Some(now);
            ThrottleDecision::Run
        } else if self.trailing.is_none() {
            self.trailing = Some(now + remaining);
            ThrottleDecision::Deferred(remaining)
        } else {
            ThrottleDecision::Suppressed
        }
    }

    /// True once when the armed trailing run is due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.trailing {
            Some(due) if now >= due => {
                self.trailing = None;
                self.last_run = Some(now);
                true
            }
            _ => false,
        }
    }

    pub fn has_trailing(&self) -> bool {
        self.trailing.is_some()
    }
}

/// Delays work until `wait` has passed without another trigger.
#[derive(Debug, Clone)]
pub struct Debounce {
    wait: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            deadline: None,
        }
    }

    /// (Re)arm the gate.
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.wait);
    }

    /// True once when the quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_throttle_runs_first_call_immediately() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(100));
        assert_eq!(throttle.call(t0), ThrottleDecision::Run);
    }

    #[test]
    fn test_throttle_defers_then_suppresses() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(100));
        throttle.call(t0);

        assert_eq!(throttle.call(t0 + ms(30)), ThrottleDecision::Deferred(ms(70)));
        assert_eq!(throttle.call(t0 + ms(50)), ThrottleDecision::Suppressed);
        assert!(!throttle.poll(t0 + ms(99)));
        assert!(throttle.poll(t0 + ms(100)));
        assert!(!throttle.has_trailing());
        assert!(!throttle.poll(t0 + ms(200)));
    }

    #[test]
    fn test_throttle_runs_again_after_window() {
        let t0 = Instant::now();
        let mut throttle = Throttle::new(ms(100));
        throttle.call(t0);
        assert_eq!(throttle.call(t0 + ms(150)), ThrottleDecision::Run);
    }

    #[test]
    fn test_debounce_waits_for_quiet() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(100));
        debounce.trigger(t0);
        debounce.trigger(t0 + ms(80));

        assert!(!debounce.poll(t0 + ms(120)));
        assert!(debounce.poll(t0 + ms(180)));
        assert!(!debounce.poll(t0 + ms(400)));
    }

    #[test]
    fn test_debounce_cancel() {
        let t0 = Instant::now();
        let mut debounce = Debounce::new(ms(10));
        debounce.trigger(t0);
        debounce.cancel();
        assert!(!debounce.is_armed());
        assert!(!debounce.poll(t0 + ms(50)));
    }
}
