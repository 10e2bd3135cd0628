//! Debounced value propagation.
//!
//! Holds the most recent value and releases it only once no newer value
//! has arrived for the configured delay. There is no queueing: setting a
//! value while another is pending replaces it and restarts the timer.
//! Poll from the event-loop tick, the same way `Query` is polled.

use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debounced<T> {
  pending: Option<(T, Instant)>,
  delay: Duration,
}

impl<T> Debounced<T> {
  pub fn new(delay: Duration) -> Self {
    Self {
      pending: None,
      delay,
    }
  }

  /// Record a new value, resetting the timer.
  pub fn set(&mut self, value: T) {
    self.pending = Some((value, Instant::now()));
  }

  /// Drop any pending value without emitting it.
  pub fn cancel(&mut self) {
    self.pending = None;
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Emit the pending value if the delay has elapsed since it was set.
  pub fn poll(&mut self) -> Option<T> {
    match &self.pending {
      Some((_, set_at)) if set_at.elapsed() >= self.delay => {
        self.pending.take().map(|(value, _)| value)
      }
      _ => None,
    }
  }

  /// Emit the pending value immediately, ignoring the timer. Used when
  /// the user explicitly submits.
  pub fn flush(&mut self) -> Option<T> {
    self.pending.take().map(|(value, _)| value)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_only_latest_value_survives() {
    let mut debounced = Debounced::new(Duration::from_millis(10));

    debounced.set("a");
    debounced.set("ab");
    debounced.set("abc");

    assert_eq!(debounced.poll(), None);
    std::thread::sleep(Duration::from_millis(15));
    assert_eq!(debounced.poll(), Some("abc"));
    assert_eq!(debounced.poll(), None);
  }

  #[test]
  fn test_new_value_resets_timer() {
    let mut debounced = Debounced::new(Duration::from_millis(30));

    debounced.set("a");
    std::thread::sleep(Duration::from_millis(20));
    debounced.set("ab");
    std::thread::sleep(Duration::from_millis(20));

    // Only 20ms since the last set, nothing emits yet.
    assert_eq!(debounced.poll(), None);
    std::thread::sleep(Duration::from_millis(15));
    assert_eq!(debounced.poll(), Some("ab"));
  }

  #[test]
  fn test_cancel_drops_pending() {
    let mut debounced = Debounced::new(Duration::from_millis(5));
    debounced.set("a");
    debounced.cancel();

    std::thread::sleep(Duration::from_millis(10));
    assert_eq!(debounced.poll(), None);
  }

  #[test]
  fn test_flush_skips_timer() {
    let mut debounced = Debounced::new(Duration::from_secs(60));
    debounced.set("a");
    assert_eq!(debounced.flush(), Some("a"));
    assert!(!debounced.is_pending());
  }
}
