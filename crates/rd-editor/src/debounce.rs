//! Cancellable scheduled task with a quiet window.
//!
//! The host event loop drives time: `schedule()` and `poll()` take the
//! current timestamp in milliseconds (e.g. `performance.now()`). Scheduling
//! again before the window elapses replaces the pending value and restarts
//! the window, so a burst of edits yields one value: the last one.

/// Identifies one scheduled task; stale handles cancel nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskHandle(u64);

#[derive(Debug)]
struct Pending<T> {
    handle: TaskHandle,
    value: T,
    due_ms: f64,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay_ms: f64,
    next_handle: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            next_handle: 0,
            pending: None,
        }
    }

    /// Schedule `value` to fire `delay_ms` after `now_ms`, replacing any
    /// pending value.
    pub fn schedule(&mut self, value: T, now_ms: f64) -> TaskHandle {
        let handle = TaskHandle(self.next_handle);
        self.next_handle += 1;
        self.pending = Some(Pending {
            handle,
            value,
            due_ms: now_ms + self.delay_ms,
        });
        handle
    }

    /// Cancel the task if it is still the pending one. Returns its value.
    pub fn cancel(&mut self, handle: TaskHandle) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.handle == handle) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Take the pending value if its window has elapsed.
    pub fn poll(&mut self, now_ms: f64) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| now_ms >= p.due_ms) {
            self.pending.take().map(|p| p.value)
        } else {
            None
        }
    }

    /// Take the pending value regardless of time.
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending task fires, if any.
    pub fn due_ms(&self) -> Option<f64> {
        self.pending.as_ref().map(|p| p.due_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_yields_last_value_once() {
        let mut d = Debouncer::new(300.0);
        for (i, t) in [0.0, 50.0, 100.0, 150.0, 200.0].into_iter().enumerate() {
            d.schedule(i, t);
            assert_eq!(d.poll(t), None);
        }
        assert_eq!(d.poll(499.0), None);
        assert_eq!(d.poll(500.0), Some(4));
        assert_eq!(d.poll(10_000.0), None);
    }

    #[test]
    fn stale_handle_does_not_cancel() {
        let mut d = Debouncer::new(100.0);
        let first = d.schedule("a", 0.0);
        let second = d.schedule("b", 10.0);
        assert_eq!(d.cancel(first), None);
        assert!(d.is_pending());
        assert_eq!(d.cancel(second), Some("b"));
        assert!(!d.is_pending());
    }

    #[test]
    fn flush_ignores_window() {
        let mut d = Debouncer::new(100.0);
        d.schedule(7, 0.0);
        assert_eq!(d.due_ms(), Some(100.0));
        assert_eq!(d.flush(), Some(7));
        assert_eq!(d.flush(), None);
    }
}
