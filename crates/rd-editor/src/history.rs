//! Undo history.
//!
//! Every mutating operation pushes a full snapshot of the element list
//! *before* it changes anything; undo pops the newest snapshot and puts it
//! back. Pointer gestures are coalesced: between `begin_gesture()` and
//! `end_gesture()` only the first `record()` lands on the stack, so a drag
//! with any number of move events is a single undo step. The depth bound is
//! applied when a gesture closes, so an aborted gesture leaves the stack
//! exactly as it found it.

use rd_core::Element;
use std::collections::VecDeque;

/// A captured element list.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub elements: Vec<Element>,
    pub label: &'static str,
}

pub struct History {
    undo_stack: VecDeque<Snapshot>,
    /// Maximum undo depth; `None` is unbounded.
    max_depth: Option<usize>,
    /// Inside a pointer gesture.
    gesture_open: bool,
    /// The open gesture already pushed its snapshot.
    gesture_recorded: bool,
}

impl History {
    pub fn new(max_depth: Option<usize>) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            max_depth,
            gesture_open: false,
            gesture_recorded: false,
        }
    }

    /// Start coalescing: only the first `record()` until `end_gesture()`
    /// is kept.
    pub fn begin_gesture(&mut self) {
        self.gesture_open = true;
        self.gesture_recorded = false;
    }

    /// Close the gesture. Returns whether it pushed a snapshot.
    pub fn end_gesture(&mut self) -> bool {
        let recorded = self.gesture_recorded;
        self.gesture_open = false;
        self.gesture_recorded = false;
        self.trim();
        recorded
    }

    /// Close the gesture and withdraw the snapshot it pushed, if any.
    /// Returns whether one was withdrawn.
    pub fn abort_gesture(&mut self) -> bool {
        let recorded = self.gesture_recorded;
        self.gesture_open = false;
        self.gesture_recorded = false;
        if recorded {
            self.undo_stack.pop_back();
        }
        recorded
    }

    /// Snapshot `current` before a mutation. Returns `false` when the open
    /// gesture has already recorded.
    pub fn record(&mut self, current: &[Element], label: &'static str) -> bool {
        if self.gesture_open {
            if self.gesture_recorded {
                return false;
            }
            self.gesture_recorded = true;
        }
        self.undo_stack.push_back(Snapshot {
            elements: current.to_vec(),
            label,
        });
        if !self.gesture_open {
            self.trim();
        }
        log::trace!("history: recorded `{label}` ({} entries)", self.undo_stack.len());
        true
    }

    fn trim(&mut self) {
        if let Some(max) = self.max_depth {
            while self.undo_stack.len() > max {
                self.undo_stack.pop_front();
            }
        }
    }

    /// Pop the newest snapshot.
    pub fn undo(&mut self) -> Option<Snapshot> {
        self.undo_stack.pop_back()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn len(&self) -> usize {
        self.undo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rd_core::{ElementId, Point};

    fn list(n: usize) -> Vec<Element> {
        (0..n)
            .map(|i| {
                Element::new(
                    ElementId::intern(&format!("h_{i}")),
                    "block",
                    "",
                    Point::ZERO,
                    Point::new(10.0, 10.0),
                )
            })
            .collect()
    }

    #[test]
    fn gesture_records_once() {
        let mut history = History::new(None);
        history.begin_gesture();
        assert!(history.record(&list(1), "drag"));
        for _ in 0..5 {
            assert!(!history.record(&list(1), "drag"));
        }
        assert!(history.end_gesture());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn empty_gesture_no_entry() {
        let mut history = History::new(None);
        history.begin_gesture();
        assert!(!history.end_gesture());
        assert!(!history.can_undo());
    }

    #[test]
    fn abort_withdraws_gesture_entry() {
        let mut history = History::new(None);
        history.record(&list(3), "delete");
        history.begin_gesture();
        history.record(&list(2), "drag");
        assert!(history.abort_gesture());
        assert_eq!(history.len(), 1);
        assert_eq!(history.undo().unwrap().label, "delete");
    }

    #[test]
    fn max_depth_trims_oldest() {
        let mut history = History::new(Some(3));
        for i in 0..5 {
            history.record(&list(i), "edit");
        }
        let mut sizes = Vec::new();
        while let Some(s) = history.undo() {
            sizes.push(s.elements.len());
        }
        assert_eq!(sizes, vec![4, 3, 2]);
    }

    #[test]
    fn full_history_survives_aborted_gesture() {
        let mut history = History::new(Some(2));
        history.record(&list(3), "delete");
        history.record(&list(2), "delete");
        history.begin_gesture();
        history.record(&list(1), "move");
        // Over the bound only while the gesture is open.
        assert_eq!(history.len(), 3);
        assert!(history.abort_gesture());

        let sizes: Vec<_> = std::iter::from_fn(|| history.undo())
            .map(|s| s.elements.len())
            .collect();
        assert_eq!(sizes, vec![2, 3]);
    }

    #[test]
    fn zero_depth_keeps_nothing_after_gesture() {
        let mut history = History::new(Some(0));
        history.begin_gesture();
        assert!(history.record(&list(1), "move"));
        assert!(history.end_gesture());
        assert!(!history.can_undo());
    }
}
