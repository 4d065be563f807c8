//! Pointer gesture state.
//!
//! Exactly one gesture is active at a time. A pointer-down picks the mode,
//! pointer-move/up dispatch on the current value, and pointer-up (or a
//! cancel) returns the surface to `Idle`. Because move/up events are routed
//! through this single value, the handlers of one mode can never observe
//! events belonging to another.
//!
//! | Press | Mode |
//! |-------|------|
//! | Primary on an element | `Dragging` |
//! | Primary on background | `AreaSelecting` |
//! | Middle anywhere, Alt+primary on background | `Panning` |

use rd_core::{Bounds, ElementId, Point};
use smallvec::SmallVec;

/// Pre-drag geometry of one selected element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOrigin {
    pub id: ElementId,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    /// The element under the pointer at press time.
    pub grabbed: ElementId,
    /// Pointer position minus the grabbed element's `start`, canvas units.
    pub offset: Point,
    /// `start` of the grabbed element when the drag began.
    pub grabbed_start: Point,
    /// Geometry of every selected element when the drag began.
    pub origins: SmallVec<[DragOrigin; 8]>,
}

impl DragState {
    /// Translation to apply to every origin for a pointer at `pointer`
    /// (canvas coordinates). One delta for the whole group keeps
    /// multi-element drags rigid whichever member was grabbed.
    pub fn delta(&self, pointer: Point) -> Point {
        pointer - self.offset - self.grabbed_start
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Dragging(DragState),
    AreaSelecting {
        start: Point,
        end: Point,
        /// Union with the existing selection instead of replacing it.
        extend: bool,
    },
    Panning {
        /// Last pointer position, screen units.
        last: Point,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Dragging(_) => "dragging",
            Gesture::AreaSelecting { .. } => "area-selecting",
            Gesture::Panning { .. } => "panning",
        }
    }

    /// Rubber-band rectangle while area-selecting.
    pub fn selection_rect(&self) -> Option<Bounds> {
        match self {
            Gesture::AreaSelecting { start, end, .. } => Some(Bounds::from_corners(*start, *end)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn delta_is_independent_of_grab_point() {
        let state = DragState {
            grabbed: ElementId::intern("g"),
            offset: Point::new(5.0, 5.0),
            grabbed_start: Point::new(100.0, 100.0),
            origins: smallvec![],
        };
        // Pressed at (105, 105); pointer now at (125, 95).
        assert_eq!(state.delta(Point::new(125.0, 95.0)), Point::new(20.0, -10.0));
        assert_eq!(state.delta(Point::new(105.0, 105.0)), Point::ZERO);
    }

    #[test]
    fn only_area_selection_has_rect() {
        let g = Gesture::AreaSelecting {
            start: Point::new(10.0, 10.0),
            end: Point::new(0.0, 30.0),
            extend: false,
        };
        assert_eq!(
            g.selection_rect(),
            Some(Bounds { x: 0.0, y: 10.0, width: 10.0, height: 20.0 })
        );
        assert_eq!(Gesture::Panning { last: Point::ZERO }.selection_rect(), None);
        assert!(Gesture::default().is_idle());
    }
}
