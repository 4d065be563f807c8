//! Hit testing: point → element lookup and rectangle selection.
//!
//! Elements paint in list order, so the last element whose bounding box
//! contains the point is the topmost one.

use rd_core::{Bounds, Element, ElementId, Point};

/// Find the topmost element at `p` (canvas coordinates).
/// Returns `None` if only background is hit.
pub fn hit_test(elements: &[Element], p: Point) -> Option<ElementId> {
    elements
        .iter()
        .rev()
        .find(|e| e.bounds().contains(p.x, p.y))
        .map(|e| e.id)
}

/// All elements whose bounds intersect `rect`, edge contact included.
/// Returned in list order.
pub fn hit_test_rect(elements: &[Element], rect: &Bounds) -> Vec<ElementId> {
    elements
        .iter()
        .filter(|e| e.bounds().intersects(rect))
        .map(|e| e.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn boxed(id: &str, x: f32, y: f32, w: f32, h: f32) -> Element {
        Element::new(
            ElementId::intern(id),
            "block",
            id,
            Point::new(x, y),
            Point::new(x + w, y + h),
        )
    }

    #[test]
    fn topmost_wins() {
        let elements = vec![boxed("under", 0.0, 0.0, 100.0, 100.0), boxed("over", 50.0, 50.0, 20.0, 20.0)];
        assert_eq!(hit_test(&elements, Point::new(55.0, 55.0)), Some(ElementId::intern("over")));
        assert_eq!(hit_test(&elements, Point::new(5.0, 5.0)), Some(ElementId::intern("under")));
        assert_eq!(hit_test(&elements, Point::new(500.0, 5.0)), None);
    }

    #[test]
    fn rect_selection_counts_touching_edges() {
        let elements = vec![
            boxed("left", 0.0, 0.0, 10.0, 10.0),
            boxed("right", 100.0, 0.0, 10.0, 10.0),
        ];
        let rect = Bounds::from_corners(Point::new(10.0, 0.0), Point::new(50.0, 50.0));
        assert_eq!(hit_test_rect(&elements, &rect), vec![ElementId::intern("left")]);
    }
}
