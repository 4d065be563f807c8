//! Canvas-space geometry: points, sizes and axis-aligned bounds.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A position in canvas (or screen) units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle, always normalized (non-negative width/height).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    /// Normalize two corner points into a rectangle.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn min(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn max(&self) -> Point {
        Point::new(self.x + self.width, self.y + self.height)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px <= self.x + self.width && py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Inclusive AABB overlap: rectangles that only share an edge or a
    /// corner still count as intersecting.
    pub fn intersects(&self, other: &Bounds) -> bool {
        self.x <= other.x + other.width
            && self.x + self.width >= other.x
            && self.y <= other.y + other.height
            && self.y + self.height >= other.y
    }

    /// Smallest rectangle covering both.
    pub fn union(&self, other: &Bounds) -> Bounds {
        let min = Point::new(self.x.min(other.x), self.y.min(other.y));
        let max = Point::new(
            (self.x + self.width).max(other.x + other.width),
            (self.y + self.height).max(other.y + other.height),
        );
        Bounds::from_corners(min, max)
    }

    /// Bounding box of a set of rectangles; `None` when the set is empty.
    pub fn enclosing(items: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        items.into_iter().reduce(|acc, b| acc.union(&b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_normalize() {
        let b = Bounds::from_corners(Point::new(50.0, 10.0), Point::new(10.0, 40.0));
        assert_eq!(b, Bounds { x: 10.0, y: 10.0, width: 40.0, height: 30.0 });
    }

    #[test]
    fn edge_touch_intersects() {
        let a = Bounds { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
        let b = Bounds { x: 10.0, y: 5.0, width: 10.0, height: 10.0 };
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));

        let c = Bounds { x: 10.5, y: 0.0, width: 2.0, height: 2.0 };
        assert!(!a.intersects(&c));
    }

    #[test]
    fn zero_area_bounds_intersect_when_inside() {
        let line = Bounds::from_corners(Point::new(5.0, 5.0), Point::new(15.0, 5.0));
        let area = Bounds { x: 0.0, y: 0.0, width: 8.0, height: 8.0 };
        assert!(line.intersects(&area));
    }

    #[test]
    fn enclosing_covers_all() {
        let b = Bounds::enclosing([
            Bounds { x: 0.0, y: 0.0, width: 10.0, height: 10.0 },
            Bounds { x: 30.0, y: -5.0, width: 5.0, height: 5.0 },
        ])
        .unwrap();
        assert_eq!(b, Bounds { x: 0.0, y: -5.0, width: 35.0, height: 15.0 });
        assert!(Bounds::enclosing(std::iter::empty()).is_none());
    }
}
