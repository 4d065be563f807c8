pub mod geometry;
pub mod id;
pub mod model;

pub use geometry::{Bounds, Point, Size};
pub use id::ElementId;
pub use model::*;
