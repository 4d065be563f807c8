//! Edit validation for the properties editor.
//!
//! A candidate element is checked against the element it was derived from.
//! The name is always checked; geometry and style numbers only when the edit
//! changed them, so an element that is legitimately degenerate (a line has
//! zero height) can still be renamed.

use crate::error::{Field, ValidationError};
use rd_core::Element;

pub struct Validator {
    pub max_name_length: usize,
}

impl Validator {
    pub fn new(max_name_length: usize) -> Self {
        Self { max_name_length }
    }

    /// Every failing field, in display order (name, size, style).
    pub fn validate(&self, base: &Element, candidate: &Element) -> Vec<ValidationError> {
        let mut failures = Vec::new();

        if candidate.name.chars().count() > self.max_name_length {
            failures.push(ValidationError::new(
                Field::Name,
                format!("Name must be at most {} characters", self.max_name_length),
            ));
        }

        let before = base.extent();
        let after = candidate.extent();
        if after.x != before.x && not_positive(after.x) {
            failures.push(ValidationError::new(Field::Width, "Width must be greater than 0"));
        }
        if after.y != before.y && not_positive(after.y) {
            failures.push(ValidationError::new(Field::Height, "Height must be greater than 0"));
        }

        if let Some(style) = &candidate.styles {
            let previous = base.styles.unwrap_or_default();
            if style.stroke_width != previous.stroke_width
                && (style.stroke_width < 0.0 || !style.stroke_width.is_finite())
            {
                failures.push(ValidationError::new(
                    Field::StrokeWidth,
                    "Stroke width cannot be negative",
                ));
            }
            if style.opacity != previous.opacity && !(0.0..=1.0).contains(&style.opacity) {
                failures.push(ValidationError::new(
                    Field::Opacity,
                    "Opacity must be between 0 and 1",
                ));
            }
        }

        failures
    }
}

fn not_positive(v: f32) -> bool {
    v <= 0.0 || v.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rd_core::{ElementId, Point, StyleOverride};

    fn base() -> Element {
        Element::new(
            ElementId::intern("v"),
            "block",
            "Block",
            Point::new(0.0, 0.0),
            Point::new(40.0, 20.0),
        )
    }

    #[test]
    fn long_name_rejected() {
        let v = Validator::new(5);
        let mut c = base();
        c.name = "abcdef".into();
        let failures = v.validate(&base(), &c);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].field, Field::Name);

        c.name = "ñandú".into(); // five chars, more bytes
        assert!(v.validate(&base(), &c).is_empty());
    }

    #[test]
    fn non_positive_size_rejected_only_when_changed() {
        let v = Validator::new(100);
        let mut c = base();
        c.resize(0.0, 20.0);
        let failures = v.validate(&base(), &c);
        assert_eq!(failures[0].field, Field::Width);

        c.resize(-3.0, -1.0);
        let fields: Vec<_> = v.validate(&base(), &c).iter().map(|f| f.field).collect();
        assert_eq!(fields, vec![Field::Width, Field::Height]);

        let line = Element::new(ElementId::intern("l"), "track", "", Point::ZERO, Point::new(100.0, 0.0));
        let mut renamed = line.clone();
        renamed.name = "Up main".into();
        assert!(v.validate(&line, &renamed).is_empty());
    }

    #[test]
    fn style_numbers_checked() {
        let v = Validator::new(100);
        let mut c = base();
        c.styles = Some(StyleOverride {
            opacity: 1.5,
            stroke_width: -1.0,
            ..StyleOverride::default()
        });
        let fields: Vec<_> = v.validate(&base(), &c).iter().map(|f| f.field).collect();
        assert_eq!(fields, vec![Field::StrokeWidth, Field::Opacity]);
    }
}
