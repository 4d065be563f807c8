//! Integration tests: reading and writing a host element list.

use pretty_assertions::assert_eq;
use rd_core::{Color, Element, ElementId, FontWeight, Point};

fn yard() -> Vec<Element> {
    serde_json::from_str(include_str!("fixtures/yard.json")).unwrap()
}

#[test]
fn stored_size_is_recomputed_from_corners() {
    let elements = yard();
    let siding = &elements[0];
    assert_eq!(siding.id, ElementId::intern("track_3"));
    assert_eq!((siding.width(), siding.height()), (400.0, 0.0));
    // Drawn right-to-left: the signed extent keeps the direction.
    assert_eq!(siding.extent(), Point::new(-400.0, 0.0));
    assert!(siding.shape_elements.is_empty());
}

#[test]
fn partial_styles_fill_in_defaults() {
    let station = &yard()[1];
    let styles = station.styles.unwrap();
    assert_eq!(styles.fill, Color::WHITE);
    assert_eq!(styles.stroke, Color::BLACK);
    assert_eq!(styles.stroke_width, 2.0);
    assert_eq!(styles.opacity, 0.5);
    assert_eq!(station.rotation, -30.0);
}

#[test]
fn text_regions_and_renderer_fields_survive() {
    let station = &yard()[1];
    let regions: Vec<_> = station.text_regions().collect();
    assert_eq!(regions.len(), 2);
    assert_eq!(regions[0].color.as_deref(), Some("navy"));
    let font = regions[0].font.as_ref().unwrap();
    assert_eq!(font.weight, Some(FontWeight::Named("bold".into())));
    assert_eq!(
        regions[1].font.as_ref().unwrap().weight,
        Some(FontWeight::Numeric(600))
    );

    // A malformed region list reads as empty, the fragment itself survives.
    let path = &station.shape_elements[1];
    assert!(path.text_regions.is_empty());
    assert_eq!(path.extra["d"], "M0 0 L10 10");
}

#[test]
fn written_list_reads_back_identically() {
    let elements = yard();
    let json = serde_json::to_string(&elements).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value[0]["width"], 400.0);
    assert_eq!(value[1]["styles"]["fill"], "#ffffff");
    assert!(value[2].get("styles").is_none());
    assert_eq!(value[2]["name"], "");

    let again: Vec<Element> = serde_json::from_str(&json).unwrap();
    assert_eq!(again, elements);
}
