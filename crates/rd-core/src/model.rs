//! Element data model for railway diagrams.
//!
//! A diagram is a flat, ordered list of [`Element`]s (later entries paint on
//! top). Each element carries two corner points, an optional style override,
//! and nested shape fragments whose text regions are user-editable.
//! Canvas-level state (grid, background) is deliberately not part of an
//! element; see `rd_editor::canvas::CanvasContext`.

use crate::geometry::{Bounds, Point};
use crate::id::ElementId;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ─── Colors ──────────────────────────────────────────────────────────────

/// RGBA color. Stored as 4 × u8 and exchanged as a hex string.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

/// Helper to parse a single hex digit.
fn hex_val(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB`, `#RRGGBBAA`.
    /// The leading `#` is optional.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        let bytes = hex.as_bytes();

        let short = |i: usize| hex_val(bytes[i]).map(|v| v * 17);
        let long = |i: usize| Some(hex_val(bytes[i])? << 4 | hex_val(bytes[i + 1])?);

        match bytes.len() {
            3 => Some(Self::rgb(short(0)?, short(1)?, short(2)?)),
            4 => Some(Self::rgba(short(0)?, short(1)?, short(2)?, short(3)?)),
            6 => Some(Self::rgb(long(0)?, long(2)?, long(4)?)),
            8 => Some(Self::rgba(long(0)?, long(2)?, long(4)?, long(6)?)),
            _ => None,
        }
    }

    /// Lowercase `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 0xff {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid hex color `{s}`")))
    }
}

// ─── Style override ──────────────────────────────────────────────────────

pub const DEFAULT_FILL: Color = Color::WHITE;
pub const DEFAULT_STROKE: Color = Color::BLACK;
pub const DEFAULT_STROKE_WIDTH: f32 = 2.0;
pub const DEFAULT_OPACITY: f32 = 1.0;

/// Per-element style override.
///
/// An element with `styles: None` renders with its toolbox styling. That is
/// a different state from `Some(StyleOverride::default())`, which pins the
/// default values explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StyleOverride {
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl Default for StyleOverride {
    fn default() -> Self {
        Self {
            fill: DEFAULT_FILL,
            stroke: DEFAULT_STROKE,
            stroke_width: DEFAULT_STROKE_WIDTH,
            opacity: DEFAULT_OPACITY,
        }
    }
}

// ─── Text regions / shape fragments ──────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FontWeight {
    Numeric(u16),
    Named(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<FontWeight>,
}

/// An editable text leaf inside a shape fragment.
///
/// `text: None` marks a region that exists for layout only; a region with
/// `Some(String::new())` is still editable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextRegion {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<crate::geometry::Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<FontSpec>,
    /// Kept verbatim; renderers accept named colors as well as hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// A nested piece of an element's shape. Renderer-specific fields are
/// carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeFragment {
    #[serde(
        default,
        deserialize_with = "lenient_list",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub text_regions: Vec<TextRegion>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Accept a JSON array of `T`; anything else (missing, null, object,
/// malformed items) reads as an empty list.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Lenient<T> {
        List(Vec<T>),
        Other(IgnoredAny),
    }

    Ok(match Lenient::<T>::deserialize(deserializer)? {
        Lenient::List(items) => items,
        Lenient::Other(_) => {
            log::debug!("ignoring malformed nested list");
            Vec::new()
        }
    })
}

// ─── Element ─────────────────────────────────────────────────────────────

/// A placed diagram object.
///
/// `start`/`end` define the geometry; `width`/`height` are stored alongside
/// for hosts that read them directly and are recomputed by every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ElementRecord")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    start: Point,
    end: Point,
    width: f32,
    height: f32,
    /// Degrees. Not normalized.
    pub rotation: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleOverride>,
    pub shape_elements: Vec<ShapeFragment>,
}

/// Wire form: stored `width`/`height` are ignored in favour of the corners.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementRecord {
    id: ElementId,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    name: String,
    start: Point,
    end: Point,
    #[serde(default)]
    rotation: f32,
    #[serde(default)]
    styles: Option<StyleOverride>,
    #[serde(default, deserialize_with = "lenient_list")]
    shape_elements: Vec<ShapeFragment>,
}

impl From<ElementRecord> for Element {
    fn from(r: ElementRecord) -> Self {
        let mut element = Element::new(r.id, r.kind, r.name, r.start, r.end);
        element.rotation = r.rotation;
        element.styles = r.styles;
        element.shape_elements = r.shape_elements;
        element
    }
}

impl Element {
    pub fn new(
        id: ElementId,
        kind: impl Into<String>,
        name: impl Into<String>,
        start: Point,
        end: Point,
    ) -> Self {
        let mut element = Self {
            id,
            kind: kind.into(),
            name: name.into(),
            start,
            end,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            styles: None,
            shape_elements: Vec::new(),
        };
        element.set_geometry(start, end);
        element
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// `|end.x - start.x|`
    pub fn width(&self) -> f32 {
        self.width
    }

    /// `|end.y - start.y|`
    pub fn height(&self) -> f32 {
        self.height
    }

    /// Signed extent `end - start`; negative when drawn right-to-left or
    /// bottom-to-top.
    pub fn extent(&self) -> Point {
        self.end - self.start
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.start, self.end)
    }

    /// Replace both corners, keeping the stored size consistent.
    pub fn set_geometry(&mut self, start: Point, end: Point) {
        self.start = start;
        self.end = end;
        self.width = (end.x - start.x).abs();
        self.height = (end.y - start.y).abs();
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.set_geometry(self.start.offset(dx, dy), self.end.offset(dx, dy));
    }

    /// Move `start` to `(x, y)`, shifting `end` by the same delta.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let delta = Point::new(x, y) - self.start;
        self.translate(delta.x, delta.y);
    }

    /// Resize from the `start` anchor: `end = start + (width, height)`.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.set_geometry(self.start, self.start.offset(width, height));
    }

    /// Every text region that carries text, in fragment order.
    pub fn text_regions(&self) -> impl Iterator<Item = &TextRegion> {
        self.shape_elements
            .iter()
            .flat_map(|f| f.text_regions.iter())
            .filter(|r| r.text.is_some())
    }

    /// Replace the text of the region with `region_id`. Returns `false` when
    /// no such region exists.
    pub fn set_region_text(&mut self, region_id: &str, text: &str) -> bool {
        for fragment in &mut self.shape_elements {
            if let Some(region) = fragment.text_regions.iter_mut().find(|r| r.id == region_id) {
                region.text = Some(text.to_string());
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn color_hex_roundtrip() {
        let c = Color::from_hex("#1a2B3c").unwrap();
        assert_eq!(c, Color::rgb(0x1a, 0x2b, 0x3c));
        assert_eq!(c.to_hex(), "#1a2b3c");
        assert_eq!(Color::from_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::from_hex("#00000080").unwrap().to_hex(), "#00000080");
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#ggg"), None);
    }

    #[test]
    fn geometry_mutations_keep_size_consistent() {
        let mut e = Element::new(
            ElementId::intern("sig"),
            "signal",
            "S1",
            Point::new(10.0, 20.0),
            Point::new(40.0, 60.0),
        );
        assert_eq!((e.width(), e.height()), (30.0, 40.0));

        e.move_to(100.0, 100.0);
        assert_eq!(e.start(), Point::new(100.0, 100.0));
        assert_eq!(e.end(), Point::new(130.0, 140.0));

        e.resize(50.0, 10.0);
        assert_eq!(e.start(), Point::new(100.0, 100.0));
        assert_eq!(e.end(), Point::new(150.0, 110.0));
        assert_eq!((e.width(), e.height()), (50.0, 10.0));
    }

    #[test]
    fn deserialize_recomputes_size_and_tolerates_bad_nesting() {
        let json = r##"{
            "id": "track_7",
            "type": "track",
            "name": "Main line",
            "start": {"x": 0, "y": 0},
            "end": {"x": 120, "y": 30},
            "width": 999,
            "shapeElements": {"not": "a list"}
        }"##;
        let e: Element = serde_json::from_str(json).unwrap();
        assert_eq!(e.width(), 120.0);
        assert_eq!(e.height(), 30.0);
        assert!(e.shape_elements.is_empty());
        assert!(e.styles.is_none());
    }

    #[test]
    fn text_regions_skip_regions_without_text() {
        let json = r##"{
            "id": "platform_2",
            "type": "platform",
            "start": {"x": 0, "y": 0},
            "end": {"x": 10, "y": 10},
            "shapeElements": [
                {"kind": "rect", "textRegions": [{"id": "a", "text": ""}, {"id": "b"}]},
                {"kind": "label", "textRegions": null},
                {"textRegions": [{"id": "c", "text": "Platform 2"}]}
            ]
        }"##;
        let mut e: Element = serde_json::from_str(json).unwrap();
        let ids: Vec<&str> = e.text_regions().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);

        assert!(e.set_region_text("c", "Platform 3"));
        assert!(!e.set_region_text("missing", "x"));
        let texts: Vec<_> = e.text_regions().map(|r| r.text.clone()).collect();
        assert_eq!(texts, vec![Some(String::new()), Some("Platform 3".to_string())]);
        // Unknown renderer fields survive.
        assert_eq!(e.shape_elements[0].extra.get("kind"), Some(&serde_json::json!("rect")));
    }

    #[test]
    fn styles_absent_is_not_serialized() {
        let e = Element::new(
            ElementId::intern("plain"),
            "text",
            "",
            Point::ZERO,
            Point::new(5.0, 5.0),
        );
        let value = serde_json::to_value(&e).unwrap();
        assert!(value.get("styles").is_none());
        assert_eq!(value["type"], "text");
        assert_eq!(value["width"], 5.0);
    }
}
