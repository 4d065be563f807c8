//! Palette items dropped onto the canvas.
//!
//! The toolbox serializes a `PaletteItem` into the drag-and-drop data
//! transfer under [`PALETTE_MIME`]; on drop the canvas turns it into a new
//! element placed around the drop point.

use crate::error::{EditorError, EditorResult};
use rd_core::{Element, ElementId, Point, ShapeFragment, TextRegion, lenient_list};
use serde::Deserialize;

/// Data-transfer key carrying the serialized palette item.
pub const PALETTE_MIME: &str = "application/x-railway-drawer-item";

pub const DEFAULT_ITEM_WIDTH: f32 = 100.0;
pub const DEFAULT_ITEM_HEIGHT: f32 = 100.0;
/// Lines are placed as a horizontal segment this far either side of the
/// drop point.
pub const LINE_HALF_WIDTH: f32 = 50.0;

/// How an item is laid out around the drop point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DrawKind {
    Line,
    Lines,
    Icon,
    Text,
    #[serde(other)]
    Shape,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DrawSpec {
    #[serde(rename = "type")]
    pub kind: DrawKind,
}

/// A toolbox entry as carried by a drop payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteItem {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon_name: Option<String>,
    #[serde(default)]
    pub icon_svg: Option<String>,
    #[serde(default)]
    pub shape: Option<String>,
    #[serde(default)]
    pub draw: Option<DrawSpec>,
    #[serde(default)]
    pub width: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub text_regions: Vec<TextRegion>,
}

impl PaletteItem {
    pub fn from_json(payload: &str) -> EditorResult<Self> {
        serde_json::from_str(payload).map_err(EditorError::Palette)
    }

    /// `draw.type` when present; otherwise icon items are centered and
    /// everything else is a plain shape.
    pub fn draw_kind(&self) -> DrawKind {
        match &self.draw {
            Some(spec) => spec.kind,
            None if self.icon_svg.is_some() || self.icon_name.is_some() => DrawKind::Icon,
            None => DrawKind::Shape,
        }
    }

    /// Corner points for an item dropped at `at` (canvas coordinates).
    pub fn footprint(&self, at: Point) -> (Point, Point) {
        let w = self.width.unwrap_or(DEFAULT_ITEM_WIDTH);
        let h = self.height.unwrap_or(DEFAULT_ITEM_HEIGHT);
        match self.draw_kind() {
            DrawKind::Line => (
                at.offset(-LINE_HALF_WIDTH, 0.0),
                at.offset(LINE_HALF_WIDTH, 0.0),
            ),
            DrawKind::Lines | DrawKind::Icon => (
                at.offset(-w / 2.0, -h / 2.0),
                at.offset(w / 2.0, h / 2.0),
            ),
            // Text sits on the drop point like a baseline.
            DrawKind::Text => (at.offset(0.0, -h), at.offset(w, 0.0)),
            DrawKind::Shape => (at, at.offset(w, h)),
        }
    }

    /// Build the element for a drop at `at`. `taken` reports ids already in
    /// the list.
    pub fn to_element(&self, at: Point, taken: impl Fn(ElementId) -> bool) -> Element {
        let (start, end) = self.footprint(at);
        let id = ElementId::fresh(&self.kind, taken);
        let mut element = Element::new(id, self.kind.clone(), self.name.clone(), start, end);
        if !self.text_regions.is_empty() {
            element.shape_elements.push(ShapeFragment {
                text_regions: self.text_regions.clone(),
                ..ShapeFragment::default()
            });
        }
        element
    }
}
