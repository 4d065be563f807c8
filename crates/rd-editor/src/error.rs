//! Error types for the canvas engine and properties editor.

use rd_core::ElementId;
use std::fmt;
use thiserror::Error;

/// Failures surfaced by canvas and editor operations. None of these are
/// fatal; callers degrade to a no-op and optionally notify the host.
#[derive(Error, Debug)]
pub enum EditorError {
    #[error("canvas is not available")]
    CanvasUnavailable,

    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    #[error("duplicate element id {0}")]
    DuplicateId(ElementId),

    #[error("invalid palette payload: {0}")]
    Palette(#[source] serde_json::Error),

    #[error("invalid clipboard data: {0}")]
    ClipboardFormat(#[source] serde_json::Error),

    #[error("clipboard data is not from this application (marker `{0}`)")]
    ForeignClipboard(String),

    #[error("system clipboard write failed: {0}")]
    ClipboardWrite(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

pub type EditorResult<T> = Result<T, EditorError>;

/// Fields the properties editor validates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Width,
    Height,
    Fill,
    Stroke,
    StrokeWidth,
    Opacity,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Width => "width",
            Field::Height => "height",
            Field::Fill => "fill",
            Field::Stroke => "stroke",
            Field::StrokeWidth => "strokeWidth",
            Field::Opacity => "opacity",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected edit on one field.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct ValidationError {
    pub field: Field,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: Field, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}
