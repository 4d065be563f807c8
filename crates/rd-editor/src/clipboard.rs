//! Clipboard entries and the system-clipboard envelope.
//!
//! Copy keeps snapshots in memory and mirrors them, best effort, to the host
//! clipboard as JSON:
//!
//! ```json
//! { "type": "railway-drawer-elements", "elements": [...], "timestamp": 1718000000000 }
//! ```

use crate::error::{EditorError, EditorResult};
use rd_core::{Bounds, Element, ElementId};
use serde::{Deserialize, Serialize};

/// Marker identifying envelopes written by this editor.
pub const CLIPBOARD_MARKER: &str = "railway-drawer-elements";

/// A copied element, tagged with the id it had when copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipboardEntry {
    pub original_id: ElementId,
    #[serde(flatten)]
    pub element: Element,
}

impl ClipboardEntry {
    pub fn new(element: Element) -> Self {
        Self {
            original_id: element.id,
            element,
        }
    }
}

/// Bounding box of a clipboard set.
pub fn clipboard_bounds(entries: &[ClipboardEntry]) -> Option<Bounds> {
    Bounds::enclosing(entries.iter().map(|e| e.element.bounds()))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardEnvelope {
    #[serde(rename = "type")]
    pub marker: String,
    pub elements: Vec<ClipboardEntry>,
    /// Milliseconds since the Unix epoch.
    pub timestamp: f64,
}

impl ClipboardEnvelope {
    pub fn new(elements: Vec<ClipboardEntry>, timestamp: f64) -> Self {
        Self {
            marker: CLIPBOARD_MARKER.to_string(),
            elements,
            timestamp,
        }
    }

    pub fn to_json(&self) -> EditorResult<String> {
        serde_json::to_string(self).map_err(EditorError::ClipboardFormat)
    }

    /// Parse text read from the system clipboard. Rejects JSON from other
    /// applications.
    pub fn parse(text: &str) -> EditorResult<Self> {
        let envelope: ClipboardEnvelope =
            serde_json::from_str(text).map_err(EditorError::ClipboardFormat)?;
        if envelope.marker != CLIPBOARD_MARKER {
            return Err(EditorError::ForeignClipboard(envelope.marker));
        }
        Ok(envelope)
    }
}

/// Host clipboard writer. Failures are logged and swallowed by the caller.
pub trait SystemClipboard {
    fn write_text(&mut self, text: &str) -> EditorResult<()>;
}

/// Millisecond wall clock used to stamp envelopes.
pub type Clock = fn() -> f64;

/// Default clock. `wasm32` hosts have no system time and must install
/// their own clock; this one reports 0 there.
pub fn system_time_ms() -> f64 {
    #[cfg(not(target_arch = "wasm32"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0)
    }
    #[cfg(target_arch = "wasm32")]
    {
        0.0
    }
}
