//! Editor configuration.
//!
//! Every field has a default, so hosts only pass the values they change:
//!
//! ```json
//! { "debounceMs": 150, "historyLimit": null }
//! ```

use rd_core::Color;
use serde::Deserialize;

/// Quiet window before a properties edit is committed.
pub const DEFAULT_DEBOUNCE_MS: f64 = 300.0;
pub const DEFAULT_MAX_NAME_LENGTH: usize = 100;
/// Area selections smaller than this in both axes count as a click.
pub const DEFAULT_AREA_SELECT_THRESHOLD: f32 = 5.0;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorConfig {
    pub debounce_ms: f64,
    pub max_name_length: usize,
    pub area_select_threshold: f32,
    /// `None` keeps every snapshot for the whole session.
    pub history_limit: Option<usize>,
    /// Logical canvas size; its midpoint is the paste target of last resort.
    pub canvas_width: f32,
    pub canvas_height: f32,
    pub default_background: Color,
    pub grid_enabled: bool,
    pub min_zoom: f32,
    pub max_zoom: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            max_name_length: DEFAULT_MAX_NAME_LENGTH,
            area_select_threshold: DEFAULT_AREA_SELECT_THRESHOLD,
            history_limit: Some(DEFAULT_HISTORY_LIMIT),
            canvas_width: 3000.0,
            canvas_height: 2000.0,
            default_background: Color::WHITE,
            grid_enabled: true,
            min_zoom: 0.1,
            max_zoom: 5.0,
        }
    }
}

impl EditorConfig {
    /// Parse a partial JSON config on top of the defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
