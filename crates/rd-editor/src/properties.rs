//! Properties editor: the side panel that edits the selected element.
//!
//! Edits flow through one pipeline:
//!
//! 1. clear all field errors,
//! 2. build a candidate element from the optimistic draft,
//! 3. validate it; on failure record every failing field, report the first
//!    message and stop without writing anything,
//! 4. on success make the candidate the new draft, cancel the pending commit
//!    and schedule a new one after the quiet window.
//!
//! A commit reads the canvas's *current* list, swaps in the edited element
//! by id and writes the whole list back. The panel never mutates canvas
//! state any other way.

use crate::canvas::CanvasApi;
use crate::config::EditorConfig;
use crate::debounce::{Debouncer, TaskHandle};
use crate::error::{EditorError, EditorResult, Field, ValidationError};
use crate::validation::Validator;
use rd_core::{Color, Element, ElementId, Point, Size, StyleOverride};
use std::collections::BTreeMap;

pub type ElementChangeListener = Box<dyn FnMut(&Element)>;
pub type ErrorListener = Box<dyn FnMut(&str)>;

pub const FALLBACK_BACKGROUND: Color = Color::WHITE;
pub const FALLBACK_GRID_ENABLED: bool = true;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    General,
    Style,
    Text,
    Arrange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelMode {
    /// Nothing selected: background and grid settings.
    Canvas,
    Element,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSettings {
    pub background_color: Color,
    pub grid_enabled: bool,
}

impl Default for CanvasSettings {
    fn default() -> Self {
        Self {
            background_color: FALLBACK_BACKGROUND,
            grid_enabled: FALLBACK_GRID_ENABLED,
        }
    }
}

/// Read-only summary for the general tab.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneralInfo {
    pub id: ElementId,
    pub kind: String,
    pub name: String,
    pub position: Point,
    pub size: Size,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StyleValues {
    /// The override, or the defaults the element renders with.
    pub style: StyleOverride,
    pub overridden: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrangeValues {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

/// One editable text region.
#[derive(Debug, Clone, PartialEq)]
pub struct TextField {
    pub fragment: usize,
    pub region_id: String,
    pub text: String,
}

pub struct PropertiesEditor {
    validator: Validator,
    /// The element as last handed down by the host.
    selected: Option<Element>,
    /// Optimistic copy including edits not yet committed.
    draft: Option<Element>,
    tab: Tab,
    errors: BTreeMap<Field, String>,
    pending: Debouncer<Element>,
    commit_task: Option<TaskHandle>,
    on_element_change: Option<ElementChangeListener>,
    on_validation_error: Option<ErrorListener>,
}

impl Default for PropertiesEditor {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

impl PropertiesEditor {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            validator: Validator::new(config.max_name_length),
            selected: None,
            draft: None,
            tab: Tab::default(),
            errors: BTreeMap::new(),
            pending: Debouncer::new(config.debounce_ms),
            commit_task: None,
            on_element_change: None,
            on_validation_error: None,
        }
    }

    pub fn set_element_change_listener(&mut self, listener: ElementChangeListener) {
        self.on_element_change = Some(listener);
    }

    pub fn set_error_listener(&mut self, listener: ErrorListener) {
        self.on_validation_error = Some(listener);
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Hand down the currently selected element.
    ///
    /// An edit still pending for a different element is committed first. If
    /// the same element comes back while its edit is pending, the draft is
    /// kept: the incoming value predates the edit.
    pub fn set_selected(&mut self, element: Option<Element>, canvas: Option<&mut dyn CanvasApi>) {
        let incoming = element.as_ref().map(|e| e.id);
        let pending_for = self.pending.peek().map(|e| e.id);

        if pending_for.is_some() && pending_for != incoming {
            self.flush(canvas);
        }

        let keep_draft = pending_for.is_some() && pending_for == incoming;
        self.selected = element;
        if !keep_draft {
            self.draft = self.selected.clone();
            self.errors.clear();
        }
    }

    pub fn mode(&self) -> PanelMode {
        if self.draft.is_some() {
            PanelMode::Element
        } else {
            PanelMode::Canvas
        }
    }

    pub fn draft(&self) -> Option<&Element> {
        self.draft.as_ref()
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn errors(&self) -> &BTreeMap<Field, String> {
        &self.errors
    }

    pub fn error(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// When the pending commit fires, for hosts that arm a timer.
    pub fn next_commit_ms(&self) -> Option<f64> {
        self.pending.due_ms()
    }

    // ─── Read models ─────────────────────────────────────────────────────

    /// Canvas-level settings, or safe defaults when the canvas is gone.
    pub fn canvas_settings(&self, canvas: Option<&dyn CanvasApi>) -> CanvasSettings {
        match canvas {
            Some(canvas) => CanvasSettings {
                background_color: canvas.background_color(),
                grid_enabled: canvas.grid_enabled(),
            },
            None => CanvasSettings::default(),
        }
    }

    pub fn general_info(&self) -> Option<GeneralInfo> {
        self.draft.as_ref().map(|e| GeneralInfo {
            id: e.id,
            kind: e.kind.clone(),
            name: e.name.clone(),
            position: e.start(),
            size: Size::new(e.width(), e.height()),
        })
    }

    pub fn style_values(&self) -> Option<StyleValues> {
        self.draft.as_ref().map(|e| StyleValues {
            style: e.styles.unwrap_or_default(),
            overridden: e.styles.is_some(),
        })
    }

    pub fn text_fields(&self) -> Vec<TextField> {
        let Some(element) = &self.draft else {
            return Vec::new();
        };
        element
            .shape_elements
            .iter()
            .enumerate()
            .flat_map(|(fragment, f)| {
                f.text_regions.iter().filter_map(move |r| {
                    r.text.as_ref().map(|text| TextField {
                        fragment,
                        region_id: r.id.clone(),
                        text: text.clone(),
                    })
                })
            })
            .collect()
    }

    pub fn arrange_values(&self) -> Option<ArrangeValues> {
        self.draft.as_ref().map(|e| {
            let extent = e.extent();
            ArrangeValues {
                x: e.start().x,
                y: e.start().y,
                width: extent.x,
                height: extent.y,
                rotation: e.rotation,
            }
        })
    }

    // ─── Canvas settings ─────────────────────────────────────────────────

    pub fn set_background_color(
        &mut self,
        canvas: Option<&mut dyn CanvasApi>,
        hex: &str,
    ) -> EditorResult<()> {
        let color = self.parse_color(Field::Fill, hex)?;
        let Some(canvas) = canvas else {
            return Err(self.unavailable());
        };
        canvas.set_background_color(color);
        Ok(())
    }

    pub fn set_grid_enabled(
        &mut self,
        canvas: Option<&mut dyn CanvasApi>,
        enabled: bool,
    ) -> EditorResult<()> {
        let Some(canvas) = canvas else {
            return Err(self.unavailable());
        };
        canvas.set_grid_enabled(enabled);
        Ok(())
    }

    // ─── General ─────────────────────────────────────────────────────────

    pub fn set_name(&mut self, name: &str, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.name = name.to_string())
    }

    // ─── Style ───────────────────────────────────────────────────────────

    pub fn set_fill(&mut self, hex: &str, now_ms: f64) -> Result<bool, ValidationError> {
        self.errors.clear();
        let color = self.parse_color(Field::Fill, hex)?;
        self.edit_style(now_ms, |s| s.fill = color)
    }

    pub fn set_stroke(&mut self, hex: &str, now_ms: f64) -> Result<bool, ValidationError> {
        self.errors.clear();
        let color = self.parse_color(Field::Stroke, hex)?;
        self.edit_style(now_ms, |s| s.stroke = color)
    }

    pub fn set_stroke_width(&mut self, width: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit_style(now_ms, |s| s.stroke_width = width)
    }

    pub fn set_opacity(&mut self, opacity: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit_style(now_ms, |s| s.opacity = opacity)
    }

    /// Drop the style override so the element falls back to its toolbox
    /// styling.
    pub fn reset_styles(&mut self, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.styles = None)
    }

    fn edit_style(
        &mut self,
        now_ms: f64,
        change: impl FnOnce(&mut StyleOverride),
    ) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| {
            let mut style = e.styles.unwrap_or_default();
            change(&mut style);
            e.styles = Some(style);
        })
    }

    // ─── Text ────────────────────────────────────────────────────────────

    /// Edit one text region. Unknown region ids are ignored.
    pub fn set_region_text(
        &mut self,
        region_id: &str,
        text: &str,
        now_ms: f64,
    ) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| {
            if !e.set_region_text(region_id, text) {
                log::debug!("text region `{region_id}` not found on {}", e.id);
            }
        })
    }

    // ─── Arrange ─────────────────────────────────────────────────────────

    pub fn set_x(&mut self, x: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.move_to(x, e.start().y))
    }

    pub fn set_y(&mut self, y: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.move_to(e.start().x, y))
    }

    pub fn set_width(&mut self, width: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.resize(width, e.extent().y))
    }

    pub fn set_height(&mut self, height: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.resize(e.extent().x, height))
    }

    /// Degrees, stored as given.
    pub fn set_rotation(&mut self, degrees: f32, now_ms: f64) -> Result<bool, ValidationError> {
        self.edit(now_ms, |e| e.rotation = degrees)
    }

    // ─── Pipeline ────────────────────────────────────────────────────────

    /// Apply `change` to the draft and submit it. `Ok(false)` when nothing is
    /// selected and no commit was scheduled.
    fn edit(
        &mut self,
        now_ms: f64,
        change: impl FnOnce(&mut Element),
    ) -> Result<bool, ValidationError> {
        self.errors.clear();
        let Some(base) = self.draft.as_ref() else {
            log::debug!("edit ignored: nothing selected");
            return Ok(false);
        };
        let mut candidate = base.clone();
        change(&mut candidate);
        self.submit(candidate, now_ms).map(|()| true)
    }

    /// Validate a whole candidate element and schedule its commit.
    pub fn submit(&mut self, candidate: Element, now_ms: f64) -> Result<(), ValidationError> {
        self.errors.clear();
        let failures = match &self.draft {
            Some(base) => self.validator.validate(base, &candidate),
            None => Vec::new(),
        };
        if let Some(first) = failures.first().cloned() {
            for failure in failures {
                self.errors.insert(failure.field, failure.message);
            }
            self.report(&first.message);
            return Err(first);
        }

        self.draft = Some(candidate.clone());
        if let Some(task) = self.commit_task.take() {
            self.pending.cancel(task);
        }
        self.commit_task = Some(self.pending.schedule(candidate, now_ms));
        Ok(())
    }

    /// Commit the pending edit if its quiet window has passed.
    pub fn tick(&mut self, now_ms: f64, canvas: Option<&mut dyn CanvasApi>) -> bool {
        match self.pending.poll(now_ms) {
            Some(element) => {
                self.commit_task = None;
                self.commit(element, canvas)
            }
            None => false,
        }
    }

    /// Commit the pending edit now.
    pub fn flush(&mut self, canvas: Option<&mut dyn CanvasApi>) -> bool {
        match self.pending.flush() {
            Some(element) => {
                self.commit_task = None;
                self.commit(element, canvas)
            }
            None => false,
        }
    }

    fn commit(&mut self, element: Element, canvas: Option<&mut dyn CanvasApi>) -> bool {
        let Some(canvas) = canvas else {
            self.unavailable();
            return false;
        };

        let mut list = canvas.element_list();
        let Some(slot) = list.iter_mut().find(|e| e.id == element.id) else {
            // Removed on the canvas while the edit was waiting.
            log::debug!("commit dropped: {}", EditorError::ElementNotFound(element.id));
            return false;
        };
        *slot = element.clone();
        if let Err(err) = canvas.replace_element_list(list) {
            log::warn!("commit rejected: {err}");
            self.report(&err.to_string());
            return false;
        }

        log::debug!("committed edit to {}", element.id);
        if self.selected.as_ref().is_some_and(|s| s.id == element.id) {
            self.selected = Some(element.clone());
        }
        if let Some(listener) = self.on_element_change.as_mut() {
            listener(&element);
        }
        true
    }

    fn parse_color(&mut self, field: Field, hex: &str) -> Result<Color, ValidationError> {
        Color::from_hex(hex).ok_or_else(|| {
            let err = ValidationError::new(field, format!("`{hex}` is not a valid color"));
            self.errors.insert(field, err.message.clone());
            self.report(&err.message);
            err
        })
    }

    fn unavailable(&mut self) -> EditorError {
        let err = EditorError::CanvasUnavailable;
        log::warn!("{err}");
        self.report(&err.to_string());
        err
    }

    fn report(&mut self, message: &str) {
        if let Some(listener) = self.on_validation_error.as_mut() {
            listener(message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::CanvasSurface;
    use pretty_assertions::assert_eq;
    use rd_core::{ShapeFragment, TextRegion};

    fn element() -> Element {
        let mut e = Element::new(
            ElementId::intern("p1"),
            "platform",
            "Platform",
            Point::new(10.0, 10.0),
            Point::new(110.0, 60.0),
        );
        e.shape_elements = vec![
            ShapeFragment {
                text_regions: vec![
                    TextRegion {
                        id: "t1".into(),
                        text: Some(String::new()),
                        ..TextRegion::default()
                    },
                    TextRegion {
                        id: "layout-only".into(),
                        ..TextRegion::default()
                    },
                ],
                ..ShapeFragment::default()
            },
            ShapeFragment {
                text_regions: vec![TextRegion {
                    id: "t2".into(),
                    text: Some("1".into()),
                    ..TextRegion::default()
                }],
                ..ShapeFragment::default()
            },
        ];
        e
    }

    fn editor() -> PropertiesEditor {
        let mut editor = PropertiesEditor::default();
        editor.set_selected(Some(element()), None);
        editor
    }

    #[test]
    fn mode_follows_selection() {
        let mut editor = PropertiesEditor::default();
        assert_eq!(editor.mode(), PanelMode::Canvas);
        editor.set_selected(Some(element()), None);
        assert_eq!(editor.mode(), PanelMode::Element);
    }

    #[test]
    fn edits_without_selection_schedule_nothing() {
        let mut editor = PropertiesEditor::default();
        assert_eq!(editor.set_name("Loose", 0.0), Ok(false));
        assert_eq!(editor.reset_styles(0.0), Ok(false));
        assert!(!editor.is_pending());

        let mut editor = self::editor();
        assert_eq!(editor.set_name("Bay", 0.0), Ok(true));
        assert!(editor.is_pending());
    }

    #[test]
    fn text_fields_only_for_regions_with_text() {
        let fields = editor().text_fields();
        let ids: Vec<_> = fields.iter().map(|f| (f.fragment, f.region_id.as_str())).collect();
        assert_eq!(ids, vec![(0, "t1"), (1, "t2")]);
    }

    #[test]
    fn arrange_x_preserves_size_and_width_keeps_start() {
        let mut editor = editor();
        editor.set_x(50.0, 0.0).unwrap();
        let e = editor.draft().unwrap();
        assert_eq!(e.start(), Point::new(50.0, 10.0));
        assert_eq!(e.end(), Point::new(150.0, 60.0));

        editor.set_width(30.0, 0.0).unwrap();
        editor.set_height(5.0, 0.0).unwrap();
        let e = editor.draft().unwrap();
        assert_eq!(e.start(), Point::new(50.0, 10.0));
        assert_eq!(e.end(), Point::new(80.0, 15.0));
    }

    #[test]
    fn rotation_is_not_normalized() {
        let mut editor = editor();
        editor.set_rotation(400.0, 0.0).unwrap();
        assert_eq!(editor.arrange_values().unwrap().rotation, 400.0);
    }

    #[test]
    fn bad_color_is_a_field_error() {
        let mut editor = editor();
        let err = editor.set_fill("#zzz", 0.0).unwrap_err();
        assert_eq!(err.field, Field::Fill);
        assert!(editor.error(Field::Fill).is_some());
        assert!(!editor.is_pending());
        assert!(!editor.style_values().unwrap().overridden);
    }

    #[test]
    fn canvas_settings_fall_back_without_canvas() {
        let editor = PropertiesEditor::default();
        assert_eq!(editor.canvas_settings(None), CanvasSettings::default());
        assert_eq!(editor.canvas_settings(None).background_color.to_hex(), "#ffffff");

        let mut canvas = CanvasSurface::default();
        canvas.set_grid_enabled(false);
        assert!(!editor.canvas_settings(Some(&canvas)).grid_enabled);
    }

    #[test]
    fn canvas_writes_without_canvas_report_unavailable() {
        let mut editor = PropertiesEditor::default();
        assert!(matches!(
            editor.set_grid_enabled(None, false),
            Err(EditorError::CanvasUnavailable)
        ));
        let mut canvas = CanvasSurface::default();
        editor.set_background_color(Some(&mut canvas), "#102030").unwrap();
        assert_eq!(canvas.background_color().to_hex(), "#102030");
    }
}
