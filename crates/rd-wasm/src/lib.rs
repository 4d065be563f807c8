//! WASM bridge for Railway Drawer: exposes the canvas engine and the
//! properties editor to the browser host.
//!
//! Compiled via `wasm-pack build --target web`. The host forwards DOM
//! pointer, keyboard and drop events with primitive arguments, renders from
//! `get_render_json()`, and drives the properties editor's quiet window by
//! calling `tick(performance.now())` from its animation loop.

use rd_core::{Element, ElementId, Point};
use rd_editor::canvas::CanvasSurface;
use rd_editor::clipboard::{ClipboardEntry, SystemClipboard};
use rd_editor::config::EditorConfig;
use rd_editor::error::{EditorError, EditorResult, ValidationError};
use rd_editor::input::{Modifiers, PointerButton};
use rd_editor::palette::PALETTE_MIME;
use rd_editor::properties::{PanelMode, PropertiesEditor, Tab};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;

/// Latest single-selection notification from the canvas, drained after
/// every call that can change the selection.
type SelectionSlot = Rc<RefCell<Option<Option<Element>>>>;

/// The main WASM-facing controller.
///
/// Owns the canvas surface and the properties panel. All interaction from
/// the page goes through this struct.
#[wasm_bindgen]
pub struct RailCanvas {
    canvas: CanvasSurface,
    properties: PropertiesEditor,
    selection: SelectionSlot,
    on_selection_change: Option<js_sys::Function>,
}

#[wasm_bindgen]
impl RailCanvas {
    /// Create a controller with default settings for a viewport of the given
    /// size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f32, height: f32) -> Self {
        Self::build(EditorConfig::default(), width, height)
    }

    /// Create a controller from a partial JSON config.
    pub fn with_config(json: &str, width: f32, height: f32) -> Result<RailCanvas, JsValue> {
        let config = EditorConfig::from_json(json)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?;
        Ok(Self::build(config, width, height))
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.canvas.set_viewport(width, height);
    }

    // ─── Elements ────────────────────────────────────────────────────────

    /// Replace the element list from JSON. Returns `false` on malformed
    /// input or duplicate ids, leaving the current list in place.
    pub fn set_elements_json(&mut self, json: &str) -> bool {
        let elements: Vec<Element> = match serde_json::from_str(json) {
            Ok(elements) => elements,
            Err(e) => {
                log::warn!("rejecting element list: {e}");
                return false;
            }
        };
        let ok = self.canvas.set_elements(elements).is_ok();
        self.sync_selection();
        // Same selection, new data: hand it down again.
        self.hand_down_selection();
        ok
    }

    pub fn get_elements_json(&self) -> String {
        to_json(self.canvas.elements())
    }

    /// Elements in paint order with their selection/hover flags, plus the
    /// canvas context and the rubber-band rectangle if one is active.
    pub fn get_render_json(&self) -> String {
        let context = self.canvas.context();
        let items: Vec<serde_json::Value> = self
            .canvas
            .render_items()
            .map(|item| {
                serde_json::json!({
                    "element": item.element,
                    "selected": item.selected,
                    "hovered": item.hovered,
                })
            })
            .collect();
        let area = self.canvas.area_selection_rect().map(|r| {
            serde_json::json!({ "x": r.x, "y": r.y, "width": r.width, "height": r.height })
        });
        serde_json::json!({
            "items": items,
            "context": {
                "gridEnabled": context.grid_enabled,
                "backgroundColor": context.background_color,
                "zoom": context.zoom,
                "pan": context.pan,
            },
            "areaSelection": area,
            "gesture": self.canvas.gesture().name(),
        })
        .to_string()
    }

    // ─── Pointer / keyboard / drop ───────────────────────────────────────

    /// Handle pointer down. `button` is `MouseEvent.button`. Returns `true`
    /// if a re-render is needed.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let changed = self
            .canvas
            .pointer_down(Point::new(x, y), PointerButton::from_dom(button), mods);
        self.sync_selection();
        changed
    }

    pub fn handle_pointer_move(&mut self, x: f32, y: f32) -> bool {
        self.canvas.pointer_move(Point::new(x, y))
    }

    pub fn handle_pointer_up(&mut self, x: f32, y: f32) -> bool {
        let changed = self.canvas.pointer_up(Point::new(x, y));
        self.sync_selection();
        // A finished drag moved the selected element.
        self.hand_down_selection();
        changed
    }

    /// Pointer capture lost or window blurred.
    pub fn handle_pointer_cancel(&mut self) -> bool {
        let changed = self.canvas.cancel_gesture();
        self.sync_selection();
        self.hand_down_selection();
        changed
    }

    /// Handle a keyboard event. Returns JSON:
    /// `{"handled":bool, "action":"<action_name>"}`. The host should
    /// suppress the browser default when `handled` is true.
    pub fn handle_key(&mut self, key: &str, ctrl: bool, shift: bool, alt: bool, meta: bool) -> String {
        let mods = Modifiers {
            shift,
            ctrl,
            alt,
            meta,
        };
        let action = self.canvas.handle_key(key, mods);
        self.sync_selection();
        if action.is_some() {
            self.hand_down_selection();
        }
        match action {
            Some(a) => format!(r#"{{"handled":true,"action":"{}"}}"#, a.name()),
            None => r#"{"handled":false,"action":"none"}"#.to_string(),
        }
    }

    /// Drop a palette item read from the data transfer under
    /// [`palette_mime`]. Returns the new element id, or an empty string if
    /// the payload was rejected.
    pub fn handle_drop(&mut self, payload: &str, x: f32, y: f32) -> String {
        match self.canvas.drop_item(payload, Point::new(x, y)) {
            Ok(id) => id.to_string(),
            Err(e) => {
                log::warn!("drop rejected: {e}");
                String::new()
            }
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn get_selected_ids(&self) -> String {
        to_json(self.canvas.selected_ids())
    }

    /// Select by a JSON array of ids. Unknown ids are skipped.
    pub fn select_ids(&mut self, json: &str) -> bool {
        let ids: Vec<ElementId> = serde_json::from_str(json).unwrap_or_default();
        let any = self.canvas.select(&ids);
        self.sync_selection();
        any
    }

    /// Register `callback(elementJson | null)`, called when the single
    /// selected element changes.
    pub fn set_on_selection_change(&mut self, callback: js_sys::Function) {
        self.on_selection_change = Some(callback);
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    pub fn delete_selected(&mut self) -> bool {
        let changed = self.canvas.delete_selection();
        self.sync_selection();
        changed
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.canvas.undo();
        self.sync_selection();
        self.hand_down_selection();
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.canvas.can_undo()
    }

    /// Copy the selection. Returns how many elements were copied.
    pub fn copy(&mut self) -> u32 {
        self.canvas.copy_selection() as u32
    }

    /// Paste at the viewport center. Returns the new ids as JSON.
    pub fn paste(&mut self) -> String {
        let ids = self.canvas.paste(None);
        self.sync_selection();
        to_json(&ids)
    }

    /// Paste centered on a canvas-space point.
    pub fn paste_at(&mut self, x: f32, y: f32) -> String {
        let ids = self.canvas.paste(Some(Point::new(x, y)));
        self.sync_selection();
        to_json(&ids)
    }

    pub fn get_clipboard_json(&self) -> String {
        to_json(self.canvas.clipboard())
    }

    pub fn set_clipboard_json(&mut self, json: &str) -> bool {
        match serde_json::from_str::<Vec<ClipboardEntry>>(json) {
            Ok(entries) => {
                self.canvas.set_clipboard(entries);
                true
            }
            Err(e) => {
                log::warn!("rejecting clipboard entries: {e}");
                false
            }
        }
    }

    /// Load text read from the system clipboard (e.g. on a `paste` event).
    pub fn load_clipboard_text(&mut self, text: &str) -> bool {
        match self.canvas.load_clipboard_text(text) {
            Ok(_) => true,
            Err(e) => {
                log::debug!("clipboard text ignored: {e}");
                false
            }
        }
    }

    /// Register `writer(text)` used to mirror copies to the system
    /// clipboard, typically `navigator.clipboard.writeText`.
    pub fn set_clipboard_writer(&mut self, writer: js_sys::Function) {
        self.canvas.set_system_clipboard(Box::new(JsClipboard(writer)));
    }

    // ─── Viewport / canvas settings ──────────────────────────────────────

    pub fn set_zoom(&mut self, zoom: f32) {
        self.canvas.set_zoom(zoom);
    }

    pub fn get_zoom(&self) -> f32 {
        self.canvas.zoom()
    }

    pub fn set_pan(&mut self, x: f32, y: f32) {
        self.canvas.set_pan(Point::new(x, y));
    }

    pub fn set_grid_enabled(&mut self, enabled: bool) -> bool {
        self.properties
            .set_grid_enabled(Some(&mut self.canvas), enabled)
            .is_ok()
    }

    pub fn set_background_color(&mut self, hex: &str) -> bool {
        self.properties
            .set_background_color(Some(&mut self.canvas), hex)
            .is_ok()
    }

    // ─── Properties Panel API ────────────────────────────────────────────

    /// Everything the panel needs to draw itself, as JSON.
    pub fn get_properties_json(&self) -> String {
        let p = &self.properties;
        let settings = p.canvas_settings(Some(&self.canvas));
        let mut props = serde_json::Map::new();

        props.insert(
            "mode".into(),
            match p.mode() {
                PanelMode::Canvas => "canvas",
                PanelMode::Element => "element",
            }
            .into(),
        );
        props.insert("tab".into(), tab_to_name(p.tab()).into());
        props.insert(
            "canvas".into(),
            serde_json::json!({
                "backgroundColor": settings.background_color,
                "gridEnabled": settings.grid_enabled,
            }),
        );

        if let Some(info) = p.general_info() {
            props.insert(
                "general".into(),
                serde_json::json!({
                    "id": info.id,
                    "type": info.kind,
                    "name": info.name,
                    "position": info.position,
                    "size": info.size,
                }),
            );
        }
        if let Some(style) = p.style_values() {
            props.insert(
                "style".into(),
                serde_json::json!({
                    "fill": style.style.fill,
                    "stroke": style.style.stroke,
                    "strokeWidth": style.style.stroke_width,
                    "opacity": style.style.opacity,
                    "overridden": style.overridden,
                }),
            );
        }
        let texts: Vec<serde_json::Value> = p
            .text_fields()
            .into_iter()
            .map(|f| serde_json::json!({ "fragment": f.fragment, "id": f.region_id, "text": f.text }))
            .collect();
        props.insert("text".into(), texts.into());
        if let Some(a) = p.arrange_values() {
            props.insert(
                "arrange".into(),
                serde_json::json!({
                    "x": a.x,
                    "y": a.y,
                    "width": a.width,
                    "height": a.height,
                    "rotation": a.rotation,
                }),
            );
        }

        let errors: serde_json::Map<String, serde_json::Value> = p
            .errors()
            .iter()
            .map(|(field, msg)| (field.as_str().to_string(), msg.clone().into()))
            .collect();
        props.insert("errors".into(), errors.into());
        props.insert("pending".into(), p.is_pending().into());

        serde_json::Value::Object(props).to_string()
    }

    /// Edit a property of the selected element. `key` is one of `name`,
    /// `fill`, `stroke`, `strokeWidth`, `opacity`, `x`, `y`, `width`,
    /// `height`, `rotation`. Returns `true` if the edit passed validation
    /// and was scheduled; `false` also when nothing is selected.
    pub fn set_property(&mut self, key: &str, value: &str, now_ms: f64) -> bool {
        let p = &mut self.properties;
        let result = match key {
            "name" => p.set_name(value, now_ms),
            "fill" => p.set_fill(value, now_ms),
            "stroke" => p.set_stroke(value, now_ms),
            _ => {
                let Ok(n) = value.trim().parse::<f32>() else {
                    log::debug!("ignoring non-numeric `{key}` value `{value}`");
                    return false;
                };
                match key {
                    "strokeWidth" => p.set_stroke_width(n, now_ms),
                    "opacity" => p.set_opacity(n, now_ms),
                    "x" => p.set_x(n, now_ms),
                    "y" => p.set_y(n, now_ms),
                    "width" => p.set_width(n, now_ms),
                    "height" => p.set_height(n, now_ms),
                    "rotation" => p.set_rotation(n, now_ms),
                    _ => {
                        log::debug!("unknown property `{key}`");
                        return false;
                    }
                }
            }
        };
        accepted(result)
    }

    pub fn set_region_text(&mut self, region_id: &str, text: &str, now_ms: f64) -> bool {
        accepted(self.properties.set_region_text(region_id, text, now_ms))
    }

    /// Drop the selected element's style override.
    pub fn reset_styles(&mut self, now_ms: f64) -> bool {
        accepted(self.properties.reset_styles(now_ms))
    }

    pub fn set_tab(&mut self, name: &str) -> bool {
        match tab_from_name(name) {
            Some(tab) => {
                self.properties.set_tab(tab);
                true
            }
            None => false,
        }
    }

    /// Commit the pending properties edit once its quiet window has passed.
    /// Returns `true` if the element list changed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.properties.tick(now_ms, Some(&mut self.canvas))
    }

    /// Commit the pending properties edit immediately.
    pub fn flush(&mut self) -> bool {
        self.properties.flush(Some(&mut self.canvas))
    }

    /// When the pending edit will commit, if one is pending.
    pub fn next_commit_ms(&self) -> Option<f64> {
        self.properties.next_commit_ms()
    }

    /// Register `callback(elementJson)`, called after each committed edit.
    pub fn set_on_element_change(&mut self, callback: js_sys::Function) {
        self.properties
            .set_element_change_listener(Box::new(move |element: &Element| {
                call_js(&callback, &to_json(element));
            }));
    }

    /// Register `callback(message)`, called when an edit is rejected or a
    /// commit fails.
    pub fn set_on_validation_error(&mut self, callback: js_sys::Function) {
        self.properties
            .set_error_listener(Box::new(move |message: &str| call_js(&callback, message)));
    }
}

impl RailCanvas {
    fn build(config: EditorConfig, width: f32, height: f32) -> Self {
        console_error_panic_hook_setup();

        let properties = PropertiesEditor::new(&config);
        let mut canvas = CanvasSurface::new(config);
        canvas.set_viewport(width, height);
        #[cfg(target_arch = "wasm32")]
        canvas.set_clock(js_sys::Date::now);

        let selection: SelectionSlot = Rc::default();
        let slot = selection.clone();
        canvas.set_selection_listener(Box::new(move |element: Option<&Element>| {
            *slot.borrow_mut() = Some(element.cloned());
        }));

        Self {
            canvas,
            properties,
            selection,
            on_selection_change: None,
        }
    }

    /// Forward a pending selection notification to the panel and the page.
    fn sync_selection(&mut self) {
        let Some(selected) = self.selection.borrow_mut().take() else {
            return;
        };
        if let Some(callback) = &self.on_selection_change {
            let arg = selected.as_ref().map_or("null".to_string(), |e| to_json(e));
            call_js(callback, &arg);
        }
        self.properties.set_selected(selected, Some(&mut self.canvas));
    }

    /// Re-send the current single selection so the panel sees fresh data.
    fn hand_down_selection(&mut self) {
        let single = match self.canvas.selected_ids() {
            [only] => self.canvas.element(*only).cloned(),
            _ => None,
        };
        self.properties.set_selected(single, Some(&mut self.canvas));
    }
}

/// Clipboard writer backed by a JS function.
struct JsClipboard(js_sys::Function);

impl SystemClipboard for JsClipboard {
    fn write_text(&mut self, text: &str) -> EditorResult<()> {
        self.0
            .call1(&JsValue::NULL, &JsValue::from_str(text))
            .map(|_| ())
            .map_err(|e| EditorError::ClipboardWrite(format!("{e:?}")))
    }
}

fn call_js(callback: &js_sys::Function, arg: &str) {
    if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(arg)) {
        log::warn!("host callback threw: {e:?}");
    }
}

/// `true` only for an edit that validated and was scheduled.
fn accepted(result: Result<bool, ValidationError>) -> bool {
    result.unwrap_or(false)
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| {
        log::error!("serialization failed: {e}");
        "null".to_string()
    })
}

fn tab_to_name(tab: Tab) -> &'static str {
    match tab {
        Tab::General => "general",
        Tab::Style => "style",
        Tab::Text => "text",
        Tab::Arrange => "arrange",
    }
}

fn tab_from_name(name: &str) -> Option<Tab> {
    match name {
        "general" => Some(Tab::General),
        "style" => Some(Tab::Style),
        "text" => Some(Tab::Text),
        "arrange" => Some(Tab::Arrange),
        _ => None,
    }
}

/// Data-transfer key the toolbox writes palette items under.
#[wasm_bindgen]
pub fn palette_mime() -> String {
    PALETTE_MIME.to_string()
}

// ─── Panic hook for WASM debugging ───────────────────────────────────────

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Railway Drawer WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}
