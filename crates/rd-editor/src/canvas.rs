//! The canvas surface: element list, selection, gestures, clipboard and
//! undo history.
//!
//! `CanvasSurface` owns the element list, which is the single source of
//! truth. Collaborators (the properties editor, host toolbars) talk to it
//! through the [`CanvasApi`] contract; the browser feeds it pointer,
//! keyboard and drop events.
//!
//! Canvas-level settings (grid, background) are never written into element
//! data. Renderers read them from the [`CanvasContext`] handed out next to
//! each element by [`CanvasSurface::render_items`].

use crate::clipboard::{
    ClipboardEntry, ClipboardEnvelope, Clock, SystemClipboard, clipboard_bounds, system_time_ms,
};
use crate::config::EditorConfig;
use crate::error::{EditorError, EditorResult};
use crate::gesture::{DragOrigin, DragState, Gesture};
use crate::hit::{hit_test, hit_test_rect};
use crate::history::History;
use crate::input::{InputEvent, Modifiers, PointerButton};
use crate::palette::PaletteItem;
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use rd_core::{Bounds, Color, Element, ElementId, Point, Size};
use std::collections::HashSet;

/// Called with the selected element when exactly one is selected, `None`
/// otherwise.
pub type SelectionListener = Box<dyn FnMut(Option<&Element>)>;

/// Read-only canvas state that renderers need alongside element data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasContext {
    pub grid_enabled: bool,
    pub background_color: Color,
    pub zoom: f32,
    pub pan: Point,
}

/// One element as the host should draw it.
#[derive(Debug, Clone, Copy)]
pub struct RenderItem<'a> {
    pub element: &'a Element,
    pub selected: bool,
    pub hovered: bool,
    pub context: CanvasContext,
}

/// Operations the canvas offers to collaborators. Every setter is
/// synchronous and visible to the next read.
pub trait CanvasApi {
    /// Current ordered snapshot of all elements.
    fn element_list(&self) -> Vec<Element>;
    /// Replace the whole list at once.
    fn replace_element_list(&mut self, elements: Vec<Element>) -> EditorResult<()>;
    fn grid_enabled(&self) -> bool;
    fn set_grid_enabled(&mut self, enabled: bool);
    fn background_color(&self) -> Color;
    fn set_background_color(&mut self, color: Color);
    /// The most recently selected element, if it is still selected.
    fn selected_element(&self) -> Option<Element>;
    fn copy_selection(&mut self) -> usize;
    fn paste(&mut self, at: Option<Point>) -> Vec<ElementId>;
    fn clipboard(&self) -> Vec<ClipboardEntry>;
    fn set_clipboard(&mut self, entries: Vec<ClipboardEntry>);
}

pub struct CanvasSurface {
    config: EditorConfig,
    elements: Vec<Element>,
    /// Selected ids in the order they were selected.
    selection: Vec<ElementId>,
    last_selected: Option<ElementId>,
    hovered: Option<ElementId>,
    gesture: Gesture,
    history: History,
    clipboard: Vec<ClipboardEntry>,
    system_clipboard: Option<Box<dyn SystemClipboard>>,
    clock: Clock,
    grid_enabled: bool,
    background: Color,
    zoom: f32,
    pan: Point,
    /// Visible area in screen units, once the host has reported it.
    viewport: Option<Size>,
    on_selection_change: Option<SelectionListener>,
}

impl Default for CanvasSurface {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl CanvasSurface {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            history: History::new(config.history_limit),
            grid_enabled: config.grid_enabled,
            background: config.default_background,
            config,
            elements: Vec::new(),
            selection: Vec::new(),
            last_selected: None,
            hovered: None,
            gesture: Gesture::Idle,
            clipboard: Vec::new(),
            system_clipboard: None,
            clock: system_time_ms,
            zoom: 1.0,
            pan: Point::ZERO,
            viewport: None,
            on_selection_change: None,
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn set_selection_listener(&mut self, listener: SelectionListener) {
        self.on_selection_change = Some(listener);
    }

    pub fn set_system_clipboard(&mut self, clipboard: Box<dyn SystemClipboard>) {
        self.system_clipboard = Some(clipboard);
    }

    pub fn set_clock(&mut self, clock: Clock) {
        self.clock = clock;
    }

    // ─── Elements ────────────────────────────────────────────────────────

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    /// Replace the element list. Rejects lists with duplicate ids without
    /// touching current state. Selection and hover are pruned to ids that
    /// still exist.
    pub fn set_elements(&mut self, elements: Vec<Element>) -> EditorResult<()> {
        let mut seen = HashSet::with_capacity(elements.len());
        if let Some(dup) = elements.iter().find(|e| !seen.insert(e.id)) {
            log::warn!("rejecting element list: duplicate id {}", dup.id);
            return Err(EditorError::DuplicateId(dup.id));
        }
        self.elements = elements;
        self.prune_to_existing();
        Ok(())
    }

    fn prune_to_existing(&mut self) {
        let before = self.selection.len();
        let elements = &self.elements;
        self.selection.retain(|id| elements.iter().any(|e| e.id == *id));
        if self.last_selected.is_some_and(|id| !self.selection.contains(&id)) {
            self.last_selected = self.selection.last().copied();
        }
        if self.hovered.is_some_and(|id| !self.contains(id)) {
            self.hovered = None;
        }
        if self.selection.len() != before {
            self.notify_selection();
        }
    }

    // ─── Selection ───────────────────────────────────────────────────────

    pub fn selected_ids(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    pub fn selected_element(&self) -> Option<&Element> {
        self.last_selected.and_then(|id| self.element(id))
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    /// Replace the selection with the ids that exist. Returns whether
    /// anything was selected.
    pub fn select(&mut self, ids: &[ElementId]) -> bool {
        self.selection = ids.iter().copied().filter(|id| self.contains(*id)).collect();
        self.last_selected = self.selection.last().copied();
        self.notify_selection();
        !self.selection.is_empty()
    }

    pub fn clear_selection(&mut self) -> bool {
        let had = !self.selection.is_empty();
        self.selection.clear();
        self.last_selected = None;
        self.notify_selection();
        had
    }

    fn notify_selection(&mut self) {
        if let Some(listener) = self.on_selection_change.as_mut() {
            let single = match self.selection.as_slice() {
                [only] => self.elements.iter().find(|e| e.id == *only),
                _ => None,
            };
            listener(single);
        }
    }

    // ─── Canvas settings / viewport ──────────────────────────────────────

    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn set_grid_enabled(&mut self, enabled: bool) {
        self.grid_enabled = enabled;
    }

    pub fn background_color(&self) -> Color {
        self.background
    }

    pub fn set_background_color(&mut self, color: Color) {
        self.background = color;
    }

    pub fn context(&self) -> CanvasContext {
        CanvasContext {
            grid_enabled: self.grid_enabled,
            background_color: self.background,
            zoom: self.zoom,
            pan: self.pan,
        }
    }

    pub fn render_items(&self) -> impl Iterator<Item = RenderItem<'_>> {
        let context = self.context();
        self.elements.iter().map(move |element| RenderItem {
            element,
            selected: self.selection.contains(&element.id),
            hovered: self.hovered == Some(element.id),
            context,
        })
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(self.config.min_zoom, self.config.max_zoom);
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn set_pan(&mut self, pan: Point) {
        self.pan = pan;
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Some(Size::new(width, height));
    }

    /// Screen (container) coordinates → canvas coordinates.
    pub fn screen_to_canvas(&self, p: Point) -> Point {
        let local = p - self.pan;
        Point::new(local.x / self.zoom, local.y / self.zoom)
    }

    // ─── Gestures ────────────────────────────────────────────────────────

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Rubber-band overlay rectangle in canvas coordinates.
    pub fn area_selection_rect(&self) -> Option<Bounds> {
        self.gesture.selection_rect()
    }

    /// Route an input event. Returns `true` if anything visible changed.
    pub fn handle_event(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                button,
                modifiers,
            } => self.pointer_down(Point::new(*x, *y), *button, *modifiers),
            InputEvent::PointerMove { x, y, .. } => self.pointer_move(Point::new(*x, *y)),
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(*x, *y)),
            InputEvent::PointerCancel => self.cancel_gesture(),
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers).is_some(),
        }
    }

    pub fn pointer_down(&mut self, screen: Point, button: PointerButton, modifiers: Modifiers) -> bool {
        if !self.gesture.is_idle() {
            // A second button while a gesture is running.
            return false;
        }
        if button == PointerButton::Secondary {
            return false;
        }
        if button == PointerButton::Middle {
            self.gesture = Gesture::Panning { last: screen };
            log::trace!("gesture: panning");
            return true;
        }

        let p = self.screen_to_canvas(screen);
        match hit_test(&self.elements, p) {
            Some(id) => self.begin_drag(id, p, modifiers),
            None if modifiers.pans() => {
                self.gesture = Gesture::Panning { last: screen };
                log::trace!("gesture: panning");
                true
            }
            None => {
                self.gesture = Gesture::AreaSelecting {
                    start: p,
                    end: p,
                    extend: modifiers.extends_selection(),
                };
                log::trace!("gesture: area-selecting from ({}, {})", p.x, p.y);
                true
            }
        }
    }

    fn begin_drag(&mut self, id: ElementId, p: Point, modifiers: Modifiers) -> bool {
        if modifiers.extends_selection() {
            if let Some(pos) = self.selection.iter().position(|s| *s == id) {
                // Toggled out: nothing left under the pointer to drag.
                self.selection.remove(pos);
                if self.last_selected == Some(id) {
                    self.last_selected = self.selection.last().copied();
                }
                self.notify_selection();
                return true;
            }
            self.selection.push(id);
        } else if !self.selection.contains(&id) {
            self.selection = vec![id];
        }
        self.last_selected = Some(id);
        self.notify_selection();

        let Some(grabbed_start) = self.element(id).map(Element::start) else {
            return true;
        };
        let origins = self
            .elements
            .iter()
            .filter(|e| self.selection.contains(&e.id))
            .map(|e| DragOrigin {
                id: e.id,
                start: e.start(),
                end: e.end(),
            })
            .collect();

        self.history.begin_gesture();
        self.gesture = Gesture::Dragging(DragState {
            grabbed: id,
            offset: p - grabbed_start,
            grabbed_start,
            origins,
        });
        log::trace!("gesture: dragging {id}");
        true
    }

    pub fn pointer_move(&mut self, screen: Point) -> bool {
        let p = self.screen_to_canvas(screen);
        match &mut self.gesture {
            Gesture::Idle => {
                let hovered = hit_test(&self.elements, p);
                let changed = hovered != self.hovered;
                self.hovered = hovered;
                changed
            }
            Gesture::Dragging(state) => {
                // First move of the gesture snapshots; later moves are no-ops here.
                self.history.record(&self.elements, "move");
                let delta = state.delta(p);
                for origin in &state.origins {
                    if let Some(element) = self.elements.iter_mut().find(|e| e.id == origin.id) {
                        element.set_geometry(
                            origin.start.offset(delta.x, delta.y),
                            origin.end.offset(delta.x, delta.y),
                        );
                    }
                }
                true
            }
            Gesture::AreaSelecting { end, .. } => {
                *end = p;
                true
            }
            Gesture::Panning { last } => {
                let delta = screen - *last;
                *last = screen;
                self.pan = self.pan + delta;
                true
            }
        }
    }

    pub fn pointer_up(&mut self, screen: Point) -> bool {
        let p = self.screen_to_canvas(screen);
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Dragging(state) => {
                let moved = self.history.end_gesture();
                log::debug!("drag of {} finished (moved: {moved})", state.grabbed);
                true
            }
            Gesture::AreaSelecting { start, extend, .. } => {
                self.finish_area_selection(start, p, extend);
                true
            }
            Gesture::Panning { .. } => true,
        }
    }

    fn finish_area_selection(&mut self, start: Point, end: Point, extend: bool) {
        let rect = Bounds::from_corners(start, end);
        let threshold = self.config.area_select_threshold;
        if rect.width < threshold && rect.height < threshold {
            // A click on the background.
            if !extend {
                self.clear_selection();
            }
            return;
        }

        let hits = hit_test_rect(&self.elements, &rect);
        if extend {
            for id in hits {
                if !self.selection.contains(&id) {
                    self.selection.push(id);
                }
            }
        } else {
            self.selection = hits;
        }
        self.last_selected = self.selection.last().copied();
        log::debug!("area selection picked {} element(s)", self.selection.len());
        self.notify_selection();
    }

    /// Abort the gesture in progress. A drag is rolled back to its starting
    /// geometry and leaves no history behind; an area selection leaves the
    /// selection as it was; a pan keeps the offset reached so far.
    pub fn cancel_gesture(&mut self) -> bool {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => false,
            Gesture::Dragging(state) => {
                for origin in &state.origins {
                    if let Some(element) = self.elements.iter_mut().find(|e| e.id == origin.id) {
                        element.set_geometry(origin.start, origin.end);
                    }
                }
                let withdrawn = self.history.abort_gesture();
                log::debug!("drag of {} cancelled (history withdrawn: {withdrawn})", state.grabbed);
                true
            }
            Gesture::AreaSelecting { .. } | Gesture::Panning { .. } => true,
        }
    }

    // ─── Keyboard ────────────────────────────────────────────────────────

    /// Resolve and run a shortcut. Returns the action if one was bound and
    /// run, so the host can suppress the browser default.
    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let action = ShortcutMap::resolve(key, modifiers)?;
        if !self.gesture.is_idle() && action != ShortcutAction::Escape {
            return None;
        }
        match action {
            ShortcutAction::Delete => {
                self.delete_selection();
            }
            ShortcutAction::Copy => {
                self.copy_selection();
            }
            ShortcutAction::Paste => {
                self.paste(None);
            }
            ShortcutAction::Undo => {
                self.undo();
            }
            ShortcutAction::Escape => {
                if !self.cancel_gesture() {
                    self.clear_selection();
                }
            }
        }
        Some(action)
    }

    // ─── Editing operations ──────────────────────────────────────────────

    /// Create an element from a serialized palette item dropped at `screen`.
    pub fn drop_item(&mut self, payload: &str, screen: Point) -> EditorResult<ElementId> {
        let item = PaletteItem::from_json(payload)?;
        let at = self.screen_to_canvas(screen);
        let element = item.to_element(at, |id| self.contains(id));
        let id = element.id;
        self.history.record(&self.elements, "create");
        self.elements.push(element);
        log::debug!("created {id} at ({}, {})", at.x, at.y);
        Ok(id)
    }

    pub fn delete_selection(&mut self) -> bool {
        if self.selection.is_empty() {
            return false;
        }
        self.history.record(&self.elements, "delete");
        let selection = std::mem::take(&mut self.selection);
        self.elements.retain(|e| !selection.contains(&e.id));
        self.last_selected = None;
        self.hovered = None;
        log::debug!("deleted {} element(s)", selection.len());
        self.notify_selection();
        true
    }

    /// Restore the newest history snapshot. No-op with empty history or
    /// while a gesture is running.
    pub fn undo(&mut self) -> bool {
        if !self.gesture.is_idle() {
            return false;
        }
        let Some(snapshot) = self.history.undo() else {
            return false;
        };
        log::debug!("undo `{}`", snapshot.label);
        self.elements = snapshot.elements;
        self.prune_to_existing();
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Copy the selection (in list order). Returns the number copied; an
    /// empty selection leaves the clipboard untouched.
    pub fn copy_selection(&mut self) -> usize {
        let entries: Vec<ClipboardEntry> = self
            .elements
            .iter()
            .filter(|e| self.selection.contains(&e.id))
            .cloned()
            .map(ClipboardEntry::new)
            .collect();
        if entries.is_empty() {
            return 0;
        }
        self.clipboard = entries;
        self.mirror_to_system_clipboard();
        self.clipboard.len()
    }

    fn mirror_to_system_clipboard(&mut self) {
        let Some(system) = self.system_clipboard.as_mut() else {
            return;
        };
        let envelope = ClipboardEnvelope::new(self.clipboard.clone(), (self.clock)());
        let result = envelope.to_json().and_then(|json| system.write_text(&json));
        if let Err(e) = result {
            log::warn!("system clipboard mirror failed: {e}");
        }
    }

    /// Paste the clipboard centered on `at` (canvas coordinates), else on
    /// the visible viewport center, else on the canvas midpoint. Returns the
    /// new ids, which become the selection.
    pub fn paste(&mut self, at: Option<Point>) -> Vec<ElementId> {
        let Some(bounds) = clipboard_bounds(&self.clipboard) else {
            return Vec::new();
        };
        let target = at.unwrap_or_else(|| self.default_paste_target());
        let delta = target - bounds.center();

        self.history.record(&self.elements, "paste");
        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for entry in &self.clipboard {
            let mut element = entry.element.clone();
            element.id = ElementId::fresh(&element.kind, |id| {
                pasted.contains(&id) || self.elements.iter().any(|e| e.id == id)
            });
            element.translate(delta.x, delta.y);
            pasted.push(element.id);
            self.elements.push(element);
        }

        self.selection = pasted.clone();
        self.last_selected = pasted.last().copied();
        log::debug!("pasted {} element(s)", pasted.len());
        self.notify_selection();
        pasted
    }

    fn default_paste_target(&self) -> Point {
        match self.viewport {
            Some(v) => self.screen_to_canvas(Point::new(v.width / 2.0, v.height / 2.0)),
            None => Point::new(self.config.canvas_width / 2.0, self.config.canvas_height / 2.0),
        }
    }

    pub fn clipboard(&self) -> &[ClipboardEntry] {
        &self.clipboard
    }

    pub fn set_clipboard(&mut self, entries: Vec<ClipboardEntry>) {
        self.clipboard = entries;
    }

    /// Load clipboard contents from text read off the system clipboard.
    pub fn load_clipboard_text(&mut self, text: &str) -> EditorResult<usize> {
        let envelope = ClipboardEnvelope::parse(text)?;
        self.clipboard = envelope.elements;
        Ok(self.clipboard.len())
    }
}

impl CanvasApi for CanvasSurface {
    fn element_list(&self) -> Vec<Element> {
        self.elements.clone()
    }

    fn replace_element_list(&mut self, elements: Vec<Element>) -> EditorResult<()> {
        CanvasSurface::set_elements(self, elements)
    }

    fn grid_enabled(&self) -> bool {
        CanvasSurface::grid_enabled(self)
    }

    fn set_grid_enabled(&mut self, enabled: bool) {
        CanvasSurface::set_grid_enabled(self, enabled);
    }

    fn background_color(&self) -> Color {
        CanvasSurface::background_color(self)
    }

    fn set_background_color(&mut self, color: Color) {
        CanvasSurface::set_background_color(self, color);
    }

    fn selected_element(&self) -> Option<Element> {
        CanvasSurface::selected_element(self).cloned()
    }

    fn copy_selection(&mut self) -> usize {
        CanvasSurface::copy_selection(self)
    }

    fn paste(&mut self, at: Option<Point>) -> Vec<ElementId> {
        CanvasSurface::paste(self, at)
    }

    fn clipboard(&self) -> Vec<ClipboardEntry> {
        CanvasSurface::clipboard(self).to_vec()
    }

    fn set_clipboard(&mut self, entries: Vec<ClipboardEntry>) {
        CanvasSurface::set_clipboard(self, entries);
    }
}
