//! Integration tests: undo history across canvas operations.
//!
//! Every mutating operation snapshots the list first; undo must put back
//! exactly that list, element order included.

use pretty_assertions::assert_eq;
use rd_core::{Element, ElementId, Point};
use rd_editor::canvas::CanvasSurface;
use rd_editor::config::EditorConfig;
use rd_editor::input::{Modifiers, PointerButton};
use rd_editor::shortcuts::ShortcutAction;

fn fixture() -> Vec<Element> {
    serde_json::from_str(include_str!("fixtures/junction.json")).unwrap()
}

fn canvas() -> CanvasSurface {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut canvas = CanvasSurface::default();
    canvas.set_elements(fixture()).unwrap();
    canvas
}

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

const CTRL: Modifiers = Modifiers {
    ctrl: true,
    ..Modifiers::NONE
};

#[test]
fn undo_with_empty_history_is_a_no_op() {
    let mut canvas = canvas();
    assert!(!canvas.undo());
    assert_eq!(canvas.handle_key("z", CTRL), Some(ShortcutAction::Undo));
    assert_eq!(canvas.elements(), fixture().as_slice());
}

#[test]
fn undo_delete_restores_order() {
    let mut canvas = canvas();
    canvas.select(&[id("platform_1")]);
    canvas.handle_key("Backspace", Modifiers::NONE);
    assert_eq!(canvas.elements().len(), 2);
    assert!(canvas.selected_ids().is_empty());

    assert!(canvas.undo());
    let ids: Vec<_> = canvas.elements().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![id("track_main"), id("platform_1"), id("signal_7")]);
    assert!(!canvas.can_undo());
}

#[test]
fn undo_drag_puts_element_back() {
    let mut canvas = canvas();
    // Press inside the signal (380,150)-(400,190).
    canvas.pointer_down(Point::new(390.0, 160.0), PointerButton::Primary, Modifiers::NONE);
    canvas.pointer_move(Point::new(300.0, 100.0));
    canvas.pointer_move(Point::new(290.0, 90.0));
    canvas.pointer_up(Point::new(290.0, 90.0));
    let moved = canvas.element(id("signal_7")).unwrap().start();
    assert_eq!(moved, Point::new(280.0, 80.0));

    canvas.undo();
    assert_eq!(canvas.elements(), fixture().as_slice());
}

#[test]
fn undo_paste_and_drop_remove_new_elements() {
    let mut canvas = canvas();
    canvas.select(&[id("signal_7")]);
    canvas.copy_selection();
    let pasted = canvas.paste(Some(Point::new(50.0, 50.0)));
    let created = canvas
        .drop_item(
            r#"{"type":"buffer","name":"Buffer stop","width":20,"height":20}"#,
            Point::new(600.0, 600.0),
        )
        .unwrap();
    assert_eq!(canvas.elements().len(), 5);
    assert_eq!(canvas.history_len(), 2);

    canvas.undo();
    assert!(!canvas.contains(created));
    assert!(canvas.contains(pasted[0]));

    canvas.undo();
    assert!(!canvas.contains(pasted[0]));
    // The pasted copy was selected; undo drops it from the selection.
    assert!(canvas.selected_ids().is_empty());
    assert_eq!(canvas.elements(), fixture().as_slice());
}

#[test]
fn drop_places_item_at_pointer_without_selecting() {
    let mut canvas = canvas();
    canvas.select(&[id("track_main")]);
    let created = canvas
        .drop_item(r#"{"type":"track","draw":{"type":"line"}}"#, Point::new(100.0, 500.0))
        .unwrap();
    let track = canvas.element(created).unwrap();
    assert_eq!(track.start(), Point::new(50.0, 500.0));
    assert_eq!(track.end(), Point::new(150.0, 500.0));
    assert_eq!(canvas.selected_ids(), &[id("track_main")]);

    assert!(canvas.drop_item("not json", Point::ZERO).is_err());
    assert_eq!(canvas.history_len(), 1);
}

#[test]
fn history_keeps_only_the_newest_entries() {
    let config = EditorConfig {
        history_limit: Some(2),
        ..EditorConfig::default()
    };
    let mut canvas = CanvasSurface::new(config);
    canvas.set_elements(fixture()).unwrap();

    for name in ["track_main", "platform_1", "signal_7"] {
        canvas.select(&[id(name)]);
        canvas.delete_selection();
    }
    assert_eq!(canvas.history_len(), 2);
    assert!(canvas.undo());
    assert!(canvas.undo());
    assert!(!canvas.undo());
    // The oldest snapshot (all three) was trimmed.
    let ids: Vec<_> = canvas.elements().iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![id("platform_1"), id("signal_7")]);
}
