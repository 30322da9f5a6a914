//! Integration tests: undo/redo through the editor (flow-editor).
//!
//! Exercises the History + Editor interaction across commands and
//! gestures, verifying that undo and redo are exact inverses.

use flow_core::model::*;
use flow_core::{EditorConfig, NodeId};
use flow_editor::{Alignment, Editor, InputEvent, Modifiers, PointerEvent};
use pretty_assertions::assert_eq;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn sample_editor() -> Editor {
    let mut editor = Editor::default();
    editor.load_sample();
    editor
}

fn drag(editor: &mut Editor, from: (f64, f64), to: (f64, f64)) {
    editor.handle(&InputEvent::PointerDown(PointerEvent::primary(from.0, from.1)));
    editor.handle(&InputEvent::PointerMove(PointerEvent::primary(to.0, to.1)));
    editor.handle(&InputEvent::PointerUp(PointerEvent::primary(to.0, to.1)));
}

// ─── Inverse law ─────────────────────────────────────────────────────────

#[test]
fn undo_then_redo_restores_each_state() {
    let mut editor = sample_editor();
    let mut states = vec![editor.document().clone()];

    editor.select_nodes(vec![NodeId::intern("n1"), NodeId::intern("n2")]);
    editor.align(Alignment::Left);
    states.push(editor.document().clone());

    editor.add_node(NodeType::Diamond);
    states.push(editor.document().clone());

    // Drag n4 (900,120 180x80) by (40, 30).
    drag(&mut editor, (990.0, 160.0), (1030.0, 190.0));
    states.push(editor.document().clone());

    editor.select_nodes(vec![NodeId::intern("n3")]);
    editor.delete_selection();
    states.push(editor.document().clone());

    for expected in states.iter().rev().skip(1) {
        assert!(editor.undo().is_some());
        assert_eq!(editor.document(), expected);
    }
    assert!(!editor.can_undo());

    for expected in states.iter().skip(1) {
        assert!(editor.redo().is_some());
        assert_eq!(editor.document(), expected);
    }
    assert!(!editor.can_redo());
}

#[test]
fn new_edit_clears_redo() {
    let mut editor = sample_editor();
    editor.add_node(NodeType::Oval);
    editor.undo();
    assert!(editor.can_redo());
    editor.add_node(NodeType::Rectangle);
    assert!(!editor.can_redo());
}

#[test]
fn history_is_capped_at_fifty() {
    let mut editor = Editor::default();
    for _ in 0..60 {
        editor.add_node(NodeType::Rectangle);
    }
    assert_eq!(editor.history().undo_len(), 50);
    let mut undone = 0;
    while editor.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 50);
    assert_eq!(editor.document().nodes.len(), 10);
}

#[test]
fn redo_into_full_undo_stack_respects_cap() {
    let config = EditorConfig {
        history_limit: 3,
        ..EditorConfig::default()
    };
    let mut editor = Editor::new(config);
    for _ in 0..3 {
        editor.add_node(NodeType::Rectangle);
    }
    editor.undo();
    editor.redo();
    assert_eq!(editor.history().undo_len(), 3);
}

#[test]
fn shortcuts_drive_undo_and_redo() {
    let mut editor = sample_editor();
    editor.select_nodes(vec![NodeId::intern("n2")]);
    editor.handle(&InputEvent::key("Delete", Modifiers::NONE));
    assert_eq!(editor.document().nodes.len(), 3);

    editor.handle(&InputEvent::key("z", Modifiers::CTRL));
    assert_eq!(editor.document().nodes.len(), 4);

    let redo = Modifiers {
        ctrl: true,
        shift: true,
        ..Modifiers::NONE
    };
    editor.handle(&InputEvent::key("Z", redo));
    assert_eq!(editor.document().nodes.len(), 3);
}

#[test]
fn undo_drops_selection_of_removed_items() {
    let mut editor = sample_editor();
    let id = editor.add_node(NodeType::Rectangle);
    assert_eq!(editor.selection(), &Selection::Nodes(vec![id]));
    editor.undo();
    assert!(editor.selection().is_empty());
}

#[test]
fn undo_during_gesture_cancels_it_first() {
    let mut editor = sample_editor();
    editor.add_node(NodeType::Rectangle);
    let before = editor.document().clone();
    editor.handle(&InputEvent::PointerDown(PointerEvent::primary(170.0, 160.0)));
    editor.handle(&InputEvent::PointerMove(PointerEvent::primary(250.0, 260.0)));
    assert!(!editor.gesture().is_idle());

    assert_eq!(editor.undo().as_deref(), Some("Add node"));
    assert!(editor.gesture().is_idle());
    editor.redo();
    assert_eq!(editor.document(), &before);
}
