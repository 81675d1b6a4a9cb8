//! Integration tests: undo/redo through the container and the command stack.

use flow_core::{ElementId, FlowConfig, Point, Vec2, parse_graph};
use flow_editor::commands::CommandStack;
use flow_editor::{Engine, FlowContainer, GraphMutation, Modifiers};
use pretty_assertions::assert_eq;

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

fn container() -> FlowContainer {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut c = FlowContainer::new(include_str!("fixtures/approval.json"), FlowConfig::default());
    c.handle_json(r#"{"type":"update","data":{"field":"x","value":0}}"#)
        .unwrap();
    c.handle_json(r#"{"type":"update","data":{"field":"scale","value":1}}"#)
        .unwrap();
    c
}

// ─── Basic undo/redo ────────────────────────────────────────────────────

#[test]
fn undo_restores_previous_state() {
    let mut engine = Engine::new(parse_graph(
        include_str!("fixtures/approval.json"),
        &FlowConfig::default(),
    ));
    let mut stack = CommandStack::new(100);

    stack
        .execute(
            &mut engine,
            GraphMutation::SetField {
                id: id("2"),
                field: "text".into(),
                value: "audit".into(),
            },
            "rename review",
        )
        .unwrap();
    assert_eq!(engine.graph().get(id("2")).unwrap().attribute.text, "audit");

    assert_eq!(stack.undo(&mut engine).as_deref(), Some("rename review"));
    assert_eq!(engine.graph().get(id("2")).unwrap().attribute.text, "review");

    assert_eq!(stack.redo(&mut engine).as_deref(), Some("rename review"));
    assert_eq!(engine.graph().get(id("2")).unwrap().attribute.text, "audit");
}

// ─── Drag batching ──────────────────────────────────────────────────────

#[test]
fn whole_drag_is_one_undo_step() {
    let mut c = container();
    let start = Point::new(220.0, 200.0);
    let before = c.graph().elements.clone();

    c.pointer_down(start);
    for step in 1..=5 {
        c.pointer_move(start + Vec2::new(step as f64 * 10.0, 0.0));
    }
    c.pointer_up(start + Vec2::new(50.0, 0.0));
    assert_eq!(
        c.graph().get(id("2")).unwrap().position(),
        Point::new(270.0, 200.0)
    );

    c.key("z", Modifiers::ctrl());
    assert_eq!(c.graph().elements, before);
    assert!(!c.can_undo());

    c.key("Z", Modifiers { ctrl: true, shift: true, ..Modifiers::NONE });
    assert_eq!(
        c.graph().get(id("2")).unwrap().position(),
        Point::new(270.0, 200.0)
    );
}

#[test]
fn undo_keeps_viewport() {
    let mut c = container();
    c.handle_json(r#"[{"type":"update","data":{"id":3,"field":"text","value":"ok?"}}]"#)
        .unwrap();
    c.pointer_down(Point::new(700.0, 380.0));
    c.pointer_move(Point::new(650.0, 380.0));
    c.pointer_up(Point::new(650.0, 380.0));
    assert_eq!(c.graph().x, -50.0);

    c.undo();
    assert_eq!(c.graph().get(id("3")).unwrap().attribute.text, "approved?");
    assert_eq!(c.graph().x, -50.0);
}

#[test]
fn undo_delete_restores_connectors_and_prunes_selection() {
    let mut c = container();
    c.click(Point::new(220.0, 200.0), Modifiers::NONE);
    c.key("Delete", Modifiers::NONE);
    assert!(!c.graph().contains(id("2")));
    assert!(!c.graph().contains(id("c1")));

    c.undo();
    assert!(c.graph().contains(id("2")));
    assert!(c.graph().contains(id("c1")));
    assert!(c.graph().contains(id("c2")));

    c.redo();
    assert!(!c.graph().contains(id("2")));
    assert!(c.selection().is_empty());
}

#[test]
fn undo_is_ignored_mid_gesture() {
    let mut c = container();
    c.handle_json(r#"[{"type":"update","data":{"id":3,"field":"text","value":"ok?"}}]"#)
        .unwrap();
    c.pointer_down(Point::new(220.0, 200.0));
    c.pointer_move(Point::new(230.0, 200.0));
    c.undo();
    assert_eq!(c.graph().get(id("3")).unwrap().attribute.text, "ok?");
    c.pointer_up(Point::new(230.0, 200.0));
}

#[test]
fn lost_pointer_up_does_not_wedge_history() {
    let mut c = container();
    let review = Point::new(220.0, 200.0);

    // The release of this drag happens outside the canvas and never arrives.
    c.pointer_down(review);
    c.pointer_move(review + Vec2::new(10.0, 0.0));

    let moved = review + Vec2::new(10.0, 0.0);
    c.pointer_down(moved);
    c.pointer_move(moved + Vec2::new(10.0, 0.0));
    c.pointer_up(moved + Vec2::new(10.0, 0.0));
    assert_eq!(
        c.graph().get(id("2")).unwrap().position(),
        Point::new(240.0, 200.0)
    );

    // Each drag is its own step.
    c.undo();
    assert_eq!(
        c.graph().get(id("2")).unwrap().position(),
        Point::new(230.0, 200.0)
    );
    c.undo();
    assert_eq!(c.graph().get(id("2")).unwrap().position(), review);
    assert!(!c.can_undo());

    c.handle_json(r#"[{"type":"update","data":{"id":2,"field":"text","value":"audit"}}]"#)
        .unwrap();
    assert!(c.can_undo());
}

#[test]
fn read_only_toggle_closes_an_open_drag() {
    let mut c = container();
    let review = Point::new(220.0, 200.0);
    c.pointer_down(review);
    c.pointer_move(review + Vec2::new(10.0, 0.0));
    c.set_read_only(true);
    assert!(c.gestures().is_idle());
    assert!(!c.graph().get(id("2")).unwrap().flags.dragging);

    c.set_read_only(false);
    assert!(c.can_undo());
    c.undo();
    assert_eq!(c.graph().get(id("2")).unwrap().position(), review);
}
