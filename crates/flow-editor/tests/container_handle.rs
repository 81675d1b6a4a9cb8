//! Integration tests: the host option API (`FlowContainer::handle`).

use flow_core::{
    ElementId, ElementKind, ElementStatus, FlowConfig, FlowError, GraphStatus, Point,
    ValidationIssue,
};
use flow_editor::{FlowContainer, HandleOutput, Modifiers};
use pretty_assertions::assert_eq;
use serde_json::json;

fn container() -> FlowContainer {
    let _ = env_logger::builder().is_test(true).try_init();
    FlowContainer::new(include_str!("fixtures/approval.json"), FlowConfig::default())
}

fn id(s: &str) -> ElementId {
    ElementId::intern(s)
}

#[test]
fn minimal_document_loads_as_is() {
    let c = FlowContainer::new(
        r#"{"elements":[{"id":1,"type":"start"},{"id":2,"type":"end"}],"height":"400"}"#,
        FlowConfig::default(),
    );
    let g = c.graph();
    assert_eq!(g.elements.len(), 2);
    assert_eq!((g.x, g.y, g.scale, g.height), (0.0, 0.0, 1.0, 400.0));
    assert_eq!(g.status, GraphStatus::Edit);
}

#[test]
fn malformed_document_yields_blank_flow() {
    let c = FlowContainer::new("{not json", FlowConfig::default());
    let kinds: Vec<_> = c.graph().elements.iter().map(|e| e.kind.clone()).collect();
    assert_eq!(kinds, vec![ElementKind::Start, ElementKind::End]);
    assert_eq!(c.graph().elements[0].attribute.text, "start");
    assert_eq!(c.graph().elements[1].attribute.text, "over");
}

#[test]
fn update_by_id() {
    let mut c = container();
    c.handle_json(r#"[{"type":"update","data":{"id":2,"field":"status","value":"success"}}]"#)
        .unwrap();
    assert_eq!(c.graph().get(id("2")).unwrap().status, ElementStatus::Success);
}

#[test]
fn update_without_id_applies_to_selection() {
    let mut c = container();
    // Fixture viewport: x = 10, scale = 1.5.
    let review = c.graph().to_screen(Point::new(220.0, 200.0));
    let decide = c.graph().to_screen(Point::new(400.0, 200.0));
    c.click(review, Modifiers::NONE);
    c.click(decide, Modifiers::shift());

    c.handle_json(r#"[{"type":"update","data":{"field":"text","value":"checked"}}]"#)
        .unwrap();
    assert_eq!(c.graph().get(id("2")).unwrap().attribute.text, "checked");
    assert_eq!(c.graph().get(id("3")).unwrap().attribute.text, "checked");
    assert_eq!(c.graph().get(id("1")).unwrap().attribute.text, "submit");
}

#[test]
fn create_and_delete_in_one_step() {
    let mut c = container();
    let out = c
        .handle_json(
            r#"[
                {"type":"create","data":{"value":{"type":"task","attribute":{"x":220,"y":330,"text":"archive"}}}},
                {"type":"delete","data":{"id":"c4"}}
            ]"#,
        )
        .unwrap();
    let HandleOutput::Elements { created, deleted } = out else {
        panic!("expected element output");
    };
    assert_eq!(created.len(), 1);
    assert!(created[0].as_str().starts_with("task_"));
    assert_eq!(deleted.iter().map(|e| e.id).collect::<Vec<_>>(), vec![id("c4")]);

    let task = c.graph().get(created[0]).unwrap();
    assert_eq!(task.attribute.text, "archive");

    // One undo step reverts both.
    c.undo();
    assert!(c.graph().get(created[0]).is_none());
    assert!(c.graph().contains(id("c4")));
}

#[test]
fn failing_option_rolls_back_the_whole_list() {
    let mut c = container();
    let before = c.graph().clone();
    let err = c
        .handle_json(
            r#"[
                {"type":"update","data":{"id":2,"field":"text","value":"changed"}},
                {"type":"delete","data":{"id":1}}
            ]"#,
        )
        .unwrap_err();
    assert!(matches!(err, FlowError::ProtectedEvent(_)));
    assert_eq!(c.graph(), &before);
    assert!(!c.can_undo());
}

#[test]
fn created_connectors_follow_the_policy() {
    let mut c = container();
    let err = c
        .handle_json(
            r#"[{"type":"create","data":{"value":{"type":"connector","attribute":{"source":4,"target":2}}}}]"#,
        )
        .unwrap_err();
    assert!(matches!(err, FlowError::NotConnectable { .. }));
}

#[test]
fn validate_and_data_options() {
    let mut c = container();
    assert_eq!(
        c.handle_json(r#"{"type":"validate"}"#).unwrap(),
        HandleOutput::Issues(vec![])
    );

    c.handle_json(r#"[{"type":"delete","data":{"id":"c2"}}]"#)
        .unwrap();
    let HandleOutput::Issues(issues) = c.handle_json(r#"{"type":"validate"}"#).unwrap() else {
        panic!("expected issues");
    };
    assert!(issues.contains(&ValidationIssue::Unreachable { element: id("3") }));

    let HandleOutput::Data(data) = c.handle_json(r#"{"type":"data"}"#).unwrap() else {
        panic!("expected data");
    };
    let doc: serde_json::Value = serde_json::from_str(&data).unwrap();
    assert_eq!(doc["scale"], json!(1.5));
    assert!(doc["elements"].as_array().unwrap().iter().all(|e| e["id"] != json!("c2")));
}

#[test]
fn graph_viewport_updates() {
    let mut c = container();
    c.handle_json(r#"{"type":"update","data":{"field":"x","value":"-40"}}"#)
        .unwrap();
    c.handle_json(r#"{"type":"update","data":{"field":"height","value":720}}"#)
        .unwrap();
    assert_eq!(c.graph().x, -40.0);
    assert_eq!(c.graph().height, 720.0);
    assert!(
        c.handle_json(r#"{"type":"update","data":{"field":"scale","value":0}}"#)
            .is_err()
    );
    assert!(
        c.handle_json(r#"{"type":"update","data":{"field":"readOnly","value":"yes"}}"#)
            .is_err()
    );
}

#[test]
fn read_only_still_accepts_host_element_options() {
    let mut c = container();
    c.set_read_only(true);
    c.handle_json(r#"[{"type":"update","data":{"id":2,"field":"status","value":"success"}}]"#)
        .unwrap();
    assert_eq!(c.graph().get(id("2")).unwrap().status, ElementStatus::Success);
    assert_eq!(c.graph().status, GraphStatus::Readonly);

    // User deletes stay refused.
    let review = c.graph().to_screen(Point::new(220.0, 200.0));
    c.click(review, Modifiers::NONE);
    c.key("Delete", Modifiers::NONE);
    assert!(c.graph().contains(id("2")));

    c.handle_json(r#"{"type":"update","data":{"field":"readOnly","value":false}}"#)
        .unwrap();
    assert_eq!(c.graph().status, GraphStatus::Edit);
}

#[test]
fn empty_option_list_keeps_history() {
    let mut c = container();
    c.handle_json(r#"[{"type":"update","data":{"id":2,"field":"text","value":"x"}}]"#)
        .unwrap();
    c.undo();
    assert!(c.can_redo());

    // No id and nothing selected: nothing to apply.
    let out = c
        .handle_json(r#"[{"type":"update","data":{"field":"text","value":"y"}}]"#)
        .unwrap();
    assert_eq!(
        out,
        HandleOutput::Elements {
            created: vec![],
            deleted: vec![]
        }
    );
    c.handle_json("[]").unwrap();
    assert!(!c.can_undo());
    assert!(c.can_redo());
}

#[test]
fn malformed_option_is_an_error() {
    let mut c = container();
    assert!(matches!(c.handle_json("{"), Err(FlowError::Json(_))));
    assert!(c.handle_json(r#"[{"type":"update","data":{"id":2}}]"#).is_err());
}
