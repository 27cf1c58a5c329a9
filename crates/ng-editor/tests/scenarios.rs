//! Integration tests: end-to-end editing sessions driven through
//! `Editor::handle`, exercising ng-core, ng-render, and ng-editor together.

use ng_core::fields::{CheckboxField, SelectField, TextField};
use ng_core::geometry::Point;
use ng_core::model::Node;
use ng_core::port::Port;
use ng_editor::{ConnectState, Editor, EditorEvent, InputEvent, Modifiers, PointerButton};
use pretty_assertions::assert_eq;
use serde_json::json;

// ─── Helpers ─────────────────────────────────────────────────────────────

fn click(ed: &mut Editor, x: f32, y: f32) {
    ed.handle(&InputEvent::PointerDown {
        x,
        y,
        button: PointerButton::Primary,
        modifiers: Modifiers::NONE,
    });
    ed.handle(&InputEvent::PointerUp { x, y });
    ed.handle(&InputEvent::Click { x, y });
}

fn output_port(ed: &Editor, id: ng_core::NodeId) -> Point {
    ed.graph()
        .port_center(ng_core::PortRef::output(id))
        .unwrap()
}

fn input_port(ed: &Editor, id: ng_core::NodeId) -> Point {
    ed.graph().port_center(ng_core::PortRef::input(id)).unwrap()
}

// ─── Port rules ──────────────────────────────────────────────────────────

#[test]
fn occupied_single_input_refuses_second_source() {
    let mut ed = Editor::default();
    let n1 = ed
        .add_node(Node::new("Source", 0.0, 0.0).with_output(Port::output().with_many(false)))
        .unwrap();
    let n2 = ed
        .add_node(
            Node::new("Sink", 200.0, 0.0)
                .with_input(Port::input().with_many(false).with_allow(&["Source"])),
        )
        .unwrap();
    assert!(ed.connect(n1, n2).unwrap());

    let n3 = ed.add_node(Node::new("Source", 0.0, 200.0)).unwrap();
    assert!(!ed.connect(n3, n2).unwrap());
    assert_eq!(ed.graph().node(n2).unwrap().input.connection_count(), 1);

    // The same refusal through the pointer: arm N3, click N2's input.
    let out = output_port(&ed, n3);
    click(&mut ed, out.x, out.y);
    assert_eq!(ed.connect_state(), ConnectState::Armed(n3));
    assert!(ed.graph().node(n2).unwrap().disabled);
    let inp = input_port(&ed, n2);
    click(&mut ed, inp.x, inp.y);
    assert_eq!(ed.connect_state(), ConnectState::Armed(n3));
    assert_eq!(ed.graph().connections().count(), 1);
}

#[test]
fn rewire_by_clicking_a_connection() {
    let mut ed = Editor::default();
    let a = ed.add_node(Node::new("A", 0.0, 0.0)).unwrap();
    let b = ed.add_node(Node::new("B", 400.0, 0.0)).unwrap();
    let c = ed.add_node(Node::new("C", 400.0, 200.0)).unwrap();
    ed.connect(a, b).unwrap();
    ed.drain_events();

    // The wire is a straight line here; click its middle.
    click(&mut ed, 290.0, 14.0);
    assert_eq!(ed.connect_state(), ConnectState::Armed(a));
    let inp = input_port(&ed, c);
    click(&mut ed, inp.x, inp.y);

    assert_eq!(ed.connect_state(), ConnectState::Idle);
    let events = ed.drain_events();
    assert!(events.contains(&EditorEvent::Disconnected { from: a, to: b }));
    assert!(events.contains(&EditorEvent::Connected { from: a, to: c }));
    let pairs: Vec<_> = ed.graph().connections().map(|(_, c)| (c.from, c.to)).collect();
    assert_eq!(pairs, vec![(a, c)]);
}

// ─── Clipboard ───────────────────────────────────────────────────────────

#[test]
fn paste_scenario_recenters_single_node() {
    let mut ed = Editor::default();
    ed.handle(&InputEvent::PointerMove { x: 300.0, y: 300.0 });
    let text = r#"{"nodes":[{"id":5,"type":"A","x":0,"y":0,"ports":{"input":{"allow":[],"many":true},"output":{"many":true}}}],"connections":[]}"#;
    assert!(ed.paste(text));

    let nodes: Vec<_> = ed.graph().nodes().collect();
    assert_eq!(nodes.len(), 1);
    assert_ne!(nodes[0].id.raw(), 5);
    let center = ed.graph().bounds(nodes[0].id).unwrap().center();
    assert_eq!(center, Point::new(300.0, 300.0));
}

#[test]
fn paste_respects_zoomed_cursor() {
    let mut ed = Editor::default();
    ed.handle(&InputEvent::Wheel {
        x: 0.0,
        y: 0.0,
        delta_y: 1.0,
    });
    let scale = ed.viewport().scale;
    ed.handle(&InputEvent::PointerMove { x: 100.0, y: 50.0 });
    let text = r#"{"nodes":[{"id":1,"type":"A","x":0,"y":0}],"connections":[]}"#;
    assert!(ed.paste(text));
    let id = ed.selection()[0];
    let center = ed.graph().bounds(id).unwrap().center();
    assert!((center.x - 100.0 / scale).abs() < 1e-3);
    assert!((center.y - 50.0 / scale).abs() < 1e-3);
}

#[test]
fn copy_keeps_only_internal_connections() {
    let mut ed = Editor::default();
    let a = ed.add_node(Node::new("A", 0.0, 0.0)).unwrap();
    let b = ed.add_node(Node::new("B", 300.0, 0.0)).unwrap();
    let c = ed.add_node(Node::new("C", 0.0, 300.0)).unwrap();
    ed.connect(a, b).unwrap();

    ed.set_selection(&[a, b]);
    let ab: serde_json::Value = serde_json::from_str(&ed.copy_selection().unwrap()).unwrap();
    assert_eq!(ab["connections"], json!([{"from": a.raw(), "to": b.raw()}]));

    ed.set_selection(&[a, c]);
    let ac: serde_json::Value = serde_json::from_str(&ed.copy_selection().unwrap()).unwrap();
    assert_eq!(ac["connections"], json!([]));
    assert!(ac.get("viewport").is_none());
}

#[test]
fn paste_with_rejected_data_changes_nothing() {
    let mut ed = Editor::default();
    let keep = ed.add_node(Node::new("Keep", 0.0, 0.0)).unwrap();
    ed.select(keep);
    ed.drain_events();

    let text = json!({
        "nodes": [
            {"id": 1, "type": "A", "x": 0, "y": 0},
            {"id": 2, "type": "B", "x": 300, "y": 0,
             "fields": [{"type": "select", "label": "Mode", "options": ["a", "b"]}],
             "data": {"mode": "zzz"}}
        ],
        "connections": [{"from": 1, "to": 2}]
    })
    .to_string();
    assert!(!ed.paste(&text));
    let ids: Vec<_> = ed.graph().nodes().map(|n| n.id).collect();
    assert_eq!(ids, vec![keep]);
    assert_eq!(ed.graph().connections().count(), 0);
    assert_eq!(ed.selection(), &[keep]);
    assert!(ed.drain_events().is_empty());
}

// ─── Persistence ─────────────────────────────────────────────────────────

#[test]
fn export_import_roundtrip_through_editor() {
    let mut ed = Editor::default();
    let a = ed
        .add_node(
            Node::new("Source", 20.0, 40.0)
                .with_field(TextField::new("Title").with_default("hello"))
                .with_field(CheckboxField::new("Live")),
        )
        .unwrap();
    let b = ed
        .add_node(
            Node::new("Sink", 320.0, 40.0)
                .with_field(SelectField::new("Mode", &["a", "b", "c"]))
                .with_input(Port::input().with_allow(&["Source"])),
        )
        .unwrap();
    ed.connect(a, b).unwrap();
    ed.set_field_value(b, "mode", &json!("c")).unwrap();
    ed.set_field_value(a, "live", &json!(true)).unwrap();

    let text = ed.export_json().unwrap();
    let mut other = Editor::default();
    other.import_json(&text).unwrap();

    let before: Vec<_> = ed.graph().nodes().map(|n| n.data()).collect();
    let after: Vec<_> = other.graph().nodes().map(|n| n.data()).collect();
    assert_eq!(before, after);

    let ids = other.graph().node_ids().to_vec();
    let pairs: Vec<_> = other.graph().connections().map(|(_, c)| (c.from, c.to)).collect();
    assert_eq!(pairs, vec![(ids[0], ids[1])]);
    assert!(ids.iter().all(|id| *id != a && *id != b));
}

// ─── Gestures ────────────────────────────────────────────────────────────

#[test]
fn every_gesture_ends_on_pointer_up() {
    let mut ed = Editor::default();
    let a = ed.add_node(Node::new("A", 0.0, 0.0)).unwrap();
    let b = ed.add_node(Node::new("B", 300.0, 0.0)).unwrap();
    ed.set_selection(&[a, b]);

    let presses = [
        (PointerButton::Primary, 90.0, 10.0),
        (PointerButton::Primary, 240.0, 10.0),
        (PointerButton::Primary, 800.0, 800.0),
        (PointerButton::Middle, 800.0, 800.0),
    ];
    for (button, x, y) in presses {
        ed.handle(&InputEvent::PointerDown {
            x,
            y,
            button,
            modifiers: Modifiers::NONE,
        });
        assert!(!ed.gesture().is_idle(), "{button:?} at ({x}, {y}) started nothing");
        ed.handle(&InputEvent::PointerMove {
            x: x + 30.0,
            y: y + 30.0,
        });
        ed.handle(&InputEvent::PointerUp {
            x: x + 30.0,
            y: y + 30.0,
        });
        assert!(ed.gesture().is_idle());
    }
    while ed.tick() {}
}
