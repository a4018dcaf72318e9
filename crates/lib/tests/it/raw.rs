//! The engine boundary, exercised end to end through a JSON engine.

use doctree::raw::{Raw, RawDocument};
use doctree::tree::{FieldKind, FlowStyle};
use doctree::Document;

use crate::helpers::{doc_from_json, JsonEngine};

#[test]
fn parse_edit_render_reparse() {
    let mut doc = doc_from_json(
        r#"{
            "service": {"name": "api", "port": 8080},
            "features": ["auth", "metrics"]
        }"#,
    );

    doc.set("service.port", 9090i64).unwrap();
    doc.set("features[2]", "tracing").unwrap();
    doc.remove("features[0]").unwrap();

    let rendered = doc.render_with(&JsonEngine).unwrap();
    let reparsed = doc_from_json(&rendered);

    assert_eq!(reparsed.get::<i64>("service.port").ok(), Some(9090));
    assert_eq!(reparsed.get::<String>("features[0]").ok(), Some("metrics".into()));
    assert_eq!(reparsed.get::<String>("features[1]").ok(), Some("tracing".into()));
    assert_eq!(reparsed.field("features").unwrap().len(), 2);
}

#[test]
fn parse_failures_surface_as_engine_errors() {
    let err = Document::parse_with(&JsonEngine, "{not json").unwrap_err();
    assert_eq!(err.module(), "raw");
    assert!(err.to_string().contains("parse failed"));
}

#[test]
fn typed_values_survive_a_json_round_trip() {
    let mut doc = Document::new();
    doc.set("enabled", true).unwrap();
    doc.set("ratio", 0.25f64).unwrap();
    doc.set("count", 12i64).unwrap();
    doc.set("label", "hello").unwrap();

    let reparsed = doc_from_json(&doc.render_with(&JsonEngine).unwrap());
    assert_eq!(reparsed.get::<bool>("enabled").ok(), Some(true));
    assert_eq!(reparsed.get::<f64>("ratio").ok(), Some(0.25));
    assert_eq!(reparsed.get::<i64>("count").ok(), Some(12));
    assert_eq!(reparsed.get::<String>("label").ok(), Some("hello".into()));
}

#[test]
fn numbers_read_as_the_requested_width() {
    let doc = doc_from_json(r#"{"port": 8080, "ratio": 1.5}"#);
    assert_eq!(doc.get::<u16>("port").ok(), Some(8080));
    assert_eq!(doc.get::<i64>("port").ok(), Some(8080));
    assert_eq!(doc.get::<f64>("port").ok(), Some(8080.0));
    assert_eq!(doc.get::<f32>("ratio").ok(), Some(1.5));
    assert!(!doc.get::<i64>("ratio").is_valid());
}

#[test]
fn raw_document_carries_styles_and_header_past_the_engine() {
    // An engine with comment and layout support would populate these from
    // its syntax; here they are attached by hand.
    let mut raw = parse_raw(r#"{"limits": {"cpu": 2}}"#);
    raw.header = vec!["# managed by deploy".into()];
    raw.styles.insert(
        "limits".into(),
        doctree::tree::FieldStyle {
            flow: FlowStyle::Flow,
            ..Default::default()
        },
    );

    let doc = Document::from_raw(raw);
    assert_eq!(doc.header(), &["# managed by deploy".to_string()]);
    assert_eq!(doc.field("limits").unwrap().flow_style(), FlowStyle::Flow);

    // The style comes back out on export.
    let exported = doc.to_raw();
    assert_eq!(
        exported.styles.get("limits").map(|s| s.flow),
        Some(FlowStyle::Flow)
    );
}

fn parse_raw(text: &str) -> RawDocument {
    use doctree::raw::TextEngine;
    JsonEngine.parse(text).unwrap()
}

#[test]
fn scalar_root_documents_work() {
    let doc = doc_from_json("42");
    assert_eq!(doc.root().kind(), FieldKind::Scalar);

    let rendered = doc.render_with(&JsonEngine).unwrap();
    assert_eq!(rendered.trim(), "42");
}

#[test]
fn deep_nesting_round_trips() {
    let doc = doc_from_json(r#"{"a": [{"b": [[1, 2], [3]]}]}"#);
    assert_eq!(doc.get::<i64>("a[0].b[1][0]").ok(), Some(3));

    let raw = doc.to_raw();
    let Raw::Map(map) = &raw.body else {
        panic!("root is a map");
    };
    assert!(matches!(map.get("a"), Some(Raw::List(_))));
}
