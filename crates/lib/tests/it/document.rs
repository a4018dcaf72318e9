//! End-to-end document behavior: paths, typed access, editing.

use doctree::tree::{FieldKind, Scalar};
use doctree::Document;

use crate::helpers::doc_from_json;

#[test]
fn scalar_types_round_trip_through_paths() {
    let mut doc = Document::new();
    doc.set("b", true).unwrap();
    doc.set("c", 'x').unwrap();
    doc.set("s", "text").unwrap();
    doc.set("i", -42i64).unwrap();
    doc.set("f", 2.5f64).unwrap();

    assert_eq!(doc.get::<bool>("b").ok(), Some(true));
    assert_eq!(doc.get::<char>("c").ok(), Some('x'));
    assert_eq!(doc.get::<String>("s").ok(), Some("text".into()));
    assert_eq!(doc.get::<i64>("i").ok(), Some(-42));
    assert_eq!(doc.get::<f64>("f").ok(), Some(2.5));
}

#[test]
fn keys_and_aliases_are_case_insensitive_both_ways() {
    let mut doc = Document::new();
    doc.set("Server.Port", 8080i64).unwrap();

    // Reads match any casing and any alias in the group.
    assert_eq!(doc.get::<i64>("server.port").ok(), Some(8080));
    assert_eq!(doc.get::<i64>("SERVER.listen|port").ok(), Some(8080));

    // Writes through an alias land on the existing key, keeping its
    // original spelling.
    doc.set("server|srv.port|p", 9090i64).unwrap();
    assert_eq!(doc.field("server").unwrap().key(), Some("Server"));
    assert_eq!(doc.field("server.port").unwrap().key(), Some("Port"));
    assert_eq!(doc.get::<i64>("Server.Port").ok(), Some(9090));
    assert_eq!(doc.root().len(), 1);
}

#[test]
fn first_existing_alias_wins_on_read() {
    let mut doc = Document::new();
    doc.set("deadline", 30i64).unwrap();
    doc.set("timeout", 10i64).unwrap();

    // "timeout" is listed first, so it wins even though "deadline" was
    // written earlier.
    assert_eq!(doc.get::<i64>("timeout|deadline").ok(), Some(10));
    assert_eq!(doc.get::<i64>("deadline|timeout").ok(), Some(30));
}

#[test]
fn auto_vivification_builds_shapes_by_lookahead() {
    let mut doc = Document::new();
    doc.set("x[2].y", 1i64).unwrap();

    // "x" became a sequence because an index followed it.
    assert_eq!(doc.field("x").unwrap().kind(), FieldKind::Sequence);
    assert_eq!(doc.field("x").unwrap().len(), 3);
    // The gap was padded with empty-string placeholders.
    assert_eq!(
        doc.field("x[0]").unwrap().scalar(),
        Some(&Scalar::Str(String::new()))
    );
    assert_eq!(
        doc.field("x[1]").unwrap().scalar(),
        Some(&Scalar::Str(String::new()))
    );
    // "x[2]" became a section because a name followed it.
    assert_eq!(doc.field("x[2]").unwrap().kind(), FieldKind::Section);
    assert_eq!(doc.get::<i64>("x[2].y").ok(), Some(1));
}

#[test]
fn editing_a_parsed_document() {
    let mut doc = doc_from_json(r#"{"a": 1, "b": [1, 2, 3]}"#);

    assert_eq!(doc.get::<i64>("a").ok(), Some(1));
    assert_eq!(doc.get::<i64>("b[2]").ok(), Some(3));

    // Removing the middle item recompacts the indices.
    assert!(doc.remove("b[1]").unwrap());
    assert_eq!(doc.field("b").unwrap().len(), 2);
    assert_eq!(doc.get::<i64>("b[1]").ok(), Some(3));
    assert!(!doc.contains("b[2]"));

    // A dotted write vivifies the intermediate section.
    doc.set("c.d", "hi").unwrap();
    assert_eq!(doc.get::<String>("c.d").ok(), Some("hi".into()));
    assert_eq!(doc.field("c").unwrap().kind(), FieldKind::Section);
}

#[test]
fn absent_and_malformed_default_invalid_errors() {
    let mut doc = Document::new();
    doc.set("port", "eighty").unwrap();

    // Absent path: the default applies silently.
    assert_eq!(doc.get::<i64>("missing.port").with_default(80).unwrap(), 80);

    // Malformed path: reads as absent, so the default still applies.
    assert_eq!(doc.get::<i64>("a..b").with_default(80).unwrap(), 80);

    // Present but unconvertible: never defaulted.
    let err = doc.get::<i64>("port").with_default(80).unwrap_err();
    assert!(err.exists_in_document());
    assert_eq!(err.path(), "port");
}

#[test]
fn overwriting_changes_shape_and_stales_old_handles() {
    let mut doc = Document::new();
    doc.set("cfg.host", "a").unwrap();
    doc.set("cfg.port", 1i64).unwrap();

    // Writing a scalar over the section replaces the whole subtree.
    doc.set("cfg", "collapsed").unwrap();
    assert_eq!(doc.field("cfg").unwrap().kind(), FieldKind::Scalar);
    assert!(!doc.contains("cfg.host"));

    // And a deep write through it rebuilds a section again.
    doc.set("cfg.host", "b").unwrap();
    assert_eq!(doc.field("cfg").unwrap().kind(), FieldKind::Section);
    assert_eq!(doc.get::<String>("cfg.host").ok(), Some("b".into()));
}

#[test]
fn section_order_is_insertion_order() {
    let mut doc = Document::new();
    doc.set("zebra", 1i64).unwrap();
    doc.set("apple", 2i64).unwrap();
    doc.set("mango", 3i64).unwrap();
    doc.remove("apple").unwrap();
    doc.set("apple", 4i64).unwrap();

    let keys: Vec<_> = doc
        .root()
        .entries()
        .into_iter()
        .map(|(k, _)| k.to_string())
        .collect();
    assert_eq!(keys, vec!["zebra", "mango", "apple"]);
}

#[test]
fn numeric_widths_check_their_range() {
    let mut doc = Document::new();
    doc.set("big", 70000i64).unwrap();

    assert_eq!(doc.get::<i64>("big").ok(), Some(70000));
    assert_eq!(doc.get::<u32>("big").ok(), Some(70000));
    // Too narrow: present but invalid, so no silent default.
    let narrow = doc.get::<u16>("big");
    assert!(narrow.exists());
    assert!(!narrow.is_valid());
    assert!(narrow.with_default(0).is_err());
}

#[test]
fn clear_empties_the_document_but_keeps_its_identity() {
    let mut doc = doc_from_json(r#"{"a": 1, "b": {"c": 2}}"#);
    doc.set_source("cfg.json");
    doc.set_header(vec!["# keep me".into()]);

    doc.clear();
    assert_eq!(doc.root().len(), 0);
    assert!(!doc.contains("a"));
    assert_eq!(doc.header(), &["# keep me".to_string()]);
    // The registry still works after clearing.
    doc.set("a", 1i64).unwrap();
    assert_eq!(doc.get::<i64>("a").ok(), Some(1));
}

#[test]
fn root_cursor_converts_the_whole_document() {
    let mut doc = Document::new();
    doc.set("x", 1i64).unwrap();

    doc.root_mut().convert_to_sequence().unwrap();
    assert_eq!(doc.root().kind(), FieldKind::Sequence);
    // The old section child came along, now at index 0.
    assert_eq!(doc.root().at(0).and_then(|f| f.scalar().cloned()), Some(Scalar::Int(1)));
}

#[test]
fn batched_validation_collects_every_error() {
    let mut doc = doc_from_json(r#"{"port": "eighty", "retries": 3}"#);
    doc.set_source("service.json");

    let mut errors = Vec::new();
    let port = doc.get::<i64>("port").collect_or(&mut errors);
    let retries = doc.get::<i64>("retries").collect_or(&mut errors);
    let name = doc.get::<String>("name").collect_or(&mut errors);

    assert_eq!(port, None);
    assert_eq!(retries, Some(3));
    assert_eq!(name, None);
    assert_eq!(errors.len(), 2);
    // Every collected error names the source file.
    assert!(errors.iter().all(|e| e.file().is_some()));
}
