//! Tests for arena tree surgery: lifecycle, shape conversion, styles.

use super::*;

fn scalar(v: impl Into<Scalar>) -> FieldValue {
    FieldValue::Scalar(v.into())
}

#[test]
fn root_is_an_empty_section() {
    let tree = Tree::new();
    assert!(tree.is_root(tree.root()));
    assert_eq!(tree.kind(tree.root()), Some(FieldKind::Section));
    assert_eq!(tree.len(tree.root()), Some(0));
    assert_eq!(tree.display_path(tree.root()), "");
}

#[test]
fn section_set_and_get_are_case_insensitive() {
    let mut tree = Tree::new();
    let root = tree.root();
    let id = tree.section_set(root, "Server", scalar("web-1")).unwrap();

    assert_eq!(tree.section_get(root, "server"), Some(id));
    assert_eq!(tree.section_get(root, "SERVER"), Some(id));
    assert_eq!(tree.key(id), Some("Server"));
    assert_eq!(tree.section_get(root, "other"), None);
}

#[test]
fn section_set_keeps_stored_key_spelling_and_position() {
    let mut tree = Tree::new();
    let root = tree.root();
    tree.section_set(root, "Alpha", scalar(1i64)).unwrap();
    tree.section_set(root, "beta", scalar(2i64)).unwrap();

    // Rewriting under a different case replaces in place.
    let replaced = tree.section_set(root, "ALPHA", scalar(3i64)).unwrap();
    let keys: Vec<_> = tree.section_iter(root).map(|(k, _)| k.to_string()).collect();
    assert_eq!(keys, vec!["Alpha", "beta"]);
    assert_eq!(tree.scalar(replaced), Some(&Scalar::Int(3)));
}

#[test]
fn replaced_child_handle_goes_stale() {
    let mut tree = Tree::new();
    let root = tree.root();
    let old = tree.section_set(root, "a", scalar(1i64)).unwrap();
    let new = tree.section_set(root, "a", scalar(2i64)).unwrap();

    assert!(!tree.contains(old));
    assert!(tree.contains(new));
}

#[test]
fn removing_a_subtree_frees_descendants() {
    let mut tree = Tree::new();
    let root = tree.root();
    let section = tree.section_set(root, "db", FieldValue::section()).unwrap();
    let leaf = tree.section_set(section, "host", scalar("local")).unwrap();

    assert!(tree.section_remove(root, "db"));
    assert!(!tree.contains(section));
    assert!(!tree.contains(leaf));
    assert!(!tree.section_remove(root, "db"));
}

#[test]
fn sequence_push_and_get() {
    let mut tree = Tree::with_root(FieldValue::sequence());
    let root = tree.root();
    let a = tree.sequence_push(root, scalar(1i64)).unwrap();
    let b = tree.sequence_push(root, scalar(2i64)).unwrap();

    assert_eq!(tree.sequence_get(root, 0), Some(a));
    assert_eq!(tree.sequence_get(root, 1), Some(b));
    assert_eq!(tree.index(b), Some(1));
    assert_eq!(tree.sequence_get(root, 2), None);
}

#[test]
fn sequence_set_pads_past_the_end_with_empty_scalars() {
    let mut tree = Tree::with_root(FieldValue::sequence());
    let root = tree.root();
    tree.sequence_set(root, 2, scalar("x")).unwrap();

    assert_eq!(tree.len(root), Some(3));
    let first = tree.sequence_get(root, 0).unwrap();
    assert_eq!(tree.scalar(first), Some(&Scalar::Str(String::new())));
    let last = tree.sequence_get(root, 2).unwrap();
    assert_eq!(tree.scalar(last), Some(&Scalar::Str("x".into())));
}

#[test]
fn sequence_remove_recompacts_indices() {
    let mut tree = Tree::with_root(FieldValue::sequence());
    let root = tree.root();
    for n in 1i64..=3 {
        tree.sequence_push(root, scalar(n)).unwrap();
    }
    let last = tree.sequence_get(root, 2).unwrap();

    assert!(tree.sequence_remove(root, 1));
    assert_eq!(tree.len(root), Some(2));
    // The former third item slides down to index 1 and its token follows.
    assert_eq!(tree.sequence_get(root, 1), Some(last));
    assert_eq!(tree.index(last), Some(1));
    assert!(!tree.sequence_remove(root, 5));
}

#[test]
fn kind_mismatch_is_reported() {
    let mut tree = Tree::new();
    let root = tree.root();
    let leaf = tree.section_set(root, "x", scalar(1i64)).unwrap();

    let err = tree.section_set(leaf, "y", scalar(2i64)).unwrap_err();
    assert!(err.is_kind_mismatch());

    let err = tree.sequence_push(root, scalar(1i64)).unwrap_err();
    assert_eq!(
        err,
        TreeError::KindMismatch {
            expected: FieldKind::Sequence,
            actual: FieldKind::Section,
        }
    );
}

#[test]
fn detached_handle_is_reported() {
    let mut tree = Tree::new();
    let root = tree.root();
    let old = tree.section_set(root, "a", scalar(1i64)).unwrap();
    tree.section_remove(root, "a");

    assert!(tree.set_scalar(old, Scalar::Int(2)).unwrap_err().is_detached());
    assert_eq!(tree.kind(old), None);
}

#[test]
fn convert_scalar_to_section_splices_parent_slot() {
    let mut tree = Tree::new();
    let root = tree.root();
    let leaf = tree.section_set(root, "cfg", scalar("flat")).unwrap();

    let section = tree.convert_to_section(leaf).unwrap();
    assert!(!tree.contains(leaf));
    assert_eq!(tree.kind(section), Some(FieldKind::Section));
    assert_eq!(tree.section_get(root, "cfg"), Some(section));
    // Converting again is a no-op returning the same handle.
    assert_eq!(tree.convert_to_section(section).unwrap(), section);
}

#[test]
fn convert_sequence_to_section_keys_children_by_position() {
    let mut tree = Tree::new();
    let root = tree.root();
    let seq = tree.section_set(root, "xs", FieldValue::sequence()).unwrap();
    let a = tree.sequence_push(seq, scalar("a")).unwrap();
    let b = tree.sequence_push(seq, scalar("b")).unwrap();

    let section = tree.convert_to_section(seq).unwrap();
    assert_eq!(tree.section_get(section, "0"), Some(a));
    assert_eq!(tree.section_get(section, "1"), Some(b));
    assert_eq!(tree.parent(a), Some(section));
    assert_eq!(tree.key(b), Some("1"));
}

#[test]
fn convert_section_to_sequence_keeps_value_order() {
    let mut tree = Tree::new();
    let root = tree.root();
    let section = tree.section_set(root, "m", FieldValue::section()).unwrap();
    let first = tree.section_set(section, "one", scalar(1i64)).unwrap();
    let second = tree.section_set(section, "two", scalar(2i64)).unwrap();

    let seq = tree.convert_to_sequence(section).unwrap();
    assert_eq!(tree.sequence_get(seq, 0), Some(first));
    assert_eq!(tree.sequence_get(seq, 1), Some(second));
    assert_eq!(tree.index(first), Some(0));
    assert_eq!(tree.key(first), None);
}

#[test]
fn conversion_round_trip_preserves_positional_entries() {
    let mut tree = Tree::new();
    let root = tree.root();
    let section = tree.section_set(root, "m", FieldValue::section()).unwrap();
    let a = tree.section_set(section, "0", scalar("a")).unwrap();
    let b = tree.section_set(section, "1", scalar("b")).unwrap();

    // Positional keys survive a there-and-back conversion.
    let seq = tree.convert_to_sequence(section).unwrap();
    let back = tree.convert_to_section(seq).unwrap();

    assert_eq!(tree.len(back), Some(2));
    assert_eq!(tree.section_get(back, "0"), Some(a));
    assert_eq!(tree.section_get(back, "1"), Some(b));
    assert_eq!(tree.scalar(a), Some(&Scalar::Str("a".into())));
    assert_eq!(tree.scalar(b), Some(&Scalar::Str("b".into())));
    assert_eq!(tree.parent(a), Some(back));
}

#[test]
fn convert_root_updates_the_root_handle() {
    let mut tree = Tree::new();
    let old_root = tree.root();
    let new_root = tree.convert_to_sequence(old_root).unwrap();

    assert!(!tree.contains(old_root));
    assert_eq!(tree.root(), new_root);
    assert!(tree.is_root(new_root));
}

#[test]
fn clear_frees_children_but_keeps_the_branch() {
    let mut tree = Tree::new();
    let root = tree.root();
    let child = tree.section_set(root, "a", scalar(1i64)).unwrap();

    tree.clear(root);
    assert!(tree.contains(root));
    assert_eq!(tree.len(root), Some(0));
    assert!(!tree.contains(child));
}

#[test]
fn display_path_renders_keys_and_indices() {
    let mut tree = Tree::new();
    let root = tree.root();
    let servers = tree
        .section_set(root, "servers", FieldValue::sequence())
        .unwrap();
    let entry = tree.sequence_push(servers, FieldValue::section()).unwrap();
    let port = tree.section_set(entry, "port", scalar(80i64)).unwrap();

    assert_eq!(tree.display_path(port), "servers[0].port");
}

#[test]
fn nested_style_applies_to_new_children_only() {
    let mut tree = Tree::new();
    let root = tree.root();
    let section = tree.section_set(root, "s", FieldValue::section()).unwrap();
    let before = tree.section_set(section, "a", scalar(1i64)).unwrap();

    tree.set_nested_flow_style(section, FlowStyle::Flow).unwrap();
    let after = tree.section_set(section, "b", scalar(2i64)).unwrap();

    // The earlier child has no style of its own...
    assert_eq!(tree.flow_style(before), Some(FlowStyle::Auto));
    // ...but still resolves to the ancestor hint.
    assert_eq!(tree.effective_flow_style(before), FlowStyle::Flow);
    // The later child copied the hint at construction.
    assert_eq!(tree.flow_style(after), Some(FlowStyle::Flow));
}

#[test]
fn own_style_shadows_ancestor_hints() {
    let mut tree = Tree::new();
    let root = tree.root();
    tree.set_nested_flow_style(root, FlowStyle::Flow).unwrap();
    tree.set_nested_scalar_style(root, ScalarStyle::DoubleQuoted)
        .unwrap();
    let child = tree.section_set(root, "a", scalar("v")).unwrap();
    tree.set_flow_style(child, FlowStyle::Block).unwrap();

    assert_eq!(tree.effective_flow_style(child), FlowStyle::Block);
    assert_eq!(
        tree.effective_scalar_style(child),
        Some(ScalarStyle::DoubleQuoted)
    );
}

#[test]
fn nested_style_rejects_scalars() {
    let mut tree = Tree::new();
    let root = tree.root();
    let leaf = tree.section_set(root, "x", scalar(1i64)).unwrap();

    assert!(tree
        .set_nested_flow_style(leaf, FlowStyle::Flow)
        .unwrap_err()
        .is_kind_mismatch());
}

#[test]
fn cursors_walk_and_edit_the_tree() {
    let mut tree = Tree::new();
    let root = tree.root();
    {
        let mut section = SectionMut::new(&mut tree, root);
        section.set("name", "demo");
        let mut tags = section.sequence("tags");
        tags.push("a");
        tags.push("b");
    }

    let root_ref = tree.get_ref(root).unwrap();
    assert_eq!(root_ref.len(), 2);
    assert_eq!(
        root_ref.get("name").and_then(|f| f.scalar().cloned()),
        Some(Scalar::Str("demo".into()))
    );
    let tags = root_ref.get("TAGS").unwrap();
    assert_eq!(tags.kind(), FieldKind::Sequence);
    assert_eq!(tags.items().len(), 2);
    assert_eq!(tags.at(1).unwrap().display_path(), "tags[1]");
}
