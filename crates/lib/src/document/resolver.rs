//! Route resolution against the tree.
//!
//! Reads walk the tree without side effects. Writes auto-vivify: every
//! missing step along the route is created, and the shape of each created
//! (or coerced) step is chosen by looking ahead at the next key — an index
//! key needs a sequence, a named key needs a section. Existing steps of the
//! wrong shape are converted rather than refused.

use crate::path::{FieldKey, Route};
use crate::tree::{FieldId, FieldKind, FieldValue, Tree, TreeError};

/// Resolves a route to an existing field. Never mutates.
pub(crate) fn resolve(tree: &Tree, route: &Route) -> Option<FieldId> {
    let mut current = tree.root();
    for key in route.keys() {
        current = step(tree, current, key)?;
    }
    Some(current)
}

/// One read-only step: first existing alias wins for named keys.
fn step(tree: &Tree, current: FieldId, key: &FieldKey) -> Option<FieldId> {
    match key {
        FieldKey::Index(i) => tree.sequence_get(current, *i),
        named => named
            .aliases()
            .iter()
            .find_map(|alias| tree.section_get(current, alias)),
    }
}

/// Where a write lands: an ensured parent branch plus the final key.
///
/// The parent is guaranteed live and of the shape the key needs, so the
/// put operations cannot fail.
pub(crate) struct WriteSlot {
    parent: FieldId,
    key: SlotKey,
}

pub(crate) enum SlotKey {
    Name(String),
    Index(usize),
}

impl WriteSlot {
    /// The existing field at the slot, if any.
    pub(crate) fn child(&self, tree: &Tree) -> Option<FieldId> {
        match &self.key {
            SlotKey::Name(name) => tree.section_get(self.parent, name),
            SlotKey::Index(i) => tree.sequence_get(self.parent, *i),
        }
    }

    /// Replaces (or creates) the field at the slot.
    pub(crate) fn put(&self, tree: &mut Tree, value: FieldValue) -> FieldId {
        match &self.key {
            SlotKey::Name(name) => tree
                .section_set(self.parent, name, value)
                .expect("write slot parent is an ensured section"),
            SlotKey::Index(i) => tree
                .sequence_set(self.parent, *i, value)
                .expect("write slot parent is an ensured sequence"),
        }
    }

    /// A detached node inheriting the slot parent's nested style, for
    /// building a replacement before committing it.
    pub(crate) fn stage(&self, tree: &mut Tree, value: FieldValue) -> FieldId {
        tree.stage(self.parent, value)
    }

    /// Commits a staged node into the slot, freeing whatever was there.
    pub(crate) fn attach(&self, tree: &mut Tree, staged: FieldId) -> FieldId {
        match &self.key {
            SlotKey::Name(name) => tree
                .section_attach(self.parent, name, staged)
                .expect("write slot parent is an ensured section"),
            SlotKey::Index(i) => tree
                .sequence_attach(self.parent, *i, staged)
                .expect("write slot parent is an ensured sequence"),
        }
    }
}

/// Resolves a route for writing, creating and reshaping intermediate
/// fields as the keys require.
pub(crate) fn resolve_for_write(tree: &mut Tree, route: &Route) -> Result<WriteSlot, TreeError> {
    let keys = route.keys();
    let (last, steps) = keys
        .split_last()
        .expect("a parsed route has at least one key");

    let mut current = tree.root();
    for (pos, key) in steps.iter().enumerate() {
        // Lookahead: the next key decides what shape this step must have.
        let child_shape = required_shape(&keys[pos + 1]);
        current = ensure_step(tree, current, key, child_shape)?;
    }

    match last {
        FieldKey::Index(i) => {
            let parent = coerce(tree, current, FieldKind::Sequence)?;
            Ok(WriteSlot {
                parent,
                key: SlotKey::Index(*i),
            })
        }
        named => {
            let parent = coerce(tree, current, FieldKind::Section)?;
            // Write under the alias that already exists, else the first one.
            let name = named
                .aliases()
                .iter()
                .find(|alias| tree.section_get(parent, alias).is_some())
                .cloned()
                .unwrap_or_else(|| named.canonical().unwrap_or_default().to_string());
            Ok(WriteSlot {
                parent,
                key: SlotKey::Name(name),
            })
        }
    }
}

/// Removes whatever the route addresses. Intermediate steps resolve
/// read-only (removal never vivifies); a named final key removes every
/// alias in its group.
pub(crate) fn remove(tree: &mut Tree, route: &Route) -> bool {
    let keys = route.keys();
    let (last, steps) = keys
        .split_last()
        .expect("a parsed route has at least one key");

    let mut current = tree.root();
    for key in steps {
        match step(tree, current, key) {
            Some(next) => current = next,
            None => return false,
        }
    }

    match last {
        FieldKey::Index(i) => tree.sequence_remove(current, *i),
        named => {
            let mut removed = false;
            for alias in named.aliases() {
                removed |= tree.section_remove(current, alias);
            }
            removed
        }
    }
}

fn required_shape(key: &FieldKey) -> FieldKind {
    if key.is_index() {
        FieldKind::Sequence
    } else {
        FieldKind::Section
    }
}

/// Walks one write step, creating or reshaping the child to `child_shape`.
fn ensure_step(
    tree: &mut Tree,
    current: FieldId,
    key: &FieldKey,
    child_shape: FieldKind,
) -> Result<FieldId, TreeError> {
    match key {
        FieldKey::Index(i) => {
            let parent = coerce(tree, current, FieldKind::Sequence)?;
            match tree.sequence_get(parent, *i) {
                Some(child) => coerce(tree, child, child_shape),
                None => tree.sequence_set(parent, *i, FieldValue::empty(child_shape)),
            }
        }
        named => {
            let parent = coerce(tree, current, FieldKind::Section)?;
            let existing = named
                .aliases()
                .iter()
                .find_map(|alias| tree.section_get(parent, alias));
            match existing {
                Some(child) => coerce(tree, child, child_shape),
                None => {
                    let name = named.canonical().unwrap_or_default();
                    tree.section_set(parent, name, FieldValue::empty(child_shape))
                }
            }
        }
    }
}

/// Reshapes a field to what a key needs; scalars are left to the writer.
fn coerce(tree: &mut Tree, id: FieldId, shape: FieldKind) -> Result<FieldId, TreeError> {
    match shape {
        FieldKind::Section => tree.convert_to_section(id),
        FieldKind::Sequence => tree.convert_to_sequence(id),
        FieldKind::Scalar => Ok(id),
    }
}
