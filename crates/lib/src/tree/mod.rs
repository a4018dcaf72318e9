//! Arena-backed node model for documents.
//!
//! Every field in a document is one of three shapes: a [`Scalar`] leaf, a
//! keyed [`FieldKind::Section`], or an indexed [`FieldKind::Sequence`].
//! Fields live in a generational arena and refer to each other through
//! [`FieldId`] handles instead of owned pointers, which keeps parent and
//! root back-references cycle-free: a handle is just an index, and a handle
//! to a field that has been replaced or freed reads as dead rather than
//! dangling.
//!
//! A field's shape is fixed for the life of its handle. "Changing shape"
//! ([`Tree::convert_to_section`], [`Tree::convert_to_sequence`]) allocates a
//! replacement node, splices it into the parent slot, and frees the old
//! node — the old [`FieldId`] goes stale and the conversion returns the new
//! one.

use generational_arena::{Arena, Index};
use indexmap::IndexMap;
use std::fmt;

pub mod errors;
mod scalar;
mod style;

#[cfg(test)]
mod node_tests;

pub use errors::TreeError;
pub use scalar::Scalar;
pub use style::{FieldStyle, FlowStyle, ScalarStyle, StyleContext};

/// Handle to a field in a [`Tree`].
///
/// Generational: a handle to a freed or replaced field is detectably dead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(Index);

/// The shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FieldKind {
    Scalar,
    Section,
    Sequence,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar"),
            FieldKind::Section => write!(f, "section"),
            FieldKind::Sequence => write!(f, "sequence"),
        }
    }
}

/// How a field is addressed from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyToken {
    /// The document root; has no parent slot.
    Root,
    /// Section child keyed by string. Immutable once assigned; renaming is
    /// remove-plus-insert.
    Key(String),
    /// Sequence child; always equals the child's position in the backing
    /// collection.
    Index(usize),
}

/// The data a field holds: exactly one scalar, or ordered children.
#[derive(Debug)]
pub enum FieldValue {
    Scalar(Scalar),
    Section(IndexMap<String, FieldId>),
    Sequence(Vec<FieldId>),
}

impl FieldValue {
    /// Empty section payload.
    pub fn section() -> Self {
        FieldValue::Section(IndexMap::new())
    }

    /// Empty sequence payload.
    pub fn sequence() -> Self {
        FieldValue::Sequence(Vec::new())
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Scalar(_) => FieldKind::Scalar,
            FieldValue::Section(_) => FieldKind::Section,
            FieldValue::Sequence(_) => FieldKind::Sequence,
        }
    }

    /// Empty payload of the given kind (scalars default to an empty string).
    pub fn empty(kind: FieldKind) -> Self {
        match kind {
            FieldKind::Scalar => FieldValue::Scalar(Scalar::Str(String::new())),
            FieldKind::Section => FieldValue::section(),
            FieldKind::Sequence => FieldValue::sequence(),
        }
    }
}

/// One node in the document tree.
#[derive(Debug)]
struct Field {
    key: KeyToken,
    parent: Option<FieldId>,
    value: FieldValue,
    style: FieldStyle,
}

/// The document tree: an arena of fields plus a root handle.
#[derive(Debug)]
pub struct Tree {
    arena: Arena<Field>,
    root: FieldId,
}

impl Tree {
    /// Creates a tree whose root is an empty section.
    pub fn new() -> Self {
        Self::with_root(FieldValue::section())
    }

    /// Creates a tree with the given root payload (a root may be a branch or
    /// a scalar).
    pub fn with_root(value: FieldValue) -> Self {
        let mut arena = Arena::new();
        let root = FieldId(arena.insert(Field {
            key: KeyToken::Root,
            parent: None,
            value,
            style: FieldStyle::default(),
        }));
        Self { arena, root }
    }

    pub fn root(&self) -> FieldId {
        self.root
    }

    /// True while the handle points at a live field.
    pub fn contains(&self, id: FieldId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn kind(&self, id: FieldId) -> Option<FieldKind> {
        self.field(id).map(|f| f.value.kind())
    }

    pub fn parent(&self, id: FieldId) -> Option<FieldId> {
        self.field(id).and_then(|f| f.parent)
    }

    pub fn is_root(&self, id: FieldId) -> bool {
        id == self.root && self.contains(id)
    }

    /// The key under which this field sits in its parent section, if any.
    pub fn key(&self, id: FieldId) -> Option<&str> {
        match self.field(id).map(|f| &f.key)? {
            KeyToken::Key(k) => Some(k),
            _ => None,
        }
    }

    /// The index at which this field sits in its parent sequence, if any.
    pub fn index(&self, id: FieldId) -> Option<usize> {
        match self.field(id).map(|f| &f.key)? {
            KeyToken::Index(i) => Some(*i),
            _ => None,
        }
    }

    pub fn scalar(&self, id: FieldId) -> Option<&Scalar> {
        match &self.field(id)?.value {
            FieldValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Replaces the scalar value in place; the field must be a scalar.
    pub fn set_scalar(&mut self, id: FieldId, value: Scalar) -> Result<(), TreeError> {
        self.expect_kind(id, FieldKind::Scalar)?;
        if let Some(FieldValue::Scalar(s)) = self.payload_mut(id) {
            *s = value;
        }
        Ok(())
    }

    /// Number of children of a branch; `None` for scalars and dead handles.
    pub fn len(&self, id: FieldId) -> Option<usize> {
        match &self.field(id)?.value {
            FieldValue::Section(map) => Some(map.len()),
            FieldValue::Sequence(items) => Some(items.len()),
            FieldValue::Scalar(_) => None,
        }
    }

    /// Children of a branch in order; empty for scalars.
    pub fn children(&self, id: FieldId) -> Vec<FieldId> {
        match self.field(id).map(|f| &f.value) {
            Some(FieldValue::Section(map)) => map.values().copied().collect(),
            Some(FieldValue::Sequence(items)) => items.clone(),
            _ => Vec::new(),
        }
    }

    /// Iterates section entries in insertion order.
    pub fn section_iter(&self, id: FieldId) -> impl Iterator<Item = (&str, FieldId)> {
        self.field(id)
            .and_then(|f| match &f.value {
                FieldValue::Section(map) => Some(map),
                _ => None,
            })
            .into_iter()
            .flat_map(|map| map.iter().map(|(k, v)| (k.as_str(), *v)))
    }

    /// Iterates sequence items in index order.
    pub fn sequence_iter(&self, id: FieldId) -> impl Iterator<Item = FieldId> + '_ {
        self.field(id)
            .and_then(|f| match &f.value {
                FieldValue::Sequence(items) => Some(items),
                _ => None,
            })
            .into_iter()
            .flat_map(|items| items.iter().copied())
    }

    /// Looks up a section child by key, case-insensitively. The first stored
    /// key that matches wins.
    pub fn section_get(&self, branch: FieldId, key: &str) -> Option<FieldId> {
        match &self.field(branch)?.value {
            FieldValue::Section(map) => map
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| *v),
            _ => None,
        }
    }

    /// Inserts or replaces a section child.
    ///
    /// When a case-insensitive match already exists the stored key spelling
    /// and its slot position are kept and the old subtree is freed;
    /// otherwise the child is appended under the given key.
    pub fn section_set(
        &mut self,
        branch: FieldId,
        key: &str,
        value: FieldValue,
    ) -> Result<FieldId, TreeError> {
        self.expect_kind(branch, FieldKind::Section)?;
        let id = self.alloc(KeyToken::Key(key.to_string()), Some(branch), value);
        self.section_attach(branch, key, id)
    }

    /// Inserts an already-allocated node as a section child, fixing its key
    /// token and parent. Keyed like [`Tree::section_set`]: a case-insensitive
    /// match keeps the stored spelling and slot, and the displaced subtree
    /// is freed.
    pub(crate) fn section_attach(
        &mut self,
        branch: FieldId,
        key: &str,
        id: FieldId,
    ) -> Result<FieldId, TreeError> {
        self.expect_kind(branch, FieldKind::Section)?;
        let stored = match &self.field(branch).ok_or(TreeError::Detached)?.value {
            FieldValue::Section(map) => map
                .keys()
                .find(|k| k.eq_ignore_ascii_case(key))
                .cloned()
                .unwrap_or_else(|| key.to_string()),
            _ => key.to_string(),
        };
        if let Some(field) = self.arena.get_mut(id.0) {
            field.key = KeyToken::Key(stored.clone());
            field.parent = Some(branch);
        }
        let old = match self.payload_mut(branch) {
            Some(FieldValue::Section(map)) => map.insert(stored, id),
            _ => None,
        };
        if let Some(old) = old
            && old != id
        {
            self.free_subtree(old);
        }
        Ok(id)
    }

    /// Removes every section child whose key matches case-insensitively.
    pub fn section_remove(&mut self, branch: FieldId, key: &str) -> bool {
        let keys: Vec<String> = match self.field(branch).map(|f| &f.value) {
            Some(FieldValue::Section(map)) => map
                .keys()
                .filter(|k| k.eq_ignore_ascii_case(key))
                .cloned()
                .collect(),
            _ => return false,
        };
        if keys.is_empty() {
            return false;
        }
        let mut removed = Vec::new();
        if let Some(FieldValue::Section(map)) = self.payload_mut(branch) {
            for k in &keys {
                if let Some(id) = map.shift_remove(k) {
                    removed.push(id);
                }
            }
        }
        for id in removed {
            self.free_subtree(id);
        }
        true
    }

    /// Looks up a sequence child by index.
    pub fn sequence_get(&self, branch: FieldId, index: usize) -> Option<FieldId> {
        match &self.field(branch)?.value {
            FieldValue::Sequence(items) => items.get(index).copied(),
            _ => None,
        }
    }

    /// Appends a sequence child.
    pub fn sequence_push(
        &mut self,
        branch: FieldId,
        value: FieldValue,
    ) -> Result<FieldId, TreeError> {
        self.expect_kind(branch, FieldKind::Sequence)?;
        let index = self.len(branch).unwrap_or(0);
        let id = self.alloc(KeyToken::Index(index), Some(branch), value);
        if let Some(FieldValue::Sequence(items)) = self.payload_mut(branch) {
            items.push(id);
        }
        Ok(id)
    }

    /// Sets the sequence child at `index`, replacing what was there.
    ///
    /// Writes past the end pad the gap with empty-string scalar
    /// placeholders so indices stay contiguous.
    pub fn sequence_set(
        &mut self,
        branch: FieldId,
        index: usize,
        value: FieldValue,
    ) -> Result<FieldId, TreeError> {
        self.expect_kind(branch, FieldKind::Sequence)?;
        let id = self.alloc(KeyToken::Index(index), Some(branch), value);
        self.sequence_attach(branch, index, id)
    }

    /// Inserts an already-allocated node at a sequence index, fixing its key
    /// token and parent. Pads and replaces like [`Tree::sequence_set`].
    pub(crate) fn sequence_attach(
        &mut self,
        branch: FieldId,
        index: usize,
        id: FieldId,
    ) -> Result<FieldId, TreeError> {
        self.expect_kind(branch, FieldKind::Sequence)?;
        if let Some(field) = self.arena.get_mut(id.0) {
            field.key = KeyToken::Index(index);
            field.parent = Some(branch);
        }
        let len = self.len(branch).unwrap_or(0);
        if index < len {
            let old = match self.payload_mut(branch) {
                Some(FieldValue::Sequence(items)) => std::mem::replace(&mut items[index], id),
                _ => id,
            };
            if old != id {
                self.free_subtree(old);
            }
        } else {
            for i in len..index {
                let placeholder = self.alloc(
                    KeyToken::Index(i),
                    Some(branch),
                    FieldValue::Scalar(Scalar::Str(String::new())),
                );
                if let Some(FieldValue::Sequence(items)) = self.payload_mut(branch) {
                    items.push(placeholder);
                }
            }
            if let Some(FieldValue::Sequence(items)) = self.payload_mut(branch) {
                items.push(id);
            }
        }
        Ok(id)
    }

    /// Removes the sequence child at `index`; the indices of all following
    /// children recompact to stay contiguous.
    pub fn sequence_remove(&mut self, branch: FieldId, index: usize) -> bool {
        let (removed, tail) = match self.payload_mut(branch) {
            Some(FieldValue::Sequence(items)) if index < items.len() => {
                let removed = items.remove(index);
                (removed, items[index..].to_vec())
            }
            _ => return false,
        };
        self.free_subtree(removed);
        for (offset, id) in tail.into_iter().enumerate() {
            if let Some(field) = self.arena.get_mut(id.0) {
                field.key = KeyToken::Index(index + offset);
            }
        }
        true
    }

    /// Wipes all children of a branch. No-op for scalars.
    pub fn clear(&mut self, branch: FieldId) {
        let children = self.children(branch);
        if let Some(payload) = self.payload_mut(branch) {
            match payload {
                FieldValue::Section(map) => map.clear(),
                FieldValue::Sequence(items) => items.clear(),
                FieldValue::Scalar(_) => {}
            }
        }
        for child in children {
            self.free_subtree(child);
        }
    }

    /// Converts a field to a section, splicing a replacement node into the
    /// parent slot. Idempotent for sections.
    ///
    /// Sequence children keep their order and receive synthetic positional
    /// keys (`"0"`, `"1"`, ...). A scalar converts to an empty section,
    /// dropping its value. The old handle goes stale; use the returned one.
    pub fn convert_to_section(&mut self, id: FieldId) -> Result<FieldId, TreeError> {
        match self.kind(id).ok_or(TreeError::Detached)? {
            FieldKind::Section => Ok(id),
            FieldKind::Scalar => self.splice(id, FieldValue::section(), Vec::new()),
            FieldKind::Sequence => {
                let children = self.children(id);
                let mut map = IndexMap::with_capacity(children.len());
                let mut moved = Vec::with_capacity(children.len());
                for (i, child) in children.into_iter().enumerate() {
                    map.insert(i.to_string(), child);
                    moved.push((child, KeyToken::Key(i.to_string())));
                }
                self.splice(id, FieldValue::Section(map), moved)
            }
        }
    }

    /// Converts a field to a sequence, splicing a replacement node into the
    /// parent slot. Idempotent for sequences.
    ///
    /// Section children keep their value order and drop their keys. A
    /// scalar converts to an empty sequence. The old handle goes stale; use
    /// the returned one.
    pub fn convert_to_sequence(&mut self, id: FieldId) -> Result<FieldId, TreeError> {
        match self.kind(id).ok_or(TreeError::Detached)? {
            FieldKind::Sequence => Ok(id),
            FieldKind::Scalar => self.splice(id, FieldValue::sequence(), Vec::new()),
            FieldKind::Section => {
                let children = self.children(id);
                let moved = children
                    .iter()
                    .enumerate()
                    .map(|(i, child)| (*child, KeyToken::Index(i)))
                    .collect();
                self.splice(id, FieldValue::Sequence(children), moved)
            }
        }
    }

    /// Sets the field's own flow style.
    pub fn set_flow_style(&mut self, id: FieldId, style: FlowStyle) -> Result<(), TreeError> {
        let field = self.arena.get_mut(id.0).ok_or(TreeError::Detached)?;
        field.style.flow = style;
        Ok(())
    }

    /// Sets the field's own scalar style.
    pub fn set_scalar_style(
        &mut self,
        id: FieldId,
        style: Option<ScalarStyle>,
    ) -> Result<(), TreeError> {
        let field = self.arena.get_mut(id.0).ok_or(TreeError::Detached)?;
        field.style.scalar = style;
        Ok(())
    }

    /// Sets the flow style a branch hands down to its children.
    ///
    /// Children created afterwards copy it at construction; existing
    /// children without an explicit style of their own resolve to it
    /// through [`Tree::effective_flow_style`].
    pub fn set_nested_flow_style(&mut self, id: FieldId, style: FlowStyle) -> Result<(), TreeError> {
        self.expect_branch(id)?;
        if let Some(field) = self.arena.get_mut(id.0) {
            field.style.nested.flow = Some(style);
        }
        Ok(())
    }

    /// Sets the scalar style a branch hands down to its children.
    pub fn set_nested_scalar_style(
        &mut self,
        id: FieldId,
        style: ScalarStyle,
    ) -> Result<(), TreeError> {
        self.expect_branch(id)?;
        if let Some(field) = self.arena.get_mut(id.0) {
            field.style.nested.scalar = Some(style);
        }
        Ok(())
    }

    pub fn flow_style(&self, id: FieldId) -> Option<FlowStyle> {
        self.field(id).map(|f| f.style.flow)
    }

    /// The field's full style state, for export at the raw boundary.
    pub(crate) fn style(&self, id: FieldId) -> Option<FieldStyle> {
        self.field(id).map(|f| f.style)
    }

    /// Restores a full style state, for import at the raw boundary.
    pub(crate) fn set_style(&mut self, id: FieldId, style: FieldStyle) {
        if let Some(field) = self.arena.get_mut(id.0) {
            field.style = style;
        }
    }

    /// The flow style this field renders with: its own unless `Auto`, else
    /// the nearest ancestor's nested hint, else `Auto`.
    pub fn effective_flow_style(&self, id: FieldId) -> FlowStyle {
        if let Some(field) = self.field(id)
            && field.style.flow != FlowStyle::Auto
        {
            return field.style.flow;
        }
        let mut cursor = self.parent(id);
        while let Some(ancestor) = cursor {
            if let Some(field) = self.field(ancestor) {
                if let Some(flow) = field.style.nested.flow {
                    return flow;
                }
                cursor = field.parent;
            } else {
                break;
            }
        }
        FlowStyle::Auto
    }

    /// The scalar style this field renders with, resolved like
    /// [`Tree::effective_flow_style`].
    pub fn effective_scalar_style(&self, id: FieldId) -> Option<ScalarStyle> {
        if let Some(style) = self.field(id).and_then(|f| f.style.scalar) {
            return Some(style);
        }
        let mut cursor = self.parent(id);
        while let Some(ancestor) = cursor {
            let field = self.field(ancestor)?;
            if let Some(style) = field.style.nested.scalar {
                return Some(style);
            }
            cursor = field.parent;
        }
        None
    }

    /// Dotted display path of a field from the root, indices rendered as
    /// `[i]`. The root itself is the empty string.
    pub fn display_path(&self, id: FieldId) -> String {
        let mut tokens = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let Some(field) = self.field(current) else {
                break;
            };
            if !matches!(field.key, KeyToken::Root) {
                tokens.push(field.key.clone());
            }
            cursor = field.parent;
        }
        tokens.reverse();
        let mut out = String::new();
        for token in tokens {
            match token {
                KeyToken::Root => {}
                KeyToken::Key(k) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&k);
                }
                KeyToken::Index(i) => {
                    out.push('[');
                    out.push_str(&i.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    /// Read cursor for a live field.
    pub fn get_ref(&self, id: FieldId) -> Option<FieldRef<'_>> {
        self.contains(id).then(|| FieldRef::new(self, id))
    }

    fn field(&self, id: FieldId) -> Option<&Field> {
        self.arena.get(id.0)
    }

    fn payload_mut(&mut self, id: FieldId) -> Option<&mut FieldValue> {
        self.arena.get_mut(id.0).map(|f| &mut f.value)
    }

    fn expect_kind(&self, id: FieldId, expected: FieldKind) -> Result<(), TreeError> {
        let actual = self.kind(id).ok_or(TreeError::Detached)?;
        if actual != expected {
            return Err(TreeError::KindMismatch { expected, actual });
        }
        Ok(())
    }

    fn expect_branch(&self, id: FieldId) -> Result<(), TreeError> {
        let actual = self.kind(id).ok_or(TreeError::Detached)?;
        if actual == FieldKind::Scalar {
            return Err(TreeError::KindMismatch {
                expected: FieldKind::Section,
                actual,
            });
        }
        Ok(())
    }

    /// Allocates a node that is not yet reachable from the tree, inheriting
    /// `parent`'s nested style context.
    ///
    /// The node carries a placeholder key token until it is committed with
    /// [`Tree::section_attach`] or [`Tree::sequence_attach`]; a staged node
    /// that is never attached must be freed with [`Tree::discard`].
    pub(crate) fn stage(&mut self, parent: FieldId, value: FieldValue) -> FieldId {
        self.alloc(KeyToken::Root, Some(parent), value)
    }

    /// Frees a staged node and everything built under it.
    pub(crate) fn discard(&mut self, id: FieldId) {
        self.free_subtree(id);
    }

    /// Allocates a node, copying the parent's nested style context into the
    /// new child's own style.
    fn alloc(&mut self, key: KeyToken, parent: Option<FieldId>, value: FieldValue) -> FieldId {
        let inherited = parent
            .and_then(|p| self.field(p))
            .map(|f| f.style.nested)
            .unwrap_or_default();
        let mut style = FieldStyle::default();
        if let Some(flow) = inherited.flow {
            style.flow = flow;
        }
        if let Some(scalar) = inherited.scalar {
            style.scalar = Some(scalar);
        }
        FieldId(self.arena.insert(Field {
            key,
            parent,
            value,
            style,
        }))
    }

    /// Replaces `old` with a node holding `value`, re-homing `children`
    /// under the replacement and fixing the parent slot (or root handle).
    fn splice(
        &mut self,
        old: FieldId,
        value: FieldValue,
        children: Vec<(FieldId, KeyToken)>,
    ) -> Result<FieldId, TreeError> {
        let (key, parent, style) = {
            let field = self.field(old).ok_or(TreeError::Detached)?;
            (field.key.clone(), field.parent, field.style)
        };
        let replacement = FieldId(self.arena.insert(Field {
            key,
            parent,
            value,
            style,
        }));
        for (child, token) in children {
            if let Some(field) = self.arena.get_mut(child.0) {
                field.key = token;
                field.parent = Some(replacement);
            }
        }
        match parent {
            None => self.root = replacement,
            Some(p) => {
                if let Some(payload) = self.payload_mut(p) {
                    match payload {
                        FieldValue::Section(map) => {
                            for slot in map.values_mut() {
                                if *slot == old {
                                    *slot = replacement;
                                }
                            }
                        }
                        FieldValue::Sequence(items) => {
                            for slot in items.iter_mut() {
                                if *slot == old {
                                    *slot = replacement;
                                }
                            }
                        }
                        FieldValue::Scalar(_) => {}
                    }
                }
            }
        }
        // Children were re-homed above; only the old node itself is freed.
        self.arena.remove(old.0);
        Ok(replacement)
    }

    /// Frees a node and everything below it.
    fn free_subtree(&mut self, id: FieldId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(field) = self.arena.remove(current.0) {
                match field.value {
                    FieldValue::Section(map) => stack.extend(map.into_values()),
                    FieldValue::Sequence(items) => stack.extend(items),
                    FieldValue::Scalar(_) => {}
                }
            }
        }
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

/// Borrowed read cursor over one field.
#[derive(Clone, Copy)]
pub struct FieldRef<'a> {
    tree: &'a Tree,
    id: FieldId,
}

impl<'a> FieldRef<'a> {
    pub(crate) fn new(tree: &'a Tree, id: FieldId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    /// The field's shape. Cursors are only handed out for live fields and
    /// hold a tree borrow for their whole lifetime, so the handle cannot go
    /// stale underneath; the scalar fallback is unreachable through the
    /// public surface.
    pub fn kind(&self) -> FieldKind {
        self.tree.kind(self.id).unwrap_or(FieldKind::Scalar)
    }

    pub fn is_root(&self) -> bool {
        self.tree.is_root(self.id)
    }

    pub fn key(&self) -> Option<&'a str> {
        self.tree.key(self.id)
    }

    pub fn index(&self) -> Option<usize> {
        self.tree.index(self.id)
    }

    pub fn scalar(&self) -> Option<&'a Scalar> {
        self.tree.scalar(self.id)
    }

    /// Section child by key (case-insensitive).
    pub fn get(&self, key: &str) -> Option<FieldRef<'a>> {
        self.tree
            .section_get(self.id, key)
            .map(|id| FieldRef::new(self.tree, id))
    }

    /// Sequence child by index.
    pub fn at(&self, index: usize) -> Option<FieldRef<'a>> {
        self.tree
            .sequence_get(self.id, index)
            .map(|id| FieldRef::new(self.tree, id))
    }

    /// Number of children; zero for scalars.
    pub fn len(&self) -> usize {
        self.tree.len(self.id).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Section entries in insertion order.
    pub fn entries(&self) -> Vec<(&'a str, FieldRef<'a>)> {
        self.tree
            .section_iter(self.id)
            .map(|(k, id)| (k, FieldRef::new(self.tree, id)))
            .collect()
    }

    /// Sequence items in index order.
    pub fn items(&self) -> Vec<FieldRef<'a>> {
        self.tree
            .sequence_iter(self.id)
            .map(|id| FieldRef::new(self.tree, id))
            .collect()
    }

    pub fn parent(&self) -> Option<FieldRef<'a>> {
        self.tree
            .parent(self.id)
            .map(|id| FieldRef::new(self.tree, id))
    }

    pub fn display_path(&self) -> String {
        self.tree.display_path(self.id)
    }

    pub fn flow_style(&self) -> FlowStyle {
        self.tree.flow_style(self.id).unwrap_or_default()
    }

    pub fn effective_flow_style(&self) -> FlowStyle {
        self.tree.effective_flow_style(self.id)
    }

    pub fn effective_scalar_style(&self) -> Option<ScalarStyle> {
        self.tree.effective_scalar_style(self.id)
    }
}

impl fmt::Debug for FieldRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef")
            .field("path", &self.display_path())
            .field("kind", &self.kind())
            .finish()
    }
}

/// Exclusive cursor over one field, for style edits and shape conversion.
pub struct FieldMut<'a> {
    tree: &'a mut Tree,
    id: FieldId,
}

impl<'a> FieldMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: FieldId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    pub fn as_ref(&self) -> FieldRef<'_> {
        FieldRef::new(self.tree, self.id)
    }

    /// The field's shape; see [`FieldRef::kind`] on why the scalar fallback
    /// is unreachable.
    pub fn kind(&self) -> FieldKind {
        self.tree.kind(self.id).unwrap_or(FieldKind::Scalar)
    }

    pub fn set_scalar(&mut self, value: impl Into<Scalar>) -> Result<(), TreeError> {
        self.tree.set_scalar(self.id, value.into())
    }

    pub fn set_flow_style(&mut self, style: FlowStyle) -> Result<(), TreeError> {
        self.tree.set_flow_style(self.id, style)
    }

    pub fn set_scalar_style(&mut self, style: Option<ScalarStyle>) -> Result<(), TreeError> {
        self.tree.set_scalar_style(self.id, style)
    }

    pub fn set_nested_flow_style(&mut self, style: FlowStyle) -> Result<(), TreeError> {
        self.tree.set_nested_flow_style(self.id, style)
    }

    pub fn set_nested_scalar_style(&mut self, style: ScalarStyle) -> Result<(), TreeError> {
        self.tree.set_nested_scalar_style(self.id, style)
    }

    pub fn clear(&mut self) {
        self.tree.clear(self.id);
    }

    /// Converts to a section; consumes the cursor because the old handle
    /// goes stale.
    pub fn convert_to_section(self) -> Result<FieldMut<'a>, TreeError> {
        let id = self.tree.convert_to_section(self.id)?;
        Ok(FieldMut::new(self.tree, id))
    }

    /// Converts to a sequence; consumes the cursor because the old handle
    /// goes stale.
    pub fn convert_to_sequence(self) -> Result<FieldMut<'a>, TreeError> {
        let id = self.tree.convert_to_sequence(self.id)?;
        Ok(FieldMut::new(self.tree, id))
    }
}

/// Write cursor over a section, handed to mappers building nested output.
pub struct SectionMut<'a> {
    tree: &'a mut Tree,
    id: FieldId,
}

impl SectionMut<'_> {
    pub(crate) fn new(tree: &mut Tree, id: FieldId) -> SectionMut<'_> {
        SectionMut { tree, id }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Sets a scalar entry.
    pub fn set(&mut self, key: &str, value: impl Into<Scalar>) {
        self.tree
            .section_set(self.id, key, FieldValue::Scalar(value.into()))
            .expect("section cursor points at a live section");
    }

    /// Gets or creates a nested section under `key`, replacing any child of
    /// another shape.
    pub fn section(&mut self, key: &str) -> SectionMut<'_> {
        let existing = self
            .tree
            .section_get(self.id, key)
            .filter(|c| self.tree.kind(*c) == Some(FieldKind::Section));
        let id = match existing {
            Some(id) => id,
            None => self
                .tree
                .section_set(self.id, key, FieldValue::section())
                .expect("section cursor points at a live section"),
        };
        SectionMut { tree: self.tree, id }
    }

    /// Gets or creates a nested sequence under `key`, replacing any child of
    /// another shape.
    pub fn sequence(&mut self, key: &str) -> SequenceMut<'_> {
        let existing = self
            .tree
            .section_get(self.id, key)
            .filter(|c| self.tree.kind(*c) == Some(FieldKind::Sequence));
        let id = match existing {
            Some(id) => id,
            None => self
                .tree
                .section_set(self.id, key, FieldValue::sequence())
                .expect("section cursor points at a live section"),
        };
        SequenceMut { tree: self.tree, id }
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.tree.section_remove(self.id, key)
    }

    pub fn clear(&mut self) {
        self.tree.clear(self.id);
    }

    pub fn len(&self) -> usize {
        self.tree.len(self.id).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write cursor over a sequence, handed to mappers building nested output.
pub struct SequenceMut<'a> {
    tree: &'a mut Tree,
    id: FieldId,
}

impl SequenceMut<'_> {
    pub(crate) fn new(tree: &mut Tree, id: FieldId) -> SequenceMut<'_> {
        SequenceMut { tree, id }
    }

    pub fn id(&self) -> FieldId {
        self.id
    }

    /// Appends a scalar item, returning its index.
    pub fn push(&mut self, value: impl Into<Scalar>) -> usize {
        self.tree
            .sequence_push(self.id, FieldValue::Scalar(value.into()))
            .expect("sequence cursor points at a live sequence");
        self.len() - 1
    }

    /// Appends a nested section.
    pub fn push_section(&mut self) -> SectionMut<'_> {
        let id = self
            .tree
            .sequence_push(self.id, FieldValue::section())
            .expect("sequence cursor points at a live sequence");
        SectionMut { tree: self.tree, id }
    }

    /// Appends a nested sequence.
    pub fn push_sequence(&mut self) -> SequenceMut<'_> {
        let id = self
            .tree
            .sequence_push(self.id, FieldValue::sequence())
            .expect("sequence cursor points at a live sequence");
        SequenceMut { tree: self.tree, id }
    }

    /// Sets the item at `index`, padding past-the-end gaps with empty
    /// scalars.
    pub fn set(&mut self, index: usize, value: impl Into<Scalar>) {
        self.tree
            .sequence_set(self.id, index, FieldValue::Scalar(value.into()))
            .expect("sequence cursor points at a live sequence");
    }

    pub fn clear(&mut self) {
        self.tree.clear(self.id);
    }

    pub fn len(&self) -> usize {
        self.tree.len(self.id).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
