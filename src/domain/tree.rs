use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use generational_arena::{Arena, Index};
use tracing::{debug, instrument, trace};

use super::error::{DomainError, DomainResult};
use super::event::{EventKind, Observer, ValueChanged};
use super::path::{self, DEFAULT_SEPARATOR};

static NEXT_TREE_ID: AtomicU64 = AtomicU64::new(0);

/// Stable handle of a node inside its [`NodeTree`].
///
/// Carries the id of the issuing tree, so a handle from another tree never
/// aliases a local node that happens to share its arena slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u64,
    index: Index,
}

/// Tree node in the arena-based hierarchy.
///
/// A node with no children is a leaf and may hold a value; a node with
/// children is a container and never does.
pub struct TreeNode<V> {
    /// Segment name, unique among siblings
    name: String,
    /// Index of parent node in the arena, None for the root
    parent: Option<NodeId>,
    /// Indices of child nodes, in creation order
    children: Vec<NodeId>,
    value: Option<V>,
    observers: BTreeMap<EventKind, Vec<Observer<V>>>,
}

impl<V> TreeNode<V> {
    fn new(name: String, parent: Option<NodeId>) -> Self {
        Self {
            name,
            parent,
            children: Vec::new(),
            value: None,
            observers: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.values().map(Vec::len).sum()
    }

    fn notify(&mut self, kind: EventKind, event: &ValueChanged<V>) {
        if let Some(listeners) = self.observers.get_mut(&kind) {
            for listener in listeners.iter_mut() {
                listener(event);
            }
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for TreeNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeNode")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("children", &self.children)
            .field("value", &self.value)
            .field("observers", &self.observer_count())
            .finish()
    }
}

/// Arena-based, path-addressed node tree.
///
/// Ownership flows from the arena only; parent and child links are indices,
/// so there are no reference cycles. Nodes are never removed, which keeps
/// every [`NodeId`] handed out by a tree valid for the tree's lifetime.
#[derive(Debug)]
pub struct NodeTree<V> {
    id: u64,
    arena: Arena<TreeNode<V>>,
    root: NodeId,
    separator: char,
}

impl<V> Default for NodeTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> NodeTree<V> {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        let id = NEXT_TREE_ID.fetch_add(1, Ordering::Relaxed);
        let mut arena = Arena::new();
        let root = NodeId {
            tree: id,
            index: arena.insert(TreeNode::new(String::new(), None)),
        };
        Self {
            id,
            arena,
            root,
            separator,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    #[instrument(level = "trace", skip(self))]
    pub fn get_node(&self, idx: NodeId) -> Option<&TreeNode<V>> {
        if idx.tree != self.id {
            return None;
        }
        self.arena.get(idx.index)
    }

    fn get_node_mut(&mut self, idx: NodeId) -> Option<&mut TreeNode<V>> {
        if idx.tree != self.id {
            return None;
        }
        self.arena.get_mut(idx.index)
    }

    /// Number of nodes, root included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn value(&self, idx: NodeId) -> Option<&V> {
        self.get_node(idx).and_then(TreeNode::value)
    }

    pub fn is_leaf(&self, idx: NodeId) -> bool {
        self.get_node(idx).is_some_and(TreeNode::is_leaf)
    }

    /// Child of `parent` named exactly `name`.
    pub fn child(&self, parent: NodeId, name: &str) -> Option<NodeId> {
        self.get_node(parent)?
            .children
            .iter()
            .copied()
            .find(|&c| self.get_node(c).is_some_and(|n| n.name == name))
    }

    /// Full path of a node: segment names from the root (exclusive) joined
    /// with the separator. The root's path is empty.
    #[instrument(level = "trace", skip(self))]
    pub fn path(&self, idx: NodeId) -> String {
        let mut names: Vec<&str> = Vec::new();
        let mut current = idx;
        while let Some(node) = self.get_node(current) {
            let Some(parent) = node.parent else {
                break;
            };
            names.push(&node.name);
            current = parent;
        }
        names.reverse();
        path::join(names, self.separator)
    }

    /// Appends a new childless node under `parent`.
    ///
    /// Fails if `parent` holds a value or already has a child with this name.
    #[instrument(level = "debug", skip(self))]
    pub fn add_child(&mut self, parent: NodeId, name: &str) -> DomainResult<NodeId> {
        let parent_node = self.get_node(parent).ok_or_else(|| foreign(parent))?;
        if parent_node.value.is_some() {
            return Err(DomainError::invalid_operation(
                self.path(parent),
                "cannot add a child to a leaf holding a value",
            ));
        }
        if self.child(parent, name).is_some() {
            return Err(DomainError::invalid_operation(
                self.path(parent),
                format!("child '{name}' already exists"),
            ));
        }

        let node_idx = NodeId {
            tree: self.id,
            index: self
                .arena
                .insert(TreeNode::new(name.to_string(), Some(parent))),
        };
        if let Some(parent) = self.get_node_mut(parent) {
            parent.children.push(node_idx);
        }
        trace!(name, "node created");
        Ok(node_idx)
    }

    /// Resolves `path` from the root.
    ///
    /// A miss returns `Ok(None)` when `create` is false and leaves the tree
    /// untouched; otherwise missing segments are created on the way down.
    pub fn resolve(&mut self, path: &str, create: bool) -> DomainResult<Option<NodeId>> {
        self.resolve_from(self.root, path, create)
    }

    #[instrument(level = "debug", skip(self))]
    pub fn resolve_from(
        &mut self,
        start: NodeId,
        path: &str,
        create: bool,
    ) -> DomainResult<Option<NodeId>> {
        if create {
            self.create_from(start, path).map(Some)
        } else {
            Ok(self.find_from(start, path))
        }
    }

    /// Resolves `path` from the root, creating missing nodes.
    pub fn resolve_or_create(&mut self, path: &str) -> DomainResult<NodeId> {
        self.create_from(self.root, path)
    }

    /// Non-creating lookup from the root.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.find_from(self.root, path)
    }

    #[instrument(level = "trace", skip(self))]
    pub fn find_from(&self, start: NodeId, path: &str) -> Option<NodeId> {
        self.get_node(start)?;
        path::split(path, self.separator).try_fold(start, |current, segment| {
            self.child(current, segment)
        })
    }

    // Only the first missing segment can fail: every node created after it
    // is fresh, so a failed call never leaves partial structure behind.
    fn create_from(&mut self, start: NodeId, path: &str) -> DomainResult<NodeId> {
        if self.get_node(start).is_none() {
            return Err(foreign(start));
        }
        let mut current = start;
        for segment in path::split(path, self.separator) {
            current = match self.child(current, segment) {
                Some(child) => child,
                None => self.add_child(current, segment)?,
            };
        }
        Ok(current)
    }

    /// Stores `value` on a leaf and bubbles the change.
    ///
    /// The node's own observers run first, then each strict ancestor's,
    /// nearest first, stopping before the root. Every observer receives the
    /// leaf's path and value.
    #[instrument(level = "debug", skip(self, value))]
    pub fn set_value(&mut self, idx: NodeId, value: V) -> DomainResult<()>
    where
        V: Clone,
    {
        let node = self.get_node(idx).ok_or_else(|| foreign(idx))?;
        if !node.is_leaf() {
            return Err(DomainError::invalid_operation(
                self.path(idx),
                "value can only be set on a leaf",
            ));
        }
        let targets: Vec<NodeId> = if node.is_root() {
            Vec::new()
        } else {
            std::iter::once(idx)
                .chain(self.ancestors(idx).map(|(i, _)| i))
                .collect()
        };
        let path = self.path(idx);

        if let Some(node) = self.get_node_mut(idx) {
            node.value = Some(value.clone());
        }

        let event = ValueChanged { path, value };
        debug!(path = %event.path, nodes = targets.len(), "bubbling value change");
        for target in targets {
            if let Some(node) = self.get_node_mut(target) {
                node.notify(EventKind::ValueChanged, &event);
            }
        }
        Ok(())
    }

    /// Registers a listener for `kind` on a node.
    #[instrument(level = "debug", skip(self, listener))]
    pub fn on<F>(&mut self, idx: NodeId, kind: EventKind, listener: F) -> DomainResult<()>
    where
        F: FnMut(&ValueChanged<V>) + 'static,
    {
        let node = self.get_node_mut(idx).ok_or_else(|| foreign(idx))?;
        node.observers
            .entry(kind)
            .or_default()
            .push(Box::new(listener));
        Ok(())
    }

    /// Registers a value-change listener on a node.
    pub fn subscribe<F>(&mut self, idx: NodeId, listener: F) -> DomainResult<()>
    where
        F: FnMut(&ValueChanged<V>) + 'static,
    {
        self.on(idx, EventKind::ValueChanged, listener)
    }

    /// Pre-order depth-first iterator starting at (and including) `idx`.
    pub fn descendants(&self, idx: NodeId) -> Descendants<'_, V> {
        Descendants::new(self, idx)
    }

    /// Strict ancestors of `idx`, nearest first, root excluded.
    pub fn ancestors(&self, idx: NodeId) -> Ancestors<'_, V> {
        Ancestors::new(self, idx)
    }

    /// Childless nodes under (and including) `idx`, in pre-order.
    pub fn leaves(&self, idx: NodeId) -> impl Iterator<Item = (NodeId, &TreeNode<V>)> {
        self.descendants(idx).filter(|(_, node)| node.is_leaf())
    }

    pub fn visit_descendants<F>(&self, idx: NodeId, mut callback: F)
    where
        F: FnMut(NodeId, &TreeNode<V>),
    {
        for (i, node) in self.descendants(idx) {
            callback(i, node);
        }
    }

    pub fn visit_ancestors<F>(&self, idx: NodeId, mut callback: F)
    where
        F: FnMut(NodeId, &TreeNode<V>),
    {
        for (i, node) in self.ancestors(idx) {
            callback(i, node);
        }
    }

    pub fn visit_leaves<F>(&self, idx: NodeId, mut callback: F)
    where
        F: FnMut(NodeId, &TreeNode<V>),
    {
        for (i, node) in self.leaves(idx) {
            callback(i, node);
        }
    }

    /// Number of levels below the root; a tree with only a root has depth 0.
    #[instrument(level = "debug", skip(self))]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self.root, 0)];
        while let Some((idx, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Some(node) = self.get_node(idx) {
                stack.extend(node.children.iter().map(|&child| (child, level + 1)));
            }
        }
        deepest
    }

    /// Paths of all leaves below the root. A bare root yields nothing.
    #[instrument(level = "debug", skip(self))]
    pub fn leaf_paths(&self) -> Vec<String> {
        self.leaves(self.root)
            .filter(|(_, node)| !node.is_root())
            .map(|(i, _)| self.path(i))
            .collect()
    }
}

fn foreign(idx: NodeId) -> DomainError {
    DomainError::invalid_operation(format!("{idx:?}"), "node does not belong to this tree")
}

pub struct Descendants<'a, V> {
    tree: &'a NodeTree<V>,
    stack: Vec<NodeId>,
}

impl<'a, V> Descendants<'a, V> {
    fn new(tree: &'a NodeTree<V>, start: NodeId) -> Self {
        let mut stack = Vec::new();
        if tree.get_node(start).is_some() {
            stack.push(start);
        }
        Self { tree, stack }
    }
}

impl<'a, V> Iterator for Descendants<'a, V> {
    type Item = (NodeId, &'a TreeNode<V>);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.tree.get_node(current_idx) {
                // Push children in reverse order for left-to-right traversal
                for &child in node.children.iter().rev() {
                    self.stack.push(child);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct Ancestors<'a, V> {
    tree: &'a NodeTree<V>,
    next: Option<NodeId>,
}

impl<'a, V> Ancestors<'a, V> {
    fn new(tree: &'a NodeTree<V>, start: NodeId) -> Self {
        let next = tree.get_node(start).and_then(TreeNode::parent);
        Self { tree, next }
    }
}

impl<'a, V> Iterator for Ancestors<'a, V> {
    type Item = (NodeId, &'a TreeNode<V>);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.next?;
        let node = self.tree.get_node(current_idx)?;
        if node.is_root() {
            self.next = None;
            return None;
        }
        self.next = node.parent;
        Some((current_idx, node))
    }
}
