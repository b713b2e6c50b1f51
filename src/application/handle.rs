//! Borrowed handle exposing a single resolved node to callers.

use crate::domain::{DomainResult, NodeId, NodeTree, ValueChanged};

/// Handle on one node of a tree.
///
/// Holds the tree mutably for its lifetime, so callers cannot interleave
/// structural changes with a live handle.
#[derive(Debug)]
pub struct NodeRef<'a, V> {
    tree: &'a mut NodeTree<V>,
    id: NodeId,
}

impl<'a, V> NodeRef<'a, V> {
    pub(crate) fn new(tree: &'a mut NodeTree<V>, id: NodeId) -> Self {
        Self { tree, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn path(&self) -> String {
        self.tree.path(self.id)
    }

    pub fn value(&self) -> Option<&V> {
        self.tree.value(self.id)
    }

    pub fn is_leaf(&self) -> bool {
        self.tree.is_leaf(self.id)
    }

    /// Names of the direct children, in creation order.
    pub fn children(&self) -> Vec<String> {
        self.tree
            .get_node(self.id)
            .map(|node| {
                node.children()
                    .iter()
                    .filter_map(|&c| self.tree.get_node(c))
                    .map(|c| c.name().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn set_value(&mut self, value: V) -> DomainResult<()>
    where
        V: Clone,
    {
        self.tree.set_value(self.id, value)
    }

    pub fn subscribe<F>(&mut self, listener: F) -> DomainResult<()>
    where
        F: FnMut(&ValueChanged<V>) + 'static,
    {
        self.tree.subscribe(self.id, listener)
    }
}
