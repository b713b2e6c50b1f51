//! Change events delivered to node observers.

use std::fmt;

/// Kinds of events a node can be observed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventKind {
    /// A leaf in the observed subtree received a value.
    ValueChanged,
}

/// Payload of a bubbled value change.
///
/// `path` is always the path of the leaf that changed, whichever node the
/// observer is attached to.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueChanged<V> {
    pub path: String,
    pub value: V,
}

impl<V: fmt::Display> fmt::Display for ValueChanged<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.path, self.value)
    }
}

/// Listener callback registered on a node.
pub type Observer<V> = Box<dyn FnMut(&ValueChanged<V>)>;
