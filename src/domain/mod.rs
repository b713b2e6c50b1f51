//! Domain layer: the node tree engine and its value type
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod error;
pub mod event;
pub mod path;
pub mod tree;
pub mod value;

pub use error::{DomainError, DomainResult};
pub use event::{EventKind, Observer, ValueChanged};
pub use path::DEFAULT_SEPARATOR;
pub use tree::{Ancestors, Descendants, NodeId, NodeTree, TreeNode};
pub use value::Value;
