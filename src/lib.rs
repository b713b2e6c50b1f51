//! Path-addressed node tree.
//!
//! Nodes are created lazily while resolving separator-delimited paths. Only
//! leaves hold values, and every value change is delivered to the observers
//! of the leaf and of each ancestor below the root.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use pathtree::domain::NodeTree;
//!
//! let mut tree: NodeTree<bool> = NodeTree::new();
//! let kitchen = tree.resolve_or_create("light/kitchen").unwrap();
//! let light = tree.find("light").unwrap();
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = Rc::clone(&seen);
//! tree.subscribe(light, move |event| sink.borrow_mut().push(event.path.clone()))
//!     .unwrap();
//!
//! tree.set_value(kitchen, true).unwrap();
//! assert_eq!(*seen.borrow(), vec!["light/kitchen".to_string()]);
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
