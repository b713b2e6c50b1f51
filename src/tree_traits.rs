use std::fmt::Display;

use termtree::Tree;
use tracing::instrument;

use crate::domain::{NodeId, NodeTree};

/// Levels rendered below the root; `termtree` renders and drops recursively.
pub const MAX_RENDER_DEPTH: usize = 64;

/// Marker pushed in place of the children of a node at the depth limit.
pub const TRUNCATED: &str = "...";

/// Rendering of node trees as `termtree` trees.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl<V: Display> TreeNodeConvert for NodeTree<V> {
    #[instrument(level = "debug", skip(self))]
    fn to_tree_string(&self) -> Tree<String> {
        fn label<V: Display>(tree: &NodeTree<V>, idx: NodeId) -> String {
            match tree.get_node(idx) {
                Some(node) if node.is_root() => ".".to_string(),
                Some(node) => match node.value() {
                    Some(value) => format!("{} = {}", node.name(), value),
                    None => node.name().to_string(),
                },
                None => String::new(),
            }
        }

        fn build_tree<V: Display>(
            tree: &NodeTree<V>,
            node_idx: NodeId,
            parent: &mut Tree<String>,
            level: usize,
        ) {
            let Some(node) = tree.get_node(node_idx) else {
                return;
            };
            if level == MAX_RENDER_DEPTH {
                if !node.is_leaf() {
                    parent.push(Tree::new(TRUNCATED.to_string()));
                }
                return;
            }
            for &child_idx in node.children() {
                let mut child_tree = Tree::new(label(tree, child_idx));
                build_tree(tree, child_idx, &mut child_tree, level + 1);
                parent.push(child_tree);
            }
        }

        let root = self.root();
        let mut rendered = Tree::new(label(self, root));
        build_tree(self, root, &mut rendered, 0);
        rendered
    }
}
