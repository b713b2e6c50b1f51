//! Type registry owning the node tree.
//!
//! Only paths whose leading segment names a declared type are materialized.
//! The registry is an ordinary owned value; callers construct one and pass
//! it where it is needed.

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::application::definitions::{Definitions, TypeInfo};
use crate::application::handle::NodeRef;
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{path, NodeTree, Value, DEFAULT_SEPARATOR};

#[derive(Debug)]
pub struct Home {
    tree: NodeTree<Value>,
    types: BTreeMap<String, TypeInfo>,
}

impl Default for Home {
    fn default() -> Self {
        Self::new()
    }
}

impl Home {
    pub fn new() -> Self {
        Self::with_separator(DEFAULT_SEPARATOR)
    }

    pub fn with_separator(separator: char) -> Self {
        Self {
            tree: NodeTree::with_separator(separator),
            types: BTreeMap::new(),
        }
    }

    /// Declares a type, replacing any earlier declaration of the same name.
    #[instrument(level = "debug", skip(self, info))]
    pub fn deftype(&mut self, name: &str, info: TypeInfo) {
        if self.types.insert(name.to_string(), info).is_some() {
            debug!(name, "type redeclared");
        }
    }

    pub fn types(&self) -> &BTreeMap<String, TypeInfo> {
        &self.types
    }

    pub fn tree(&self) -> &NodeTree<Value> {
        &self.tree
    }

    /// Materializes each path whose type is declared.
    ///
    /// Paths with an undeclared leading segment are logged and returned as
    /// skipped; they do not abort the remaining definitions.
    #[instrument(level = "debug", skip(self, paths))]
    pub fn define<I, S>(&mut self, paths: I) -> ApplicationResult<Vec<String>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut skipped = Vec::new();
        for entry in paths {
            let entry = entry.as_ref();
            let type_name = path::head(entry, self.tree.separator());
            if self.types.contains_key(type_name) {
                self.tree.resolve_or_create(entry)?;
                debug!(path = entry, "defined");
            } else {
                warn!(path = entry, type_name, "unknown type, skipping definition");
                skipped.push(entry.to_string());
            }
        }
        Ok(skipped)
    }

    /// Handle on an existing node; never creates.
    pub fn get(&mut self, path: &str) -> Option<NodeRef<'_, Value>> {
        let id = self.tree.find(path)?;
        Some(NodeRef::new(&mut self.tree, id))
    }

    /// Applies a definitions document: types, then paths, then values.
    ///
    /// Returns the paths skipped for lack of a declared type.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&mut self, definitions: &Definitions) -> ApplicationResult<Vec<String>> {
        for (name, info) in &definitions.types {
            self.deftype(name, info.clone());
        }
        let skipped = self.define(&definitions.paths)?;
        for (path, value) in &definitions.values {
            let mut node = self
                .get(path)
                .ok_or_else(|| ApplicationError::UndefinedPath(path.clone()))?;
            node.set_value(value.clone())?;
        }
        debug!(
            types = self.types.len(),
            nodes = self.tree.node_count(),
            "definitions loaded"
        );
        Ok(skipped)
    }
}
