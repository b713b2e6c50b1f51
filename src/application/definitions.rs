//! Definitions document: declared types, paths to materialize, initial values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::Value;

/// Metadata attached to a declared type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeInfo {
    pub description: Option<String>,
}

impl TypeInfo {
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }
}

/// Everything needed to populate a registry.
///
/// ```toml
/// paths = ["light/kitchen", "light/hall"]
///
/// [types.light]
/// description = "Light switches"
///
/// [values]
/// "light/kitchen" = true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Definitions {
    pub paths: Vec<String>,
    pub types: BTreeMap<String, TypeInfo>,
    pub values: BTreeMap<String, Value>,
}
