//! Reading definition files from disk.

use std::fs;
use std::path::Path;

use tracing::{debug, instrument};

use crate::application::{Definitions, Home};
use crate::infrastructure::{InfraError, InfraResult};

/// Reads and parses a TOML definitions file.
#[instrument(level = "debug")]
pub fn load_definitions(path: &Path) -> InfraResult<Definitions> {
    let content = fs::read_to_string(path)
        .map_err(|e| InfraError::io(format!("read {}", path.display()), e))?;
    let definitions: Definitions = toml::from_str(&content).map_err(|e| InfraError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    debug!(
        types = definitions.types.len(),
        paths = definitions.paths.len(),
        values = definitions.values.len(),
        "definitions parsed"
    );
    Ok(definitions)
}

/// Builds a registry from a definitions file.
///
/// Returns the registry together with the paths skipped for lack of a
/// declared type.
#[instrument(level = "debug")]
pub fn load_home(path: &Path, separator: char) -> InfraResult<(Home, Vec<String>)> {
    let definitions = load_definitions(path)?;
    let mut home = Home::with_separator(separator);
    let skipped = home.load(&definitions)?;
    Ok((home, skipped))
}
