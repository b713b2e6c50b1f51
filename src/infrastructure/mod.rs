//! Infrastructure layer: file I/O around the application layer

pub mod definitions;
pub mod error;

pub use definitions::{load_definitions, load_home};
pub use error::{InfraError, InfraResult};
