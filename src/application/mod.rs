//! Application layer: registry, node handles and definitions
//!
//! This layer builds on the domain tree and knows nothing about files or the CLI.

pub mod definitions;
pub mod error;
pub mod handle;
pub mod registry;

pub use definitions::{Definitions, TypeInfo};
pub use error::{ApplicationError, ApplicationResult};
pub use handle::NodeRef;
pub use registry::Home;
