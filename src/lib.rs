pub mod catalog;
pub mod error;
pub mod exec;
pub mod options;
pub mod registry;
pub mod session;
pub mod version;
pub mod workspace;

// Re-exports — the common surface for the CLI and integration tests.
pub use catalog::{Catalog, ProjectDescriptor, ProjectReference};
pub use error::{Error, Result};
pub use registry::Registry;
pub use workspace::Workspace;
