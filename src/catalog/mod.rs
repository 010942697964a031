//! The project catalog: descriptors for every known project version.
//!
//! Entries are kept in authoring order throughout — the first-listed
//! version of a name is the preferred (typically newest) one, and alias
//! computation and resolution both lean on that ordering.

use crate::error::Result;

pub mod descriptor;
mod parse;

pub use descriptor::{
    FieldOverride, ListOverride, OverrideValue, ProjectDescriptor, ProjectOption,
    ProjectReference,
};
pub use parse::{load_catalog, parse_catalog};

/// All known project descriptors, in catalog order.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub projects: Vec<ProjectDescriptor>,
}

/// The catalog shipped with the binary.
static BUILTIN_CATALOG: &str = include_str!("builtin.json");

impl Catalog {
    /// Load the embedded default catalog.
    pub fn builtin() -> Result<Catalog> {
        parse_catalog(BUILTIN_CATALOG)
    }
}
