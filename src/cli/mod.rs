pub mod info;
pub mod install;
pub mod list;
pub mod resolve;
pub mod status;

use std::path::Path;
use std::process;

use simenv::catalog::{load_catalog, Catalog};
use simenv::{ProjectReference, Registry};

/// Load the catalog (built-in or from --catalog) and build the registry.
pub fn load_registry(catalog_path: Option<&Path>) -> Registry {
    let catalog = match catalog_path {
        Some(path) => load_catalog(path),
        None => Catalog::builtin(),
    };
    let catalog = match catalog {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };
    match Registry::build(catalog) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

/// Parse command-line project references.
pub fn parse_refs(refs: &[String]) -> Vec<ProjectReference> {
    refs.iter().map(|s| ProjectReference::parse(s)).collect()
}
