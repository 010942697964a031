use std::path::Path;
use std::process;

use simenv::exec::ShellExecutor;
use simenv::session::{self, InstallOptions};
use simenv::{Registry, Workspace};

use super::parse_refs;

pub fn cmd_install(
    registry: &Registry,
    workspace_dir: &Path,
    refs: &[String],
    option_names: &[String],
    with_defaults: bool,
    keep_partial: bool,
) {
    let workspace = match Workspace::open(workspace_dir) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let opts = InstallOptions {
        options: option_names.to_vec(),
        with_defaults,
        keep_partial,
    };
    let report = session::install(
        registry,
        &workspace,
        &ShellExecutor,
        &parse_refs(refs),
        &opts,
    );
    match report {
        Ok(report) => {
            for warning in &report.warnings {
                eprintln!("warning: {}", warning);
            }
            println!("installed: {}", report.installed.join("  "));
        }
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}
