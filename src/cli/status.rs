use std::path::Path;
use std::process;

use simenv::workspace::ProjectState;
use simenv::{Registry, Workspace};

pub fn cmd_status(registry: &Registry, workspace_dir: &Path) {
    let workspace = match Workspace::open(workspace_dir) {
        Ok(w) => w,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    for name in registry.project_names() {
        let Ok(descriptors) = registry.versions_of(name) else {
            continue;
        };
        for descriptor in descriptors {
            let state = workspace.status(descriptor);
            if state == ProjectState::Absent {
                continue;
            }
            print!("{:<20} {}", descriptor.full_name(), state);
            if state == ProjectState::Downloaded {
                match workspace.check_drift(descriptor) {
                    Ok(Some(warning)) => print!("  ({})", warning),
                    Ok(None) => {}
                    Err(e) => print!("  (cannot check drift: {})", e),
                }
            }
            println!();
        }
    }
}
