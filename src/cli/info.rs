use std::process;

use simenv::{ProjectReference, Registry};

pub fn cmd_info(registry: &Registry, project: &str) {
    let reference = ProjectReference::parse(project);
    let descriptor = match registry.lookup(&reference) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    println!("{}", descriptor.full_name());
    if let Some(description) = &descriptor.description {
        println!("  {}", description);
    }
    if !descriptor.required_projects.is_empty() {
        println!("  requires:");
        for (dep_name, versions) in &descriptor.required_projects {
            println!("    {}: {}", dep_name, versions.join(", "));
        }
    }
    if !descriptor.options.is_empty() {
        println!("  options:");
        for opt in &descriptor.options {
            let mut tags = Vec::new();
            if let Some(category) = &opt.category {
                tags.push(format!("category: {}", category));
            }
            if opt.is_default {
                tags.push("default".to_string());
            }
            if tags.is_empty() {
                println!("    {}", opt.name);
            } else {
                println!("    {} ({})", opt.name, tags.join(", "));
            }
        }
    }
}
