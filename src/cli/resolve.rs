use std::process;

use simenv::{options, ProjectDescriptor, Registry};

use super::parse_refs;

pub fn cmd_resolve(
    registry: &Registry,
    refs: &[String],
    all: bool,
    option_names: &[String],
    with_defaults: bool,
) {
    let refs = parse_refs(refs);
    if all {
        let combos = match registry.resolve_all(&refs) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error: {}", e);
                process::exit(1);
            }
        };
        for (i, combo) in combos.iter().enumerate() {
            let combo = match options::activate_all(combo, option_names, with_defaults) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("error: {}", e);
                    process::exit(1);
                }
            };
            println!("{:>3}. {}", i + 1, render(&combo));
        }
        return;
    }

    let combo = registry
        .resolve(&refs)
        .and_then(|combo| options::activate_all(&combo, option_names, with_defaults));
    match combo {
        Ok(combo) => println!("{}", render(&combo)),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn render(combo: &[ProjectDescriptor]) -> String {
    combo
        .iter()
        .map(|d| d.full_name())
        .collect::<Vec<_>>()
        .join("  ")
}
