use simenv::Registry;

pub fn cmd_list(registry: &Registry) {
    for name in registry.project_names() {
        let versions: Vec<String> = registry
            .versions_of(name)
            .map(|ds| ds.iter().map(|d| d.version.clone()).collect())
            .unwrap_or_default();
        println!("{:<12} {}", name, versions.join(" "));
    }
}
