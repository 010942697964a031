//! The install/launch workflow: resolve, order, then drive the workspace
//! state machine and the environment executor per project.

use std::collections::HashSet;

use crate::catalog::{ProjectDescriptor, ProjectReference};
use crate::error::{Error, Result};
use crate::exec::Executor;
use crate::options;
use crate::registry::{sort_by_dependency, Direction, Registry};
use crate::workspace::{ProjectState, Warning, Workspace};

/// Knobs for [`install`].
pub struct InstallOptions {
    /// Requested option names ("opt" or "project:opt").
    pub options: Vec<String>,
    /// Apply each project's default options too.
    pub with_defaults: bool,
    /// Keep a partially downloaded directory on failure instead of
    /// deleting it.
    pub keep_partial: bool,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            options: Vec::new(),
            with_defaults: true,
            keep_partial: false,
        }
    }
}

/// What an install run did, besides side effects on disk.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// The resolved set, dependencies first (the order projects were
    /// processed in).
    pub installed: Vec<String>,
    /// Advisory conditions encountered along the way.
    pub warnings: Vec<Warning>,
}

/// Resolve the requested references and bring every project in the set to
/// the Downloaded state, then build each in dependency order.
pub fn install(
    registry: &Registry,
    workspace: &Workspace,
    executor: &dyn Executor,
    refs: &[ProjectReference],
    opts: &InstallOptions,
) -> Result<InstallReport> {
    let combo = registry.resolve(refs)?;
    let combo = options::activate_all(&combo, &opts.options, opts.with_defaults)?;
    let ordered = sort_by_dependency(&combo, Direction::DependenciesFirst);

    let mut report = InstallReport::default();
    for descriptor in &ordered {
        match workspace.status(descriptor) {
            ProjectState::Incomplete => {
                return Err(Error::CorruptInstallation {
                    name: descriptor.full_name(),
                    dir: workspace.project_dir(descriptor).display().to_string(),
                });
            }
            ProjectState::Absent => {
                download(workspace, executor, descriptor, opts.keep_partial)?;
            }
            ProjectState::Downloaded => {
                if let Some(warning) = workspace.check_drift(descriptor)? {
                    report.warnings.push(warning);
                }
            }
        }

        let deps = transitive_deps(descriptor, &ordered);
        if let Some(warning) = workspace.update_last_started_with(descriptor, &deps)? {
            report.warnings.push(warning);
        }

        executor.run(
            &workspace.project_dir(descriptor),
            &command_env(descriptor),
            &descriptor.build_commands,
        )?;
        report.installed.push(descriptor.full_name());
    }
    Ok(report)
}

/// Absent → Downloaded: run the download and patch commands, then write the
/// state record and the postdownload snapshot. A failure tears down the
/// half-made directory (unless `keep_partial`) so the project does not
/// strand in the Incomplete state.
fn download(
    workspace: &Workspace,
    executor: &dyn Executor,
    descriptor: &ProjectDescriptor,
    keep_partial: bool,
) -> Result<()> {
    let dir = workspace.project_dir(descriptor);
    std::fs::create_dir_all(&dir)
        .map_err(|e| Error::io(format!("cannot create '{}'", dir.display()), e))?;

    let env = command_env(descriptor);
    let fetched = executor
        .run(&dir, &env, &descriptor.download_commands)
        .and_then(|_| executor.run(&dir, &env, &descriptor.patch_commands));
    if let Err(err) = fetched {
        if !keep_partial {
            workspace.remove_project(descriptor)?;
        }
        return Err(err);
    }
    workspace.mark_downloaded(descriptor)
}

fn command_env(descriptor: &ProjectDescriptor) -> Vec<(String, String)> {
    match &descriptor.download_url {
        Some(url) => vec![("DOWNLOAD_URL".to_string(), url.clone())],
        None => Vec::new(),
    }
}

/// Full names of the direct + transitive dependencies of `descriptor`
/// within the resolved set, sorted so the same set always yields the
/// same list regardless of how the resolver ordered it.
pub fn transitive_deps(descriptor: &ProjectDescriptor, set: &[ProjectDescriptor]) -> Vec<String> {
    let mut wanted: HashSet<&str> = HashSet::new();
    let mut queue: Vec<&str> = descriptor
        .required_projects
        .iter()
        .map(|(n, _)| n.as_str())
        .collect();
    while let Some(name) = queue.pop() {
        if !wanted.insert(name) {
            continue;
        }
        if let Some(dep) = set.iter().find(|d| d.name == name) {
            queue.extend(dep.required_projects.iter().map(|(n, _)| n.as_str()));
        }
    }
    let mut names: Vec<String> = set
        .iter()
        .filter(|d| wanted.contains(d.name.as_str()))
        .map(|d| d.full_name())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::parse_catalog;
    use crate::exec::testing::RecordingExecutor;

    const CATALOG: &str = r#"[
        {"name": "omnetpp", "version": "6.0",
         "download_commands": ["fetch omnetpp"],
         "build_commands": ["build omnetpp"]},
        {"name": "inet", "version": "4.2",
         "required_projects": {"omnetpp": ["6.0.*"]},
         "download_commands": ["fetch inet"],
         "patch_commands": ["patch inet"],
         "build_commands": ["build inet"]}
    ]"#;

    fn setup() -> (tempfile::TempDir, Registry, Workspace) {
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::build(parse_catalog(CATALOG).unwrap()).unwrap();
        let workspace = Workspace::open(tmp.path()).unwrap();
        (tmp, registry, workspace)
    }

    #[test]
    fn test_install_processes_dependencies_first() {
        let (_tmp, registry, workspace) = setup();
        let executor = RecordingExecutor::default();

        let report = install(
            &registry,
            &workspace,
            &executor,
            &[ProjectReference::parse("inet-4.2")],
            &InstallOptions::default(),
        )
        .unwrap();

        assert_eq!(report.installed, ["omnetpp-6.0", "inet-4.2"]);
        assert!(report.warnings.is_empty());
        assert_eq!(workspace.status(&ProjectDescriptor::new("inet", "4.2")),
                   ProjectState::Downloaded);

        let runs = executor.runs.borrow();
        let commands: Vec<&[String]> = runs.iter().map(|(_, c)| c.as_slice()).collect();
        assert_eq!(
            commands,
            [
                &["fetch omnetpp".to_string()] as &[String],
                &[],
                &["build omnetpp".to_string()],
                &["fetch inet".to_string()],
                &["patch inet".to_string()],
                &["build inet".to_string()],
            ]
        );
    }

    #[test]
    fn test_failed_download_removes_directory() {
        let (_tmp, registry, workspace) = setup();
        let executor = RecordingExecutor {
            fail_after: Some(0),
            ..Default::default()
        };

        let err = install(
            &registry,
            &workspace,
            &executor,
            &[ProjectReference::parse("omnetpp-6.0")],
            &InstallOptions::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("command failed"));
        assert_eq!(
            workspace.status(&ProjectDescriptor::new("omnetpp", "6.0")),
            ProjectState::Absent
        );
    }

    #[test]
    fn test_failed_download_kept_with_keep_partial() {
        let (_tmp, registry, workspace) = setup();
        let executor = RecordingExecutor {
            fail_after: Some(0),
            ..Default::default()
        };

        let opts = InstallOptions {
            keep_partial: true,
            ..Default::default()
        };
        install(
            &registry,
            &workspace,
            &executor,
            &[ProjectReference::parse("omnetpp-6.0")],
            &opts,
        )
        .unwrap_err();
        assert_eq!(
            workspace.status(&ProjectDescriptor::new("omnetpp", "6.0")),
            ProjectState::Incomplete
        );
    }

    #[test]
    fn test_reinstall_records_dependency_set() {
        let (_tmp, registry, workspace) = setup();
        let executor = RecordingExecutor::default();
        let refs = [ProjectReference::parse("inet-4.2")];

        install(&registry, &workspace, &executor, &refs, &InstallOptions::default()).unwrap();
        // Second run over an already-downloaded set: no drift, no rebuild
        // warning (same dependency set).
        let report =
            install(&registry, &workspace, &executor, &refs, &InstallOptions::default()).unwrap();
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_rephrased_install_does_not_warn() {
        // Same dependency set, requested with and without an explicit
        // member: the recorded launch config must compare equal.
        const CATALOG: &str = r#"[
            {"name": "base", "version": "1.0", "download_commands": ["fetch base"]},
            {"name": "extra", "version": "1.0", "download_commands": ["fetch extra"]},
            {"name": "app", "version": "1.0",
             "required_projects": {"base": ["1.0"], "extra": ["1.0"]},
             "download_commands": ["fetch app"]}
        ]"#;
        let tmp = tempfile::tempdir().unwrap();
        let registry = Registry::build(parse_catalog(CATALOG).unwrap()).unwrap();
        let workspace = Workspace::open(tmp.path()).unwrap();
        let executor = RecordingExecutor::default();

        install(
            &registry,
            &workspace,
            &executor,
            &[ProjectReference::parse("app-1.0")],
            &InstallOptions::default(),
        )
        .unwrap();
        let report = install(
            &registry,
            &workspace,
            &executor,
            &[
                ProjectReference::parse("app-1.0"),
                ProjectReference::parse("extra-1.0"),
            ],
            &InstallOptions::default(),
        )
        .unwrap();
        assert!(report.warnings.is_empty(), "warnings: {:?}", report.warnings);
    }

    #[test]
    fn test_transitive_deps_within_set() {
        let (_tmp, registry, _workspace) = setup();
        let combo = registry.resolve(&[ProjectReference::parse("inet-4.2")]).unwrap();
        let inet = combo.iter().find(|d| d.name == "inet").unwrap();
        assert_eq!(transitive_deps(inet, &combo), ["omnetpp-6.0"]);
        let omnetpp = combo.iter().find(|d| d.name == "omnetpp").unwrap();
        assert!(transitive_deps(omnetpp, &combo).is_empty());
    }
}
