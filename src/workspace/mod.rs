//! The workspace: on-disk installation state for every project.
//!
//! Each project installs into `<workspace>/<name>-<version>/`, with a
//! `.simenv/` admin subdirectory holding the state record and fingerprint
//! snapshots. Per-project state machine:
//!
//!   Absent ──(download + patch + mark_downloaded)──► Downloaded
//!   Absent ──(interrupted download)──► Incomplete
//!
//! `Incomplete` (directory present, no state record) is terminal: every
//! operation except `status` fails with a corrupt-installation error until
//! the user removes the directory. Drift detection and dependency-set
//! changes surface as [`Warning`] values, never as errors.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::catalog::ProjectDescriptor;
use crate::error::{Error, Result};

mod fingerprint;
mod state;

pub use fingerprint::{Fingerprint, SnapshotDiff};
pub use state::StateRecord;

/// Name of the admin subdirectory inside each project root.
pub const ADMIN_DIR: &str = ".simenv";
/// Snapshot taken once, right after download + patch.
pub const SNAPSHOT_POSTDOWNLOAD: &str = "postdownload";
/// Snapshot taken at the start of every session.
pub const SNAPSHOT_LAST: &str = "last";

/// How many example paths a drift warning lists before truncating.
const DRIFT_EXAMPLES: usize = 5;

/// Installation state of one project.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectState {
    /// No project directory.
    Absent,
    /// Directory exists but carries no state record — an interrupted
    /// installation.
    Incomplete,
    /// Downloaded and patched; state record present.
    Downloaded,
}

impl fmt::Display for ProjectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectState::Absent => "absent",
            ProjectState::Incomplete => "incomplete",
            ProjectState::Downloaded => "downloaded",
        };
        write!(f, "{}", s)
    }
}

/// An advisory condition. Warnings are reported and the session proceeds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Warning {
    /// Tracked files changed or disappeared since the postdownload snapshot.
    ModifiedSinceDownload {
        project: String,
        changed: Vec<String>,
        missing: Vec<String>,
    },
    /// The project was last launched with a different dependency set.
    RebuildRecommended {
        project: String,
        previous: Vec<String>,
        current: Vec<String>,
    },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::ModifiedSinceDownload {
                project,
                changed,
                missing,
            } => {
                let total = changed.len() + missing.len();
                let mut examples: Vec<&String> =
                    changed.iter().chain(missing.iter()).collect();
                examples.truncate(DRIFT_EXAMPLES);
                write!(
                    f,
                    "'{}' has {} file(s) modified since download: {}",
                    project,
                    total,
                    examples
                        .iter()
                        .map(|s| s.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )?;
                if total > DRIFT_EXAMPLES {
                    write!(f, " (and {} more)", total - DRIFT_EXAMPLES)?;
                }
                Ok(())
            }
            Warning::RebuildRecommended {
                project, previous, ..
            } => {
                write!(
                    f,
                    "'{}' was last started with a different dependency set ({}); \
                     a rebuild is recommended",
                    project,
                    previous.join(", ")
                )
            }
        }
    }
}

/// The on-disk root containing installed project directories.
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Open a workspace root, creating the directory if needed.
    pub fn open(root: &Path) -> Result<Workspace> {
        std::fs::create_dir_all(root)
            .map_err(|e| Error::io(format!("cannot create workspace '{}'", root.display()), e))?;
        Ok(Workspace {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The directory a descriptor installs into.
    pub fn project_dir(&self, descriptor: &ProjectDescriptor) -> PathBuf {
        self.root.join(descriptor.full_name())
    }

    fn admin_dir(&self, descriptor: &ProjectDescriptor) -> PathBuf {
        self.project_dir(descriptor).join(ADMIN_DIR)
    }

    fn state_path(&self, descriptor: &ProjectDescriptor) -> PathBuf {
        self.admin_dir(descriptor).join("state.txt")
    }

    fn snapshot_path(&self, descriptor: &ProjectDescriptor, label: &str) -> PathBuf {
        self.admin_dir(descriptor)
            .join(format!("fingerprint.{}.txt", label))
    }

    // ─── State machine ─────────────────────────────────────────

    pub fn status(&self, descriptor: &ProjectDescriptor) -> ProjectState {
        if !self.project_dir(descriptor).is_dir() {
            ProjectState::Absent
        } else if !self.state_path(descriptor).is_file() {
            ProjectState::Incomplete
        } else {
            ProjectState::Downloaded
        }
    }

    /// Fail unless the project is in the Downloaded state.
    fn check_downloaded(&self, descriptor: &ProjectDescriptor) -> Result<()> {
        match self.status(descriptor) {
            ProjectState::Downloaded => Ok(()),
            ProjectState::Incomplete => Err(Error::CorruptInstallation {
                name: descriptor.full_name(),
                dir: self.project_dir(descriptor).display().to_string(),
            }),
            ProjectState::Absent => Err(Error::Io {
                context: format!("project '{}' is not installed", descriptor.full_name()),
                detail: format!("no directory '{}'", self.project_dir(descriptor).display()),
            }),
        }
    }

    /// Transition a freshly downloaded + patched project to Downloaded:
    /// write the state record and take the one-time postdownload snapshot.
    pub fn mark_downloaded(&self, descriptor: &ProjectDescriptor) -> Result<()> {
        let admin = self.admin_dir(descriptor);
        std::fs::create_dir_all(&admin)
            .map_err(|e| Error::io(format!("cannot create '{}'", admin.display()), e))?;
        StateRecord::new(descriptor.full_name()).save(&self.state_path(descriptor))?;
        self.record_snapshot(descriptor, SNAPSHOT_POSTDOWNLOAD)?;
        Ok(())
    }

    /// Delete a project directory (cleanup after a failed download).
    pub fn remove_project(&self, descriptor: &ProjectDescriptor) -> Result<()> {
        let dir = self.project_dir(descriptor);
        if dir.is_dir() {
            std::fs::remove_dir_all(&dir)
                .map_err(|e| Error::io(format!("cannot remove '{}'", dir.display()), e))?;
        }
        Ok(())
    }

    // ─── Snapshots ─────────────────────────────────────────────

    /// Fingerprint the project directory and persist it under `label`.
    pub fn record_snapshot(
        &self,
        descriptor: &ProjectDescriptor,
        label: &str,
    ) -> Result<Fingerprint> {
        if label != SNAPSHOT_POSTDOWNLOAD {
            self.check_downloaded(descriptor)?;
        }
        let fp = Fingerprint::take(&self.project_dir(descriptor), ADMIN_DIR)?;
        fp.save(&self.snapshot_path(descriptor, label))?;
        Ok(fp)
    }

    /// Diff two persisted snapshots, older label first.
    pub fn diff_snapshots(
        &self,
        descriptor: &ProjectDescriptor,
        older: &str,
        newer: &str,
    ) -> Result<SnapshotDiff> {
        self.check_downloaded(descriptor)?;
        let a = Fingerprint::load(&self.snapshot_path(descriptor, older))?;
        let b = Fingerprint::load(&self.snapshot_path(descriptor, newer))?;
        Ok(a.diff(&b))
    }

    /// Take the session-start snapshot and compare it against the
    /// postdownload one. Changed or missing tracked files produce a
    /// warning; files added since download do not count.
    pub fn check_drift(&self, descriptor: &ProjectDescriptor) -> Result<Option<Warning>> {
        self.check_downloaded(descriptor)?;
        self.record_snapshot(descriptor, SNAPSHOT_LAST)?;
        let diff = self.diff_snapshots(descriptor, SNAPSHOT_POSTDOWNLOAD, SNAPSHOT_LAST)?;
        if diff.changed.is_empty() && diff.missing.is_empty() {
            return Ok(None);
        }
        Ok(Some(Warning::ModifiedSinceDownload {
            project: descriptor.full_name(),
            changed: diff.changed,
            missing: diff.missing,
        }))
    }

    // ─── Launch bookkeeping ────────────────────────────────────

    /// Record the dependency set this project is being launched with, and
    /// warn if it differs from the previous launch.
    pub fn update_last_started_with(
        &self,
        descriptor: &ProjectDescriptor,
        dep_names: &[String],
    ) -> Result<Option<Warning>> {
        self.check_downloaded(descriptor)?;
        let path = self.state_path(descriptor);
        let mut record = StateRecord::load(&path)?;
        // The comparison is over the set of dependencies, so normalize the
        // order before matching against what a previous launch recorded.
        let mut current = dep_names.to_vec();
        current.sort();
        let warning = match &record.last_started_with {
            Some(previous) if *previous != current => Some(Warning::RebuildRecommended {
                project: descriptor.full_name(),
                previous: previous.clone(),
                current: current.clone(),
            }),
            _ => None,
        };
        record.last_started_with = Some(current);
        record.save(&path)?;
        Ok(warning)
    }
}
