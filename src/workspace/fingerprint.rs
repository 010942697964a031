//! Content fingerprints: relative path → blake3 hash snapshots of a
//! project directory, persisted as one `path<TAB>hash` line per file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// A snapshot of every regular file under a project root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Fingerprint {
    /// Relative path (forward slashes) → hex content hash.
    pub files: BTreeMap<String, String>,
}

/// What changed between two fingerprints.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    /// Present only in the newer snapshot.
    pub new: Vec<String>,
    /// Present only in the older snapshot.
    pub missing: Vec<String>,
    /// Present in both with different hashes.
    pub changed: Vec<String>,
}

impl SnapshotDiff {
    pub fn is_clean(&self) -> bool {
        self.new.is_empty() && self.missing.is_empty() && self.changed.is_empty()
    }
}

impl Fingerprint {
    /// Walk `root` and hash every regular file, skipping `skip_dir` (the
    /// admin subdirectory) at the top level. Symlinks and other non-regular
    /// files are not tracked.
    pub fn take(root: &Path, skip_dir: &str) -> Result<Fingerprint> {
        let mut files = BTreeMap::new();
        walk(root, root, skip_dir, &mut files)?;
        Ok(Fingerprint { files })
    }

    /// Diff `self` (older) against `newer`.
    pub fn diff(&self, newer: &Fingerprint) -> SnapshotDiff {
        let mut diff = SnapshotDiff::default();
        for (path, hash) in &self.files {
            match newer.files.get(path) {
                None => diff.missing.push(path.clone()),
                Some(h) if h != hash => diff.changed.push(path.clone()),
                Some(_) => {}
            }
        }
        for path in newer.files.keys() {
            if !self.files.contains_key(path) {
                diff.new.push(path.clone());
            }
        }
        diff
    }

    // ─── Persistence ───────────────────────────────────────────

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        for (file, hash) in &self.files {
            out.push_str(file);
            out.push('\t');
            out.push_str(hash);
            out.push('\n');
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, out)
            .map_err(|e| Error::io(format!("cannot write '{}'", tmp.display()), e))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| Error::io(format!("cannot replace '{}'", path.display()), e))
    }

    pub fn load(path: &Path) -> Result<Fingerprint> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("cannot read '{}'", path.display()), e))?;
        let mut files = BTreeMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some((file, hash)) = line.split_once('\t') {
                files.insert(file.to_string(), hash.to_string());
            }
        }
        Ok(Fingerprint { files })
    }
}

fn walk(
    root: &Path,
    dir: &Path,
    skip_dir: &str,
    files: &mut BTreeMap<String, String>,
) -> Result<()> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| Error::io(format!("cannot list '{}'", dir.display()), e))?;
    for entry in entries {
        let entry = entry.map_err(|e| Error::io(format!("cannot list '{}'", dir.display()), e))?;
        let path = entry.path();
        let file_type = entry
            .file_type()
            .map_err(|e| Error::io(format!("cannot stat '{}'", path.display()), e))?;
        if file_type.is_dir() {
            if dir == root && entry.file_name() == skip_dir {
                continue;
            }
            walk(root, &path, skip_dir, files)?;
        } else if file_type.is_file() {
            let content = std::fs::read(&path)
                .map_err(|e| Error::io(format!("cannot read '{}'", path.display()), e))?;
            let hash = blake3::hash(&content).to_hex().to_string();
            files.insert(relative(root, &path), hash);
        }
    }
    Ok(())
}

fn relative(root: &Path, path: &Path) -> String {
    let rel: PathBuf = path.strip_prefix(root).unwrap_or(path).to_path_buf();
    rel.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_skips_admin_dir() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "alpha").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("sub/b.txt"), "beta").unwrap();
        std::fs::create_dir(tmp.path().join(".simenv")).unwrap();
        std::fs::write(tmp.path().join(".simenv/state.txt"), "x").unwrap();

        let fp = Fingerprint::take(tmp.path(), ".simenv").unwrap();
        let paths: Vec<&String> = fp.files.keys().collect();
        assert_eq!(paths, ["a.txt", "sub/b.txt"]);
    }

    #[test]
    fn test_diff_categories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("kept.txt"), "same").unwrap();
        std::fs::write(tmp.path().join("edited.txt"), "v1").unwrap();
        std::fs::write(tmp.path().join("removed.txt"), "gone").unwrap();
        let before = Fingerprint::take(tmp.path(), ".simenv").unwrap();

        std::fs::write(tmp.path().join("edited.txt"), "v2").unwrap();
        std::fs::remove_file(tmp.path().join("removed.txt")).unwrap();
        std::fs::write(tmp.path().join("added.txt"), "new").unwrap();
        let after = Fingerprint::take(tmp.path(), ".simenv").unwrap();

        let diff = before.diff(&after);
        assert_eq!(diff.changed, ["edited.txt"]);
        assert_eq!(diff.missing, ["removed.txt"]);
        assert_eq!(diff.new, ["added.txt"]);
        assert!(!diff.is_clean());
    }

    #[test]
    fn test_save_load_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("a.txt"), "alpha").unwrap();
        let fp = Fingerprint::take(tmp.path(), ".simenv").unwrap();

        let file = tmp.path().join("snapshot.txt");
        fp.save(&file).unwrap();
        assert_eq!(Fingerprint::load(&file).unwrap(), fp);
    }
}
