//! The per-project state record, persisted as `key=value` lines inside the
//! admin subdirectory. Its presence is what distinguishes a downloaded
//! project from an interrupted installation.

use std::path::Path;

use crate::error::{Error, Result};

/// The small persisted record for one installed project.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateRecord {
    /// Full name ("inet-4.2.10") of the project this record belongs to.
    pub name: String,
    /// Full names of the direct + transitive dependencies the project was
    /// last launched with. `None` until the first launch.
    pub last_started_with: Option<Vec<String>>,
}

impl StateRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            last_started_with: None,
        }
    }

    pub fn load(path: &Path) -> Result<StateRecord> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("cannot read '{}'", path.display()), e))?;
        let mut record = StateRecord::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                match key.trim() {
                    "name" => record.name = value.trim().to_string(),
                    "last_started_with" => {
                        let deps: Vec<String> = value
                            .split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect();
                        record.last_started_with = Some(deps);
                    }
                    _ => {}
                }
            }
        }
        Ok(record)
    }

    /// Write-then-rename, so a crash never leaves a half-written record.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut out = format!("name={}\n", self.name);
        if let Some(deps) = &self.last_started_with {
            out.push_str(&format!("last_started_with={}\n", deps.join(",")));
        }
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, out)
            .map_err(|e| Error::io(format!("cannot write '{}'", tmp.display()), e))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| Error::io(format!("cannot replace '{}'", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("state.txt");

        let mut record = StateRecord::new("inet-4.2.10");
        record.save(&file).unwrap();
        assert_eq!(StateRecord::load(&file).unwrap(), record);

        record.last_started_with =
            Some(vec!["omnetpp-6.0.3".to_string(), "inet-4.5.2".to_string()]);
        record.save(&file).unwrap();
        assert_eq!(StateRecord::load(&file).unwrap(), record);
    }

    #[test]
    fn test_empty_dependency_list_survives() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("state.txt");

        let mut record = StateRecord::new("omnetpp-6.0.3");
        record.last_started_with = Some(Vec::new());
        record.save(&file).unwrap();
        assert_eq!(
            StateRecord::load(&file).unwrap().last_started_with,
            Some(Vec::new())
        );
    }
}
