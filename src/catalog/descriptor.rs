//! Project descriptors and references.
//!
//! A [`ProjectDescriptor`] is the fully-specified record for one version of
//! one project: its dependency constraints, its configuration options, and
//! the opaque command lists it carries for the environment executor.
//! Descriptors are constructed once at catalog-load time and never mutated
//! afterwards — option activation and wildcard expansion both *derive* new
//! values (wildcard expansion happens exactly once, at registry build).

use std::fmt;

// ─── Descriptor ────────────────────────────────────────────────────

/// One named, versioned project in the catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectDescriptor {
    pub name: String,
    /// Concrete version ("4.2.5") or branch-like token ("git", "master").
    /// Aliases ("latest", truncated prefixes) are index keys, never authored.
    pub version: String,
    pub description: Option<String>,
    /// Dependency name → acceptable version strings, in catalog order.
    /// Entries may carry trailing ".*" wildcards until the registry expands
    /// them into concrete lists.
    pub required_projects: Vec<(String, Vec<String>)>,
    /// Configuration options, in catalog order.
    pub options: Vec<ProjectOption>,
    pub download_url: Option<String>,
    // Opaque command lists, passed through unmodified to the executor.
    pub download_commands: Vec<String>,
    pub patch_commands: Vec<String>,
    pub build_commands: Vec<String>,
    pub clean_commands: Vec<String>,
    pub test_commands: Vec<String>,
    pub setenv_commands: Vec<String>,
}

impl ProjectDescriptor {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            description: None,
            required_projects: Vec::new(),
            options: Vec::new(),
            download_url: None,
            download_commands: Vec::new(),
            patch_commands: Vec::new(),
            build_commands: Vec::new(),
            clean_commands: Vec::new(),
            test_commands: Vec::new(),
            setenv_commands: Vec::new(),
        }
    }

    /// "name-version", the unique key and directory name for this project.
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Look up an option by name.
    pub fn option(&self, name: &str) -> Option<&ProjectOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// The version constraint list for a dependency name, if declared.
    pub fn requirement(&self, dep_name: &str) -> Option<&[String]> {
        self.required_projects
            .iter()
            .find(|(n, _)| n == dep_name)
            .map(|(_, versions)| versions.as_slice())
    }

    /// Mutable access to a list-valued field by its catalog name.
    pub(crate) fn list_field_mut(&mut self, field: &str) -> Option<&mut Vec<String>> {
        match field {
            "download_commands" => Some(&mut self.download_commands),
            "patch_commands" => Some(&mut self.patch_commands),
            "build_commands" => Some(&mut self.build_commands),
            "clean_commands" => Some(&mut self.clean_commands),
            "test_commands" => Some(&mut self.test_commands),
            "setenv_commands" => Some(&mut self.setenv_commands),
            _ => None,
        }
    }

    /// Overwrite a scalar field by its catalog name. Returns false for an
    /// unknown field.
    pub(crate) fn set_scalar_field(&mut self, field: &str, value: &str) -> bool {
        match field {
            "description" => self.description = Some(value.to_string()),
            "download_url" => self.download_url = Some(value.to_string()),
            _ => return false,
        }
        true
    }

    /// True if `field` names a field options may override.
    pub(crate) fn is_override_field(field: &str, as_list: bool) -> bool {
        if as_list {
            matches!(
                field,
                "download_commands"
                    | "patch_commands"
                    | "build_commands"
                    | "clean_commands"
                    | "test_commands"
                    | "setenv_commands"
            )
        } else {
            matches!(field, "description" | "download_url")
        }
    }
}

impl fmt::Display for ProjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

// ─── Options ───────────────────────────────────────────────────────

/// How a list-valued option override combines with the base field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListOverride {
    Replace(Vec<String>),
    Prepend(Vec<String>),
    Append(Vec<String>),
}

/// The value an option assigns to one field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverrideValue {
    Scalar(String),
    List(ListOverride),
}

/// One field override carried by an option.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldOverride {
    pub field: String,
    pub value: OverrideValue,
}

/// A named configuration option a project supports.
///
/// Options sharing a non-empty category are mutually exclusive: at most one
/// per category may be active in any activation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectOption {
    pub name: String,
    pub category: Option<String>,
    pub is_default: bool,
    pub overrides: Vec<FieldOverride>,
}

// ─── References ────────────────────────────────────────────────────

/// An unresolved (name, version-or-alias) request.
///
/// The version may be empty (any version), concrete, an alias ("latest",
/// "6.0"), or a branch-like token; it is never a wildcard pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProjectReference {
    pub name: String,
    pub version: Option<String>,
}

/// Version suffixes that are not numeric but still denote a version.
const BRANCH_TOKENS: &[&str] = &["git", "master", "latest"];

impl ProjectReference {
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Parse "name", "name-version", or "name@version".
    ///
    /// With '-' as the separator the split happens at the last dash whose
    /// suffix looks like a version (starts with a digit, or is a known
    /// branch-like token), so hyphenated project names survive.
    pub fn parse(s: &str) -> Self {
        if let Some((name, version)) = s.split_once('@') {
            return Self::new(name, Some(version.to_string()));
        }
        if let Some(idx) = s.rfind('-') {
            let (name, rest) = (&s[..idx], &s[idx + 1..]);
            let looks_like_version = rest
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_digit())
                || BRANCH_TOKENS.contains(&rest);
            if !name.is_empty() && looks_like_version {
                return Self::new(name, Some(rest.to_string()));
            }
        }
        Self::new(s, None)
    }
}

impl fmt::Display for ProjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(v) => write!(f, "{}-{}", self.name, v),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_parse_forms() {
        assert_eq!(
            ProjectReference::parse("inet-4.2"),
            ProjectReference::new("inet", Some("4.2".to_string()))
        );
        assert_eq!(
            ProjectReference::parse("inet@4.2.5"),
            ProjectReference::new("inet", Some("4.2.5".to_string()))
        );
        assert_eq!(
            ProjectReference::parse("omnetpp"),
            ProjectReference::new("omnetpp", None)
        );
        // Hyphenated names split only before a version-looking suffix.
        assert_eq!(
            ProjectReference::parse("simu5g-1.2.1"),
            ProjectReference::new("simu5g", Some("1.2.1".to_string()))
        );
        assert_eq!(
            ProjectReference::parse("veins-vlc"),
            ProjectReference::new("veins-vlc", None)
        );
        assert_eq!(
            ProjectReference::parse("omnetpp-git"),
            ProjectReference::new("omnetpp", Some("git".to_string()))
        );
    }

    #[test]
    fn test_descriptor_field_access() {
        let mut d = ProjectDescriptor::new("inet", "4.2.5");
        d.build_commands = vec!["make".to_string()];
        assert_eq!(d.full_name(), "inet-4.2.5");
        assert!(d.list_field_mut("build_commands").is_some());
        assert!(d.list_field_mut("name").is_none());
        assert!(d.set_scalar_field("description", "a model"));
        assert!(!d.set_scalar_field("version", "9.9"));
    }
}
