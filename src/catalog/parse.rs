//! Catalog loading and validation.
//!
//! A catalog file is a JSON array of project entries. Field order inside
//! `required_projects` and `options` is meaningful (catalog order encodes
//! the author's version preference), so parsing goes through
//! order-preserving maps and the result keeps `Vec`s, never sorted maps.

use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::error::{Error, Result};

use super::descriptor::{
    FieldOverride, ListOverride, OverrideValue, ProjectDescriptor, ProjectOption,
};
use super::Catalog;

// ─── Raw (wire) forms ──────────────────────────────────────────────

#[derive(Deserialize)]
struct RawEntry {
    name: String,
    version: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    required_projects: serde_json::Map<String, Value>,
    #[serde(default)]
    options: serde_json::Map<String, Value>,
    #[serde(default)]
    download_url: Option<String>,
    #[serde(default)]
    download_commands: Vec<String>,
    #[serde(default)]
    patch_commands: Vec<String>,
    #[serde(default)]
    build_commands: Vec<String>,
    #[serde(default)]
    clean_commands: Vec<String>,
    #[serde(default)]
    test_commands: Vec<String>,
    #[serde(default)]
    setenv_commands: Vec<String>,
}

#[derive(Deserialize)]
struct RawOption {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    default: bool,
    #[serde(default)]
    overrides: serde_json::Map<String, Value>,
}

// ─── Loading ───────────────────────────────────────────────────────

/// Parse and validate a catalog from JSON text.
pub fn parse_catalog(json: &str) -> Result<Catalog> {
    let raw: Vec<RawEntry> = serde_json::from_str(json).map_err(|e| Error::Catalog {
        detail: format!("malformed catalog JSON: {}", e),
    })?;

    let mut projects = Vec::with_capacity(raw.len());
    for entry in raw {
        let descriptor = validate_entry(entry)?;
        if projects
            .iter()
            .any(|d: &ProjectDescriptor| d.name == descriptor.name && d.version == descriptor.version)
        {
            return Err(Error::Catalog {
                detail: format!("duplicate catalog entry '{}'", descriptor.full_name()),
            });
        }
        projects.push(descriptor);
    }
    Ok(Catalog { projects })
}

/// Load a catalog from a file on disk.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::io(format!("cannot read catalog '{}'", path.display()), e))?;
    parse_catalog(&content)
}

fn validate_entry(raw: RawEntry) -> Result<ProjectDescriptor> {
    let key = format!("{}-{}", raw.name, raw.version);
    if raw.name.is_empty() || raw.version.is_empty() {
        return Err(Error::Catalog {
            detail: format!("entry '{}' is missing a name or version", key),
        });
    }

    let mut required_projects = Vec::with_capacity(raw.required_projects.len());
    for (dep_name, value) in raw.required_projects {
        let versions = string_list(&value).ok_or_else(|| Error::Catalog {
            detail: format!(
                "'{}': required_projects['{}'] must be a list of version strings",
                key, dep_name
            ),
        })?;
        if versions.is_empty() {
            return Err(Error::Catalog {
                detail: format!("'{}': required_projects['{}'] is empty", key, dep_name),
            });
        }
        required_projects.push((dep_name, versions));
    }

    let mut options = Vec::with_capacity(raw.options.len());
    for (opt_name, value) in raw.options {
        let raw_opt: RawOption =
            serde_json::from_value(value).map_err(|e| Error::Catalog {
                detail: format!("'{}': option '{}' is malformed: {}", key, opt_name, e),
            })?;
        options.push(validate_option(&key, opt_name, raw_opt)?);
    }

    let mut descriptor = ProjectDescriptor::new(raw.name, raw.version);
    descriptor.description = raw.description;
    descriptor.required_projects = required_projects;
    descriptor.options = options;
    descriptor.download_url = raw.download_url;
    descriptor.download_commands = raw.download_commands;
    descriptor.patch_commands = raw.patch_commands;
    descriptor.build_commands = raw.build_commands;
    descriptor.clean_commands = raw.clean_commands;
    descriptor.test_commands = raw.test_commands;
    descriptor.setenv_commands = raw.setenv_commands;
    Ok(descriptor)
}

fn validate_option(key: &str, name: String, raw: RawOption) -> Result<ProjectOption> {
    let mut overrides = Vec::with_capacity(raw.overrides.len());
    for (field, value) in raw.overrides {
        let value = match value {
            Value::String(s) => {
                if !ProjectDescriptor::is_override_field(&field, false) {
                    return Err(Error::Catalog {
                        detail: format!(
                            "'{}': option '{}' overrides unknown scalar field '{}'",
                            key, name, field
                        ),
                    });
                }
                OverrideValue::Scalar(s)
            }
            Value::Array(_) => {
                if !ProjectDescriptor::is_override_field(&field, true) {
                    return Err(Error::Catalog {
                        detail: format!(
                            "'{}': option '{}' overrides unknown list field '{}'",
                            key, name, field
                        ),
                    });
                }
                OverrideValue::List(tagged_list(key, &name, &field, &value)?)
            }
            _ => {
                return Err(Error::Catalog {
                    detail: format!(
                        "'{}': option '{}' field '{}' must be a string or a tagged list",
                        key, name, field
                    ),
                })
            }
        };
        overrides.push(FieldOverride { field, value });
    }
    Ok(ProjectOption {
        name,
        category: raw.category,
        is_default: raw.default,
        overrides,
    })
}

/// Parse a tagged override list. The first element selects the splice mode
/// and must be one of "@replace", "@prepend", "@append".
fn tagged_list(key: &str, opt: &str, field: &str, value: &Value) -> Result<ListOverride> {
    let items = string_list(value).ok_or_else(|| Error::Catalog {
        detail: format!(
            "'{}': option '{}' field '{}' must be a list of strings",
            key, opt, field
        ),
    })?;
    let (tag, rest) = match items.split_first() {
        Some((tag, rest)) => (tag.as_str(), rest.to_vec()),
        None => ("", Vec::new()),
    };
    match tag {
        "@replace" => Ok(ListOverride::Replace(rest)),
        "@prepend" => Ok(ListOverride::Prepend(rest)),
        "@append" => Ok(ListOverride::Append(rest)),
        _ => Err(Error::Catalog {
            detail: format!(
                "'{}': option '{}' field '{}' list must start with \
                 '@replace', '@prepend', or '@append'",
                key, opt, field
            ),
        }),
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let arr = value.as_array()?;
    arr.iter()
        .map(|v| v.as_str().map(|s| s.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_catalog() {
        let catalog = parse_catalog(
            r#"[
                {"name": "omnetpp", "version": "6.0"},
                {"name": "inet", "version": "4.2",
                 "required_projects": {"omnetpp": ["6.0.*"]}}
            ]"#,
        )
        .unwrap();
        assert_eq!(catalog.projects.len(), 2);
        assert_eq!(catalog.projects[1].requirement("omnetpp").unwrap(), ["6.0.*"]);
    }

    #[test]
    fn test_parse_options() {
        let catalog = parse_catalog(
            r#"[
                {"name": "inet", "version": "4.2",
                 "download_commands": ["fetch release"],
                 "options": {
                    "from-git": {"category": "download",
                                 "overrides": {"download_commands": ["@replace", "git clone"]}},
                    "from-release": {"category": "download", "default": true,
                                     "overrides": {"build_commands": ["@append", "make check"]}}
                 }}
            ]"#,
        )
        .unwrap();
        let inet = &catalog.projects[0];
        assert_eq!(inet.options.len(), 2);
        let from_git = inet.option("from-git").unwrap();
        assert_eq!(from_git.category.as_deref(), Some("download"));
        assert!(!from_git.is_default);
        assert_eq!(
            from_git.overrides[0].value,
            OverrideValue::List(ListOverride::Replace(vec!["git clone".to_string()]))
        );
        assert!(inet.option("from-release").unwrap().is_default);
    }

    #[test]
    fn test_untagged_override_list_rejected() {
        let err = parse_catalog(
            r#"[
                {"name": "inet", "version": "4.2",
                 "options": {"x": {"overrides": {"build_commands": ["make"]}}}}
            ]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Catalog { .. }));
        assert!(err.to_string().contains("@replace"));
    }

    #[test]
    fn test_duplicate_entry_rejected() {
        let err = parse_catalog(
            r#"[
                {"name": "omnetpp", "version": "6.0"},
                {"name": "omnetpp", "version": "6.0"}
            ]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_scalar_override_on_unknown_field_rejected() {
        let err = parse_catalog(
            r#"[
                {"name": "inet", "version": "4.2",
                 "options": {"x": {"overrides": {"version": "9.9"}}}}
            ]"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown scalar field"));
    }
}
