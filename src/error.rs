//! Error taxonomy for simenv.
//!
//! Every failure in the core is one of these variants, raised synchronously
//! to the caller with enough context to render a precise message. Drift and
//! staleness conditions are *not* errors — they surface as
//! [`crate::workspace::Warning`] values and never block the caller.

use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Project name not present in the registry.
    UnknownProject { name: String },
    /// Project name known, but the requested version is not.
    UnknownVersion { name: String, version: String },
    /// No mutually consistent combination of versions exists.
    UnsatisfiableDependency {
        requested: Vec<String>,
        /// The constraint that could not be met, if a single one stands out.
        detail: Option<String>,
    },
    /// A requested option does not exist on any candidate project.
    UnknownOption { option: String },
    /// Two active options share a category.
    ConflictingOption {
        option: String,
        conflicts_with: String,
        category: String,
    },
    /// A project directory exists but carries no state record.
    CorruptInstallation { name: String, dir: String },
    /// A version pattern uses wildcards in an unsupported position.
    InvalidPattern { pattern: String },
    /// The catalog file failed to load or validate.
    Catalog { detail: String },
    /// Filesystem failure in the workspace layer.
    Io { context: String, detail: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownProject { name } => {
                write!(f, "unknown project '{}'", name)
            }
            Error::UnknownVersion { name, version } => {
                write!(f, "project '{}' has no version '{}'", name, version)
            }
            Error::UnsatisfiableDependency { requested, detail } => {
                write!(
                    f,
                    "cannot find a consistent set of versions for: {}",
                    requested.join(", ")
                )?;
                if let Some(d) = detail {
                    write!(f, " ({})", d)?;
                }
                Ok(())
            }
            Error::UnknownOption { option } => {
                write!(f, "unknown option '{}'", option)
            }
            Error::ConflictingOption {
                option,
                conflicts_with,
                category,
            } => {
                write!(
                    f,
                    "option '{}' conflicts with '{}' (both in category '{}')",
                    option, conflicts_with, category
                )
            }
            Error::CorruptInstallation { name, dir } => {
                write!(
                    f,
                    "project '{}' at '{}' looks like an interrupted installation; \
                     remove the directory and install again",
                    name, dir
                )
            }
            Error::InvalidPattern { pattern } => {
                write!(
                    f,
                    "invalid version pattern '{}' (only a single trailing '.*' is supported)",
                    pattern
                )
            }
            Error::Catalog { detail } => {
                write!(f, "catalog error: {}", detail)
            }
            Error::Io { context, detail } => {
                write!(f, "{}: {}", context, detail)
            }
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Wrap an I/O error with a human-readable context string.
    pub fn io(context: impl Into<String>, err: std::io::Error) -> Self {
        Error::Io {
            context: context.into(),
            detail: err.to_string(),
        }
    }
}
