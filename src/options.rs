//! Option activation.
//!
//! An option is a named bundle of field overrides a project supports.
//! Activation derives a *new* descriptor with the overrides applied; the
//! catalog-loaded base is never touched, so the same base can be activated
//! repeatedly with different option sets.

use std::collections::HashMap;

use crate::catalog::{ListOverride, OverrideValue, ProjectDescriptor};
use crate::error::{Error, Result};

/// A requested option name, optionally qualified as "project:option".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRequest {
    pub project: Option<String>,
    pub option: String,
}

impl OptionRequest {
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((project, option)) => Self {
                project: Some(project.to_string()),
                option: option.to_string(),
            },
            None => Self {
                project: None,
                option: s.to_string(),
            },
        }
    }

    /// True if this request applies to the given descriptor.
    fn targets(&self, descriptor: &ProjectDescriptor) -> bool {
        match &self.project {
            Some(p) => p == &descriptor.name && descriptor.option(&self.option).is_some(),
            None => descriptor.option(&self.option).is_some(),
        }
    }
}

/// Activate options across a set of candidate descriptors.
///
/// Every requested option must exist on at least one candidate (a qualified
/// "project:option" must exist on a candidate of exactly that name), else
/// [`Error::UnknownOption`]. With `with_defaults`, each descriptor's
/// `is_default` options join the active set wherever their category is not
/// already occupied by a requested option.
pub fn activate_all(
    descriptors: &[ProjectDescriptor],
    requested: &[String],
    with_defaults: bool,
) -> Result<Vec<ProjectDescriptor>> {
    let requests: Vec<OptionRequest> = requested.iter().map(|s| OptionRequest::parse(s)).collect();

    for req in &requests {
        if !descriptors.iter().any(|d| req.targets(d)) {
            return Err(Error::UnknownOption {
                option: match &req.project {
                    Some(p) => format!("{}:{}", p, req.option),
                    None => req.option.clone(),
                },
            });
        }
    }

    descriptors
        .iter()
        .map(|d| activate_one(d, &requests, with_defaults))
        .collect()
}

/// Activate options on a single descriptor (see [`activate_all`]).
pub fn activate(
    descriptor: &ProjectDescriptor,
    requested: &[String],
    with_defaults: bool,
) -> Result<ProjectDescriptor> {
    let activated = activate_all(std::slice::from_ref(descriptor), requested, with_defaults)?;
    Ok(activated.into_iter().next().unwrap_or_else(|| descriptor.clone()))
}

fn activate_one(
    descriptor: &ProjectDescriptor,
    requests: &[OptionRequest],
    with_defaults: bool,
) -> Result<ProjectDescriptor> {
    // Option name → active, plus category → owning option for exclusivity.
    let mut active: Vec<String> = Vec::new();
    let mut occupied: HashMap<String, String> = HashMap::new();

    for req in requests {
        if !req.targets(descriptor) {
            continue;
        }
        if active.iter().any(|a| a == &req.option) {
            continue;
        }
        let Some(opt) = descriptor.option(&req.option) else {
            continue;
        };
        if let Some(category) = &opt.category {
            if let Some(holder) = occupied.get(category) {
                return Err(Error::ConflictingOption {
                    option: opt.name.clone(),
                    conflicts_with: holder.clone(),
                    category: category.clone(),
                });
            }
            occupied.insert(category.clone(), opt.name.clone());
        }
        active.push(req.option.clone());
    }

    if with_defaults {
        for opt in &descriptor.options {
            if !opt.is_default || active.iter().any(|a| a == &opt.name) {
                continue;
            }
            match &opt.category {
                Some(category) if occupied.contains_key(category) => continue,
                Some(category) => {
                    occupied.insert(category.clone(), opt.name.clone());
                }
                None => {}
            }
            active.push(opt.name.clone());
        }
    }

    // Derive a fresh copy and splice the overrides in, in catalog order.
    let mut derived = descriptor.clone();
    for opt in &descriptor.options {
        if !active.iter().any(|a| a == &opt.name) {
            continue;
        }
        for over in &opt.overrides {
            match &over.value {
                OverrideValue::Scalar(s) => {
                    derived.set_scalar_field(&over.field, s);
                }
                OverrideValue::List(list) => {
                    if let Some(target) = derived.list_field_mut(&over.field) {
                        splice(target, list);
                    }
                }
            }
        }
    }
    Ok(derived)
}

fn splice(target: &mut Vec<String>, over: &ListOverride) {
    match over {
        ListOverride::Replace(items) => *target = items.clone(),
        ListOverride::Prepend(items) => {
            let mut merged = items.clone();
            merged.append(target);
            *target = merged;
        }
        ListOverride::Append(items) => target.extend(items.iter().cloned()),
    }
}
