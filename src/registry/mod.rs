//! The project registry: the name→version→descriptor index and the
//! combinatorial dependency resolver.
//!
//! The registry is an explicit value built once from a [`Catalog`] and
//! passed by reference to every resolution call; there is no ambient global
//! state. Build time does three things, in order:
//!
//!   1. register every descriptor under name + version,
//!   2. compute alias entries ("latest", and truncated prefixes of
//!      well-formed numeric versions), first-listed version wins,
//!   3. expand every trailing-".*" wildcard in every descriptor's
//!      `required_projects` into the concrete version list of the named
//!      dependency.
//!
//! Step 3 is the only post-construction mutation a descriptor ever sees,
//! and it happens exactly once. Aliases assume the catalog lists versions
//! newest-first; if it ever does not, "latest" follows the authoring order,
//! not chronology.
//!
//! Resolution is a deliberate brute-force generate-and-test over the
//! catalog-bounded version space. The enumeration order — earlier-listed
//! versions of the *requested* names tried first — is an observable
//! contract: it encodes "prefer the newest mutually compatible set", so no
//! pruning that changes which combination is found first is allowed.

use std::collections::{HashMap, HashSet};

use crate::catalog::{Catalog, ProjectDescriptor, ProjectReference};
use crate::error::{Error, Result};
use crate::version::{is_wildcard, matches_wildcard};

mod order;

pub use order::{sort_by_dependency, Direction};

#[derive(Debug)]
pub struct Registry {
    /// All descriptors in catalog order, fully wildcard-expanded.
    projects: Vec<ProjectDescriptor>,
    /// Project names in first-appearance order.
    names: Vec<String>,
    /// name → indices into `projects`, in catalog order.
    by_name: HashMap<String, Vec<usize>>,
    /// name → version-or-alias → index into `projects`.
    index: HashMap<String, HashMap<String, usize>>,
}

impl Registry {
    // ─── Build ─────────────────────────────────────────────────

    pub fn build(catalog: Catalog) -> Result<Registry> {
        let mut registry = Registry {
            projects: catalog.projects,
            names: Vec::new(),
            by_name: HashMap::new(),
            index: HashMap::new(),
        };

        // 1. Concrete name+version entries.
        for (i, d) in registry.projects.iter().enumerate() {
            let versions = registry.index.entry(d.name.clone()).or_default();
            if versions.insert(d.version.clone(), i).is_some() {
                return Err(Error::Catalog {
                    detail: format!("duplicate catalog entry '{}'", d.full_name()),
                });
            }
            let per_name = registry.by_name.entry(d.name.clone()).or_default();
            if per_name.is_empty() {
                registry.names.push(d.name.clone());
            }
            per_name.push(i);
        }

        // 2. Alias entries. First-listed (catalog-order) match wins; an
        // alias key always differs from its target's own version.
        for name in &registry.names {
            let indices = &registry.by_name[name];
            let Some(versions) = registry.index.get_mut(name) else {
                continue;
            };
            versions.entry("latest".to_string()).or_insert(indices[0]);
            for &i in indices {
                let version = registry.projects[i].version.clone();
                for prefix in numeric_prefixes(&version) {
                    versions.entry(prefix).or_insert(i);
                }
            }
        }

        // 3. Wildcard expansion, exactly once per descriptor.
        let expanded: Vec<Vec<(String, Vec<String>)>> = registry
            .projects
            .iter()
            .map(|d| registry.expand_requirements(d))
            .collect::<Result<_>>()?;
        for (d, required) in registry.projects.iter_mut().zip(expanded) {
            d.required_projects = required;
        }

        Ok(registry)
    }

    /// Expand one descriptor's constraints against the concrete version
    /// lists of its dependencies. Idempotent: concrete entries that exist
    /// pass through unchanged, and expansion output contains no wildcards.
    fn expand_requirements(
        &self,
        descriptor: &ProjectDescriptor,
    ) -> Result<Vec<(String, Vec<String>)>> {
        let mut out = Vec::with_capacity(descriptor.required_projects.len());
        for (dep_name, patterns) in &descriptor.required_projects {
            let dep_indices = self.by_name.get(dep_name).ok_or_else(|| Error::Catalog {
                detail: format!(
                    "'{}' requires unknown project '{}'",
                    descriptor.full_name(),
                    dep_name
                ),
            })?;
            let mut versions: Vec<String> = Vec::new();
            for pattern in patterns {
                if is_wildcard(pattern) {
                    for &i in dep_indices {
                        let candidate = &self.projects[i].version;
                        if matches_wildcard(pattern, candidate)?
                            && !versions.contains(candidate)
                        {
                            versions.push(candidate.clone());
                        }
                    }
                } else if pattern.contains('*') || pattern.contains('?') {
                    return Err(Error::InvalidPattern {
                        pattern: pattern.clone(),
                    });
                } else if dep_indices
                    .iter()
                    .any(|&i| self.projects[i].version == *pattern)
                    && !versions.contains(pattern)
                {
                    // A concrete version, kept only if a descriptor actually
                    // carries it. Aliases like "6.0" never qualify here.
                    versions.push(pattern.clone());
                }
            }
            if versions.is_empty() {
                return Err(Error::Catalog {
                    detail: format!(
                        "'{}' requires '{}' {:?}, but no such version exists",
                        descriptor.full_name(),
                        dep_name,
                        patterns
                    ),
                });
            }
            out.push((dep_name.clone(), versions));
        }
        Ok(out)
    }

    // ─── Lookup ────────────────────────────────────────────────

    /// Project names, in catalog first-appearance order.
    pub fn project_names(&self) -> &[String] {
        &self.names
    }

    /// All descriptors of one name, in catalog order.
    pub fn versions_of(&self, name: &str) -> Result<Vec<&ProjectDescriptor>> {
        let indices = self.by_name.get(name).ok_or_else(|| Error::UnknownProject {
            name: name.to_string(),
        })?;
        Ok(indices.iter().map(|&i| &self.projects[i]).collect())
    }

    /// Resolve a reference to a descriptor. An empty version means the
    /// first-listed (preferred) version; aliases resolve through the index.
    pub fn lookup(&self, reference: &ProjectReference) -> Result<&ProjectDescriptor> {
        let indices = self
            .by_name
            .get(&reference.name)
            .ok_or_else(|| Error::UnknownProject {
                name: reference.name.clone(),
            })?;
        match &reference.version {
            None => Ok(&self.projects[indices[0]]),
            Some(version) => {
                let i = self.index[reference.name.as_str()]
                    .get(version)
                    .ok_or_else(|| Error::UnknownVersion {
                        name: reference.name.clone(),
                        version: version.clone(),
                    })?;
                Ok(&self.projects[*i])
            }
        }
    }

    // ─── Resolution ────────────────────────────────────────────

    /// Find the best mutually consistent set of versions for the requested
    /// references. "Best" is the first valid combination in enumeration
    /// order. The result lists dependents before dependencies (the
    /// requested project leads).
    pub fn resolve(&self, refs: &[ProjectReference]) -> Result<Vec<ProjectDescriptor>> {
        let combos = self.search(refs, true)?;
        combos
            .into_iter()
            .next()
            .ok_or_else(|| self.unsatisfiable(refs))
    }

    /// Every valid combination, in enumeration order, for introspection.
    pub fn resolve_all(&self, refs: &[ProjectReference]) -> Result<Vec<Vec<ProjectDescriptor>>> {
        let combos = self.search(refs, false)?;
        if combos.is_empty() {
            return Err(self.unsatisfiable(refs));
        }
        Ok(combos)
    }

    fn unsatisfiable(&self, refs: &[ProjectReference]) -> Error {
        Error::UnsatisfiableDependency {
            requested: refs.iter().map(|r| r.to_string()).collect(),
            detail: None,
        }
    }

    fn search(
        &self,
        refs: &[ProjectReference],
        first_only: bool,
    ) -> Result<Vec<Vec<ProjectDescriptor>>> {
        if refs.is_empty() {
            return Err(Error::UnsatisfiableDependency {
                requested: Vec::new(),
                detail: Some("no projects requested".to_string()),
            });
        }

        // Step 1: candidate versions for the requested names. A requested
        // version (possibly an alias) pins the candidate list to one entry.
        let mut possible: Vec<(String, Vec<String>)> = Vec::new();
        for reference in refs {
            let descriptor = self.lookup(reference)?;
            let candidates = match &reference.version {
                Some(_) => vec![descriptor.version.clone()],
                None => self.all_versions(&reference.name),
            };
            match possible.iter_mut().find(|(n, _)| n == &reference.name) {
                Some((_, existing)) => {
                    existing.retain(|v| candidates.contains(v));
                    if existing.is_empty() {
                        return Err(Error::UnsatisfiableDependency {
                            requested: refs.iter().map(|r| r.to_string()).collect(),
                            detail: Some(format!(
                                "'{}' is requested at two different versions",
                                reference.name
                            )),
                        });
                    }
                }
                None => possible.push((reference.name.clone(), candidates)),
            }
        }

        // Step 2: transitive closure over *names* (not versions) — any
        // dependency name referenced by any descriptor of an included name
        // joins the set, breadth-first, until fixed point.
        let mut involved: Vec<String> = possible.iter().map(|(n, _)| n.clone()).collect();
        let mut seen: HashSet<String> = involved.iter().cloned().collect();
        let mut cursor = 0;
        while cursor < involved.len() {
            let name = involved[cursor].clone();
            cursor += 1;
            for &i in &self.by_name[name.as_str()] {
                for (dep_name, _) in &self.projects[i].required_projects {
                    if seen.insert(dep_name.clone()) {
                        involved.push(dep_name.clone());
                    }
                }
            }
        }

        // Step 3: unrequested involved names get every known version, in
        // catalog order.
        for name in involved.iter().skip(possible.len()) {
            possible.push((name.clone(), self.all_versions(name)));
        }

        // Step 4/5: enumerate the Cartesian product with the requested
        // names varying slowest, so combinations preferring their
        // earlier-listed versions come first; keep the valid ones.
        let mut results: Vec<Vec<ProjectDescriptor>> = Vec::new();
        let mut choice = vec![0usize; possible.len()];
        loop {
            let combo: Vec<&ProjectDescriptor> = possible
                .iter()
                .zip(&choice)
                .map(|((name, versions), &c)| {
                    &self.projects[self.index[name.as_str()][versions[c].as_str()]]
                })
                .collect();
            if combination_is_valid(&combo) {
                let owned: Vec<ProjectDescriptor> =
                    combo.into_iter().cloned().collect();
                results.push(sort_by_dependency(&owned, Direction::DependentsFirst));
                if first_only {
                    return Ok(results);
                }
            }
            // Odometer step, rightmost position fastest.
            let mut pos = possible.len();
            loop {
                if pos == 0 {
                    return Ok(results);
                }
                pos -= 1;
                choice[pos] += 1;
                if choice[pos] < possible[pos].1.len() {
                    break;
                }
                choice[pos] = 0;
            }
        }
    }

    fn all_versions(&self, name: &str) -> Vec<String> {
        self.by_name[name]
            .iter()
            .map(|&i| self.projects[i].version.clone())
            .collect()
    }
}

/// A combination is valid iff every constraint of every member is satisfied
/// by the member versions of the same combination.
fn combination_is_valid(combo: &[&ProjectDescriptor]) -> bool {
    let chosen: HashMap<&str, &str> = combo
        .iter()
        .map(|d| (d.name.as_str(), d.version.as_str()))
        .collect();
    for d in combo {
        for (dep_name, allowed) in &d.required_projects {
            match chosen.get(dep_name.as_str()) {
                Some(v) => {
                    if !allowed.iter().any(|a| a == v) {
                        return false;
                    }
                }
                None => return false,
            }
        }
    }
    true
}

/// Proper dotted prefixes of a well-formed numeric version: "6.0.3" yields
/// "6.0" and "6". Branch-like tokens yield nothing.
fn numeric_prefixes(version: &str) -> Vec<String> {
    let parts: Vec<&str> = version.split('.').collect();
    let well_formed = parts.len() >= 2
        && parts
            .iter()
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return Vec::new();
    }
    (1..parts.len())
        .rev()
        .map(|n| parts[..n].join("."))
        .collect()
}
