//! Dependency ordering of resolved descriptor sets.

use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::catalog::ProjectDescriptor;

/// Which end of the dependency chain comes first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Dependencies before dependents (install/setup order).
    DependenciesFirst,
    /// Dependents before dependencies (build-listing/teardown order).
    DependentsFirst,
}

/// Topologically sort descriptors by their `required_projects` edges.
///
/// Ties break by input order (the sort is stable). Cycles are not expected
/// in a valid catalog; if one is present the input order is returned
/// unchanged rather than failing or looping.
pub fn sort_by_dependency(
    descriptors: &[ProjectDescriptor],
    direction: Direction,
) -> Vec<ProjectDescriptor> {
    let mut graph: DiGraph<usize, ()> = DiGraph::new();
    let nodes: Vec<NodeIndex> = (0..descriptors.len()).map(|i| graph.add_node(i)).collect();

    // Edge i → j means descriptors[i] depends on descriptors[j]. Dependencies
    // on projects outside the slice carry no edge.
    for (i, d) in descriptors.iter().enumerate() {
        for (dep_name, _) in &d.required_projects {
            if let Some(j) = descriptors.iter().position(|o| &o.name == dep_name) {
                if i != j {
                    graph.add_edge(nodes[i], nodes[j], ());
                }
            }
        }
    }

    if is_cyclic_directed(&graph) {
        return descriptors.to_vec();
    }

    // Kahn-style selection scanning in input order: the first unplaced
    // descriptor whose dependencies are all placed goes next. This yields
    // dependencies-first order with a stable input-order tie-break.
    let mut placed = vec![false; descriptors.len()];
    let mut order: Vec<usize> = Vec::with_capacity(descriptors.len());
    while order.len() < descriptors.len() {
        let mut advanced = false;
        for i in 0..descriptors.len() {
            if placed[i] {
                continue;
            }
            let ready = graph
                .neighbors(nodes[i])
                .all(|n| placed[graph[n]]);
            if ready {
                placed[i] = true;
                order.push(i);
                advanced = true;
                break;
            }
        }
        if !advanced {
            // Unreachable once the cycle check passed, but never loop.
            for i in 0..descriptors.len() {
                if !placed[i] {
                    placed[i] = true;
                    order.push(i);
                }
            }
        }
    }

    if direction == Direction::DependentsFirst {
        order.reverse();
    }
    order.into_iter().map(|i| descriptors[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> Vec<ProjectDescriptor> {
        // a requires b, b requires c.
        let mut a = ProjectDescriptor::new("a", "1.0");
        a.required_projects = vec![("b".to_string(), vec!["1.0".to_string()])];
        let mut b = ProjectDescriptor::new("b", "1.0");
        b.required_projects = vec![("c".to_string(), vec!["1.0".to_string()])];
        let c = ProjectDescriptor::new("c", "1.0");
        vec![a, b, c]
    }

    fn names(v: &[ProjectDescriptor]) -> Vec<&str> {
        v.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_chain_install_order() {
        let sorted = sort_by_dependency(&chain(), Direction::DependenciesFirst);
        assert_eq!(names(&sorted), ["c", "b", "a"]);
    }

    #[test]
    fn test_chain_build_order() {
        let sorted = sort_by_dependency(&chain(), Direction::DependentsFirst);
        assert_eq!(names(&sorted), ["a", "b", "c"]);
    }

    #[test]
    fn test_independent_projects_keep_input_order() {
        let v = vec![
            ProjectDescriptor::new("x", "1"),
            ProjectDescriptor::new("y", "1"),
            ProjectDescriptor::new("z", "1"),
        ];
        let sorted = sort_by_dependency(&v, Direction::DependenciesFirst);
        assert_eq!(names(&sorted), ["x", "y", "z"]);
    }

    #[test]
    fn test_cycle_does_not_loop() {
        let mut a = ProjectDescriptor::new("a", "1");
        a.required_projects = vec![("b".to_string(), vec!["1".to_string()])];
        let mut b = ProjectDescriptor::new("b", "1");
        b.required_projects = vec![("a".to_string(), vec!["1".to_string()])];
        let sorted = sort_by_dependency(&[a, b], Direction::DependenciesFirst);
        assert_eq!(names(&sorted), ["a", "b"]);
    }

    #[test]
    fn test_dependency_outside_slice_ignored() {
        let mut a = ProjectDescriptor::new("a", "1");
        a.required_projects = vec![("elsewhere".to_string(), vec!["1".to_string()])];
        let sorted = sort_by_dependency(&[a.clone()], Direction::DependenciesFirst);
        assert_eq!(sorted, vec![a]);
    }
}
