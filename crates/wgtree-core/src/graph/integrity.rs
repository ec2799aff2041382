//! Whole-snapshot invariant checks.
//!
//! # Overview
//!
//! [`check`] walks every node of a [`WorkgroupGraph`] once and reports each
//! broken invariant as a [`Violation`]:
//!
//! - depth above the policy maximum
//! - depth not equal to parent depth + 1 (or 1 at the root)
//! - parent ID missing from the snapshot
//! - parent cycles, each reported once with its member path
//! - duplicate sibling names under the policy's name comparison
//! - field rule violations (name/description length)
//! - stored breadcrumb that disagrees with the parent links
//! - non-zero `childCount` that differs from the children loaded
//!
//! A `childCount` of 0 is not checked: the backend sends 0 when it did not
//! load the children.
//!
//! A clean snapshot is not a guarantee the backend agrees; it only means the
//! local copy is internally consistent.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;

use super::forest::{ChainEnd, WorkgroupGraph};
use super::hierarchy::HierarchyPolicy;
use crate::model::field::{self, FieldError};
use crate::model::{WorkgroupId, WorkgroupNode};

/// One broken invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    DepthExceeded {
        id: WorkgroupId,
        depth: u32,
        max_depth: u32,
    },
    DepthMismatch {
        id: WorkgroupId,
        recorded: u32,
        expected: u32,
    },
    DanglingParent {
        id: WorkgroupId,
        parent_id: WorkgroupId,
    },
    /// Members of the loop, starting at the smallest ID.
    ParentCycle { path: Vec<WorkgroupId> },
    DuplicateSiblingName {
        parent_id: Option<WorkgroupId>,
        name: String,
        ids: Vec<WorkgroupId>,
    },
    InvalidField {
        id: WorkgroupId,
        error: FieldError,
    },
    BreadcrumbMismatch { id: WorkgroupId },
    ChildCountMismatch {
        id: WorkgroupId,
        recorded: u32,
        loaded: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DepthExceeded {
                id,
                depth,
                max_depth,
            } => write!(
                f,
                "workgroup {id} is at depth {depth}, above the maximum of {max_depth}"
            ),
            Self::DepthMismatch {
                id,
                recorded,
                expected,
            } => write!(
                f,
                "workgroup {id} records depth {recorded} but its parent implies {expected}"
            ),
            Self::DanglingParent { id, parent_id } => write!(
                f,
                "workgroup {id} references parent {parent_id}, which is not in the snapshot"
            ),
            Self::ParentCycle { path } => {
                let joined: Vec<String> = path.iter().map(ToString::to_string).collect();
                write!(f, "parent cycle: {}", joined.join(" → "))
            }
            Self::DuplicateSiblingName {
                parent_id,
                name,
                ids,
            } => {
                let joined: Vec<String> = ids.iter().map(ToString::to_string).collect();
                match parent_id {
                    Some(parent) => write!(
                        f,
                        "name '{name}' is used by siblings {} under workgroup {parent}",
                        joined.join(", ")
                    ),
                    None => write!(
                        f,
                        "name '{name}' is used by root workgroups {}",
                        joined.join(", ")
                    ),
                }
            }
            Self::InvalidField { id, error } => write!(f, "workgroup {id}: {error}"),
            Self::BreadcrumbMismatch { id } => write!(
                f,
                "workgroup {id} has a breadcrumb that disagrees with its parent links"
            ),
            Self::ChildCountMismatch {
                id,
                recorded,
                loaded,
            } => write!(
                f,
                "workgroup {id} records {recorded} children but the snapshot holds {loaded}"
            ),
        }
    }
}

/// Result of [`check`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IntegrityReport {
    pub checked: usize,
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Check every invariant over the whole snapshot.
pub fn check(graph: &WorkgroupGraph, policy: &HierarchyPolicy) -> IntegrityReport {
    let mut violations = Vec::new();
    let mut seen_cycles: HashSet<Vec<WorkgroupId>> = HashSet::new();

    for node in graph.nodes() {
        check_fields(node, &mut violations);

        let loaded = graph.children(node.id).count();
        if node.child_count != 0 && usize::try_from(node.child_count).ok() != Some(loaded) {
            violations.push(Violation::ChildCountMismatch {
                id: node.id,
                recorded: node.child_count,
                loaded,
            });
        }

        if node.depth > policy.max_depth {
            violations.push(Violation::DepthExceeded {
                id: node.id,
                depth: node.depth,
                max_depth: policy.max_depth,
            });
        }

        match node.parent_id {
            None if node.depth != 1 => violations.push(Violation::DepthMismatch {
                id: node.id,
                recorded: node.depth,
                expected: 1,
            }),
            None => {}
            Some(parent_id) => match graph.get(parent_id) {
                None => violations.push(Violation::DanglingParent {
                    id: node.id,
                    parent_id,
                }),
                Some(parent) if node.depth != parent.depth.saturating_add(1) => {
                    violations.push(Violation::DepthMismatch {
                        id: node.id,
                        recorded: node.depth,
                        expected: parent.depth.saturating_add(1),
                    });
                }
                Some(_) => {}
            },
        }

        let chain = graph.ancestor_chain(node);
        match chain.end {
            ChainEnd::Cycle(at) => {
                let path = cycle_path(graph, at);
                if seen_cycles.insert(path.clone()) {
                    violations.push(Violation::ParentCycle { path });
                }
            }
            ChainEnd::Root if !node.ancestors.is_empty() => {
                if graph.breadcrumb(node) != node.ancestors {
                    violations.push(Violation::BreadcrumbMismatch { id: node.id });
                }
            }
            ChainEnd::Root | ChainEnd::Missing(_) => {}
        }
    }

    check_sibling_names(graph, policy, &mut violations);

    if !violations.is_empty() {
        tracing::debug!(violations = violations.len(), "snapshot integrity issues");
    }

    IntegrityReport {
        checked: graph.len(),
        violations,
    }
}

fn check_fields(node: &WorkgroupNode, violations: &mut Vec<Violation>) {
    if let Err(error) = field::validate_name(&node.name) {
        violations.push(Violation::InvalidField { id: node.id, error });
    }
    if let Some(description) = &node.description {
        if let Err(error) = field::validate_description(description) {
            violations.push(Violation::InvalidField { id: node.id, error });
        }
    }
}

/// Collect the loop that contains `start`, rotated to its smallest ID.
fn cycle_path(graph: &WorkgroupGraph, start: WorkgroupId) -> Vec<WorkgroupId> {
    let mut path = vec![start];
    let mut current = graph.get(start).and_then(|n| n.parent_id);
    while let Some(id) = current {
        if id == start || path.contains(&id) {
            break;
        }
        path.push(id);
        current = graph.get(id).and_then(|n| n.parent_id);
    }
    if let Some(min_pos) = path
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(pos, _)| pos)
    {
        path.rotate_left(min_pos);
    }
    path
}

fn check_sibling_names(
    graph: &WorkgroupGraph,
    policy: &HierarchyPolicy,
    violations: &mut Vec<Violation>,
) {
    let parents: BTreeSet<Option<WorkgroupId>> = graph.nodes().map(|n| n.parent_id).collect();

    for parent in parents {
        let mut groups: BTreeMap<String, Vec<WorkgroupId>> = BTreeMap::new();
        for sibling in graph.siblings_under(parent) {
            groups
                .entry(policy.name_match.key(&sibling.name).into_owned())
                .or_default()
                .push(sibling.id);
        }
        for (name, mut ids) in groups {
            if ids.len() > 1 {
                ids.sort();
                violations.push(Violation::DuplicateSiblingName {
                    parent_id: parent,
                    name,
                    ids,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AncestorRef, NameMatch};

    fn node(id: i64, name: &str, parent: Option<i64>, depth: u32) -> WorkgroupNode {
        WorkgroupNode::new(id, name, parent.map(WorkgroupId), depth)
    }

    fn run(nodes: Vec<WorkgroupNode>) -> IntegrityReport {
        let graph = WorkgroupGraph::from_nodes(nodes).expect("graph");
        check(&graph, &HierarchyPolicy::default())
    }

    #[test]
    fn clean_snapshot_passes() {
        let report = run(vec![
            node(1, "A", None, 1),
            node(2, "B", Some(1), 2),
            node(3, "C", Some(2), 3),
        ]);
        assert!(report.is_ok(), "{:?}", report.violations);
        assert_eq!(report.checked, 3);
    }

    #[test]
    fn depth_rules_reported() {
        let report = run(vec![
            node(1, "A", None, 2),
            node(2, "B", Some(1), 6),
        ]);
        assert!(report.violations.contains(&Violation::DepthMismatch {
            id: WorkgroupId(1),
            recorded: 2,
            expected: 1
        }));
        assert!(report.violations.contains(&Violation::DepthExceeded {
            id: WorkgroupId(2),
            depth: 6,
            max_depth: 5
        }));
        assert!(report.violations.contains(&Violation::DepthMismatch {
            id: WorkgroupId(2),
            recorded: 6,
            expected: 3
        }));
    }

    #[test]
    fn dangling_parent_reported() {
        let report = run(vec![node(1, "A", Some(8), 2)]);
        assert_eq!(
            report.violations,
            vec![Violation::DanglingParent {
                id: WorkgroupId(1),
                parent_id: WorkgroupId(8)
            }]
        );
    }

    #[test]
    fn cycle_reported_once() {
        let report = run(vec![
            node(3, "C", Some(2), 1),
            node(2, "B", Some(4), 1),
            node(4, "D", Some(3), 1),
        ]);
        let cycles: Vec<&Violation> = report
            .violations
            .iter()
            .filter(|v| matches!(v, Violation::ParentCycle { .. }))
            .collect();
        assert_eq!(cycles.len(), 1);
        // 2 → 4 → 3 → 2
        assert_eq!(
            cycles[0],
            &Violation::ParentCycle {
                path: vec![WorkgroupId(2), WorkgroupId(4), WorkgroupId(3)]
            }
        );
        assert_eq!(cycles[0].to_string(), "parent cycle: 2 → 4 → 3");
    }

    #[test]
    fn duplicate_sibling_names_respect_policy() {
        let nodes = vec![
            node(1, "P", None, 1),
            node(2, "Ops", Some(1), 2),
            node(3, "ops", Some(1), 2),
        ];
        assert!(run(nodes.clone()).is_ok());

        let graph = WorkgroupGraph::from_nodes(nodes).expect("graph");
        let folded = check(
            &graph,
            &HierarchyPolicy {
                name_match: NameMatch::CaseInsensitive,
                ..HierarchyPolicy::default()
            },
        );
        assert_eq!(
            folded.violations,
            vec![Violation::DuplicateSiblingName {
                parent_id: Some(WorkgroupId(1)),
                name: "ops".into(),
                ids: vec![WorkgroupId(2), WorkgroupId(3)]
            }]
        );
    }

    #[test]
    fn breadcrumb_mismatch_reported() {
        let mut child = node(2, "B", Some(1), 2);
        child.ancestors = vec![AncestorRef {
            id: WorkgroupId(1),
            name: "Renamed".into(),
        }];
        let report = run(vec![node(1, "A", None, 1), child]);
        assert_eq!(
            report.violations,
            vec![Violation::BreadcrumbMismatch { id: WorkgroupId(2) }]
        );
    }

    #[test]
    fn child_count_mismatch_reported_unless_zero() {
        let mut short = node(1, "A", None, 1);
        short.child_count = 3;
        short.has_children = true;
        let mut lazy = node(3, "C", None, 1);
        lazy.has_children = true;
        let report = run(vec![short, node(2, "B", Some(1), 2), lazy]);
        assert_eq!(
            report.violations,
            vec![Violation::ChildCountMismatch {
                id: WorkgroupId(1),
                recorded: 3,
                loaded: 1
            }]
        );
        assert_eq!(
            report.violations[0].to_string(),
            "workgroup 1 records 3 children but the snapshot holds 1"
        );
    }

    #[test]
    fn field_rules_reported() {
        let mut long = node(1, &"n".repeat(300), None, 1);
        long.description = Some("d".repeat(1001));
        let report = run(vec![long]);
        assert_eq!(report.violations.len(), 2);
        assert!(report
            .violations
            .iter()
            .all(|v| matches!(v, Violation::InvalidField { .. })));
    }
}
