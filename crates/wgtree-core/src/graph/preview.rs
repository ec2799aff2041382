//! Depth and breadcrumb changes caused by a move.
//!
//! The backend answers a move request with the updated workgroup and
//! recomputed depths for its subtree. [`preview_move`] computes the same
//! values locally so a host can show them before submitting, and
//! [`MovePreview::apply`] produces the post-move snapshot.

#![allow(clippy::must_use_candidate, clippy::module_name_repetitions)]

use serde::Serialize;

use super::forest::WorkgroupGraph;
use crate::error::HierarchyError;
use crate::model::{AncestorRef, WorkgroupId, WorkgroupNode};

/// Old and new depth of one workgroup in the moved subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthChange {
    pub id: WorkgroupId,
    pub name: String,
    pub old_depth: u32,
    pub new_depth: u32,
}

/// Everything a move would change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovePreview {
    pub subject: WorkgroupId,
    pub old_parent: Option<WorkgroupId>,
    pub new_parent: Option<WorkgroupId>,
    /// Subject's breadcrumb after the move.
    pub breadcrumb: Vec<AncestorRef>,
    /// Subject first, then descendants in depth-first order.
    pub changes: Vec<DepthChange>,
}

impl MovePreview {
    /// Deepest level any moved workgroup reaches.
    pub fn deepest(&self) -> u32 {
        self.changes.iter().map(|c| c.new_depth).max().unwrap_or(0)
    }

    /// Build the snapshot as it would look after the move.
    ///
    /// Updates the subject's parent, every moved depth, the breadcrumbs of
    /// the moved subtree, and the child counts of the old and new parent.
    ///
    /// # Errors
    ///
    /// Propagates [`HierarchyError`] from rebuilding the graph.
    pub fn apply(&self, graph: &WorkgroupGraph) -> Result<WorkgroupGraph, HierarchyError> {
        let moved: Vec<WorkgroupId> = self.changes.iter().map(|c| c.id).collect();

        let nodes = graph.nodes().map(|node| {
            let mut node = node.clone();
            if node.id == self.subject {
                node.parent_id = self.new_parent;
            }
            if let Some(change) = self.changes.iter().find(|c| c.id == node.id) {
                node.depth = change.new_depth;
            }
            if Some(node.id) == self.old_parent && self.old_parent != self.new_parent {
                node.child_count = node.child_count.saturating_sub(1);
                node.has_children = graph.children(node.id).any(|c| c.id != self.subject);
            }
            if Some(node.id) == self.new_parent && self.old_parent != self.new_parent {
                node.child_count = node.child_count.saturating_add(1);
                node.has_children = true;
            }
            node
        });
        let moved_graph = WorkgroupGraph::from_nodes(nodes.collect::<Vec<_>>())?;

        let relinked = moved_graph.nodes().map(|node| {
            let mut node = node.clone();
            if moved.contains(&node.id) {
                node.ancestors = moved_graph.breadcrumb(&node);
            }
            node
        });
        WorkgroupGraph::from_nodes(relinked.collect::<Vec<_>>())
    }
}

/// Compute the effect of moving `subject` under `new_parent` (`None` for
/// the root level). Does not validate the move; run
/// [`HierarchyValidator::can_move`](super::hierarchy::HierarchyValidator::can_move)
/// first.
///
/// # Errors
///
/// Returns [`HierarchyError::WorkgroupNotFound`] if either workgroup is not
/// in the snapshot.
pub fn preview_move(
    graph: &WorkgroupGraph,
    subject: WorkgroupId,
    new_parent: Option<WorkgroupId>,
) -> Result<MovePreview, HierarchyError> {
    let node = graph.require(subject)?;
    let (subject_depth, breadcrumb) = match new_parent {
        Some(parent_id) => {
            let parent = graph.require(parent_id)?;
            let mut crumbs = graph.breadcrumb(parent);
            crumbs.push(parent.as_ancestor());
            (parent.depth.saturating_add(1), crumbs)
        }
        None => (1, Vec::new()),
    };

    let mut changes = vec![change_for(node, subject_depth)];
    changes.extend(
        graph
            .descendants(subject)
            .map(|(d, rel)| change_for(d, subject_depth.saturating_add(rel))),
    );

    Ok(MovePreview {
        subject,
        old_parent: node.parent_id,
        new_parent,
        breadcrumb,
        changes,
    })
}

fn change_for(node: &WorkgroupNode, new_depth: u32) -> DepthChange {
    DepthChange {
        id: node.id,
        name: node.name.clone(),
        old_depth: node.depth,
        new_depth,
    }
}
