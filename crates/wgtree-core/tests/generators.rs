#![allow(dead_code)]

use proptest::prelude::*;
use proptest::sample::Index;
use std::collections::HashSet;
use wgtree_core::model::{MAX_DEPTH, WorkgroupId, WorkgroupNode};

const NAMES: [&str; 4] = ["Ops", "Sec", "Dev", "QA"];

fn id_for(index: usize) -> WorkgroupId {
    WorkgroupId(i64::try_from(index).expect("small index") + 1)
}

/// A well-formed forest: consistent depths, breadcrumbs and child counts,
/// unique sibling names, nothing deeper than [`MAX_DEPTH`].
///
/// Names are drawn from a tiny pool so move candidates often collide.
pub fn arb_forest() -> impl Strategy<Value = Vec<WorkgroupNode>> {
    prop::collection::vec((any::<Index>(), any::<bool>(), 0..NAMES.len()), 1..40)
        .prop_map(build_forest)
}

fn build_forest(plan: Vec<(Index, bool, usize)>) -> Vec<WorkgroupNode> {
    let mut nodes: Vec<WorkgroupNode> = Vec::with_capacity(plan.len());
    let mut used: HashSet<(Option<WorkgroupId>, String)> = HashSet::new();

    for (i, (pick, make_root, name_idx)) in plan.into_iter().enumerate() {
        let id = id_for(i);
        let parent_idx = if make_root || nodes.is_empty() {
            None
        } else {
            let idx = pick.index(nodes.len());
            (nodes[idx].depth < MAX_DEPTH).then_some(idx)
        };
        let parent_id = parent_idx.map(|idx| nodes[idx].id);

        let mut name = NAMES[name_idx].to_string();
        if !used.insert((parent_id, name.clone())) {
            name = format!("{name}-{id}");
            used.insert((parent_id, name.clone()));
        }

        let depth = parent_idx.map_or(1, |idx| nodes[idx].depth + 1);
        let mut node = WorkgroupNode::new(id, name, parent_id, depth);
        if let Some(idx) = parent_idx {
            let parent = &mut nodes[idx];
            parent.child_count += 1;
            parent.has_children = true;
            let mut crumbs = parent.ancestors.clone();
            crumbs.push(parent.as_ancestor());
            node.ancestors = crumbs;
        }
        nodes.push(node);
    }
    nodes
}

/// Anything goes: dangling parents, self-parents, loops, wrong depths,
/// and child counts or lazy flags that disagree with the loaded children.
pub fn arb_malformed() -> impl Strategy<Value = Vec<WorkgroupNode>> {
    prop::collection::vec(
        (
            prop::option::of(0usize..48),
            0u32..9,
            0..NAMES.len(),
            any::<bool>(),
            0u32..4,
        ),
        1..40,
    )
    .prop_map(|plan| {
        plan.into_iter()
            .enumerate()
            .map(|(i, (parent, depth, name_idx, has_children, child_count))| {
                let mut node =
                    WorkgroupNode::new(id_for(i), NAMES[name_idx], parent.map(id_for), depth);
                node.has_children = has_children;
                node.child_count = child_count;
                node
            })
            .collect()
    })
}
