//! Workgroup forest built from a bulk listing.
//!
//! # Overview
//!
//! The backend hands out a flat list of [`WorkgroupNode`]s. This module
//! builds the `parentId -> [childIds]` adjacency map once so that every
//! traversal afterwards is in-memory.
//!
//! # Malformed snapshots
//!
//! Snapshots come from a backend other users are editing concurrently, so
//! the graph tolerates dangling parent IDs and parent cycles:
//!
//! - [`WorkgroupGraph::descendants`] tracks visited IDs and never yields a
//!   node twice.
//! - [`WorkgroupGraph::ancestor_chain`] stops at the first repeated or
//!   missing ID and reports which one via [`ChainEnd`].
//!
//! Duplicate IDs are rejected at construction time since no traversal can
//! tell the two nodes apart.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
)]

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::error::HierarchyError;
use crate::model::{AncestorRef, WorkgroupId, WorkgroupNode};

// ---------------------------------------------------------------------------
// WorkgroupGraph
// ---------------------------------------------------------------------------

/// An immutable workgroup forest.
///
/// Children of each parent (and the root list) are ordered by `(name, id)`
/// so every traversal is deterministic.
#[derive(Debug, Clone, Default)]
pub struct WorkgroupGraph {
    nodes: BTreeMap<WorkgroupId, WorkgroupNode>,
    /// parent_id → child ids. Keys may name parents absent from `nodes`.
    children: HashMap<WorkgroupId, Vec<WorkgroupId>>,
    roots: Vec<WorkgroupId>,
}

impl WorkgroupGraph {
    /// Build the graph from a flat listing.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::DuplicateWorkgroupId`] if two nodes share an ID.
    pub fn from_nodes(
        listing: impl IntoIterator<Item = WorkgroupNode>,
    ) -> Result<Self, HierarchyError> {
        let mut nodes: BTreeMap<WorkgroupId, WorkgroupNode> = BTreeMap::new();
        for node in listing {
            let id = node.id;
            if nodes.insert(id, node).is_some() {
                return Err(HierarchyError::DuplicateWorkgroupId(id));
            }
        }

        let mut children: HashMap<WorkgroupId, Vec<WorkgroupId>> = HashMap::new();
        let mut roots = Vec::new();
        for node in nodes.values() {
            match node.parent_id {
                Some(parent_id) => children.entry(parent_id).or_default().push(node.id),
                None => roots.push(node.id),
            }
        }

        let sort_key = |id: &WorkgroupId| {
            let name = nodes.get(id).map_or("", |n| n.name.as_str());
            (name.to_owned(), *id)
        };
        roots.sort_by_cached_key(sort_key);
        for ids in children.values_mut() {
            ids.sort_by_cached_key(sort_key);
        }

        tracing::debug!(
            nodes = nodes.len(),
            roots = roots.len(),
            "built workgroup graph"
        );

        Ok(Self {
            nodes,
            children,
            roots,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: WorkgroupId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: WorkgroupId) -> Option<&WorkgroupNode> {
        self.nodes.get(&id)
    }

    /// Look up a node the caller promised is in the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::WorkgroupNotFound`] when it is not.
    pub fn require(&self, id: WorkgroupId) -> Result<&WorkgroupNode, HierarchyError> {
        self.nodes
            .get(&id)
            .ok_or(HierarchyError::WorkgroupNotFound(id))
    }

    /// All nodes in ascending ID order.
    pub fn nodes(&self) -> impl Iterator<Item = &WorkgroupNode> {
        self.nodes.values()
    }

    /// Top-level nodes, ordered by `(name, id)`.
    pub fn roots(&self) -> impl Iterator<Item = &WorkgroupNode> {
        self.roots.iter().filter_map(|id| self.nodes.get(id))
    }

    /// Direct children of `id`, ordered by `(name, id)`.
    pub fn children(&self, id: WorkgroupId) -> impl Iterator<Item = &WorkgroupNode> {
        self.child_ids(id).iter().filter_map(|cid| self.nodes.get(cid))
    }

    /// Nodes sharing the parent `parent` (`None` = the root level).
    pub fn siblings_under(
        &self,
        parent: Option<WorkgroupId>,
    ) -> Box<dyn Iterator<Item = &WorkgroupNode> + '_> {
        match parent {
            Some(id) => Box::new(self.children(id)),
            None => Box::new(self.roots()),
        }
    }

    fn child_ids(&self, id: WorkgroupId) -> &[WorkgroupId] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Lazy depth-first walk of everything below `id`, excluding `id`.
    ///
    /// Yields `(node, relative_depth)` in pre-order, where direct children
    /// have relative depth 1.
    pub fn descendants(&self, id: WorkgroupId) -> Descendants<'_> {
        let mut visited = HashSet::new();
        visited.insert(id);
        let stack = self
            .child_ids(id)
            .iter()
            .rev()
            .map(|cid| (*cid, 1))
            .collect();
        Descendants {
            graph: self,
            stack,
            visited,
        }
    }

    /// Largest relative depth below `id` (0 for a leaf).
    pub fn subtree_height(&self, id: WorkgroupId) -> u32 {
        self.descendants(id)
            .map(|(_, depth)| depth)
            .max()
            .unwrap_or(0)
    }

    /// Returns `true` if the backend reports children of `node` that the
    /// snapshot does not hold: `has_children` with none loaded, or a
    /// `child_count` above the loaded count.
    pub fn has_unloaded_children(&self, node: &WorkgroupNode) -> bool {
        let loaded = self.child_ids(node.id).len();
        (node.has_children && loaded == 0)
            || usize::try_from(node.child_count).is_ok_and(|count| count > loaded)
    }

    /// First node of the subtree rooted at `id`, `id` included, whose
    /// children are not all in the snapshot.
    pub fn first_unloaded(&self, id: WorkgroupId) -> Option<WorkgroupId> {
        let root = self.nodes.get(&id)?;
        std::iter::once(root)
            .chain(self.descendants(id).map(|(node, _)| node))
            .find(|node| self.has_unloaded_children(node))
            .map(|node| node.id)
    }

    /// Returns `true` if `candidate` lies strictly below `id`.
    pub fn is_descendant(&self, id: WorkgroupId, candidate: WorkgroupId) -> bool {
        self.descendants(id).any(|(node, _)| node.id == candidate)
    }

    /// Walk `parentId` links upward from `start`.
    ///
    /// `start` itself is not part of the chain. The walk stops at a root, at
    /// the first parent missing from the graph, or at the first ID seen
    /// twice.
    pub fn ancestor_chain<'g>(&'g self, start: &WorkgroupNode) -> AncestorChain<'g> {
        let mut visited: HashSet<WorkgroupId> = HashSet::new();
        visited.insert(start.id);
        let mut ancestors = Vec::new();
        let mut next = start.parent_id;

        let end = loop {
            let Some(parent_id) = next else {
                break ChainEnd::Root;
            };
            if !visited.insert(parent_id) {
                break ChainEnd::Cycle(parent_id);
            }
            let Some(parent) = self.nodes.get(&parent_id) else {
                break ChainEnd::Missing(parent_id);
            };
            ancestors.push(parent);
            next = parent.parent_id;
        };

        AncestorChain { ancestors, end }
    }

    /// Depth implied by the parent links, if the chain reaches a root.
    pub fn computed_depth(&self, node: &WorkgroupNode) -> Option<u32> {
        let chain = self.ancestor_chain(node);
        if chain.end != ChainEnd::Root {
            return None;
        }
        u32::try_from(chain.ancestors.len()).ok().map(|n| n + 1)
    }

    /// Breadcrumb from the root down to, but excluding, `node`.
    ///
    /// A broken chain yields the part that could be resolved.
    pub fn breadcrumb(&self, node: &WorkgroupNode) -> Vec<AncestorRef> {
        let chain = self.ancestor_chain(node);
        chain
            .ancestors
            .iter()
            .rev()
            .map(|n| n.as_ancestor())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Traversal types
// ---------------------------------------------------------------------------

/// How an upward walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEnd {
    /// Reached a node with no parent.
    Root,
    /// The named parent is not in the snapshot.
    Missing(WorkgroupId),
    /// The named ID was already on the chain.
    Cycle(WorkgroupId),
}

/// Result of [`WorkgroupGraph::ancestor_chain`].
#[derive(Debug, Clone)]
pub struct AncestorChain<'g> {
    /// Nearest parent first.
    pub ancestors: Vec<&'g WorkgroupNode>,
    pub end: ChainEnd,
}

impl AncestorChain<'_> {
    pub fn contains(&self, id: WorkgroupId) -> bool {
        self.ancestors.iter().any(|n| n.id == id)
    }

    pub fn is_complete(&self) -> bool {
        self.end == ChainEnd::Root
    }
}

/// Iterator returned by [`WorkgroupGraph::descendants`].
#[derive(Debug)]
pub struct Descendants<'g> {
    graph: &'g WorkgroupGraph,
    stack: Vec<(WorkgroupId, u32)>,
    visited: HashSet<WorkgroupId>,
}

impl<'g> Iterator for Descendants<'g> {
    type Item = (&'g WorkgroupNode, u32);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, depth)) = self.stack.pop() {
            if !self.visited.insert(id) {
                continue;
            }
            let Some(node) = self.graph.nodes.get(&id) else {
                continue;
            };
            for child in self.graph.child_ids(id).iter().rev() {
                if !self.visited.contains(child) {
                    self.stack.push((*child, depth + 1));
                }
            }
            return Some((node, depth));
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
