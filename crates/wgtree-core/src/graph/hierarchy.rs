//! Create-child and move validation for the workgroup forest.
//!
//! This module answers, before anything is submitted to the backend:
//!
//! - May a child be created under this parent?
//! - May this workgroup be moved under that parent (or to the root)?
//! - Which workgroups are valid new parents for this one?
//!
//! # Advisory only
//!
//! Every answer is computed from a snapshot that may already be stale. The
//! backend enforces the same rules and its rejection wins even when the
//! local verdict was [`Verdict::Allowed`].
//!
//! # Move rules
//!
//! Evaluated in order, the first failure is reported:
//!
//! 1. The candidate parent is not the subject itself.
//! 2. The candidate parent is not below the subject. The ancestor walk is
//!    visited-set bounded; a missing or repeated ancestor denies the move
//!    because the snapshot cannot prove it acyclic.
//! 3. No node of the moved subtree ends up deeper than `max_depth`. The
//!    subtree's deepest existing descendant is measured, not the subject's
//!    current depth. If any node of the subtree has children the snapshot
//!    does not hold (`hasChildren` or `childCount` says more than is
//!    loaded), the depth cannot be measured and the move is denied.
//! 4. No other sibling under the new parent has the subject's name.
//!
//! # Error handling
//!
//! Denials are ordinary [`Verdict`] values. [`HierarchyError`] is returned
//! only when the caller passes a workgroup absent from the snapshot.

#![allow(
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::doc_markdown,
)]

use serde::Serialize;
use serde::ser::SerializeStruct;
use std::fmt;

use super::forest::{ChainEnd, WorkgroupGraph};
use crate::error::{ErrorCode, HierarchyError};
use crate::model::{MAX_DEPTH, NameMatch, WorkgroupId, WorkgroupNode};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Rules the validator enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyPolicy {
    /// Deepest allowed level; roots are level 1.
    pub max_depth: u32,
    /// Sibling-name comparison.
    pub name_match: NameMatch,
}

impl Default for HierarchyPolicy {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            name_match: NameMatch::default(),
        }
    }
}

/// Why a structural change was refused.
///
/// `Display` is the reason shown to the user verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The parent already sits at the deepest allowed level.
    MaxDepthReached { max_depth: u32 },
    /// The candidate parent is the workgroup being moved.
    SelfParent,
    /// The candidate parent lies below the workgroup being moved.
    DescendantParent { candidate: WorkgroupId },
    /// An ancestor of the candidate parent is not in the snapshot.
    AncestryUnverifiable { missing: WorkgroupId },
    /// The candidate parent's ancestor chain loops.
    AncestryCyclic { at: WorkgroupId },
    /// Part of the moved subtree would land below `max_depth`.
    DepthOverflow { deepest: u32, max_depth: u32 },
    /// Children of a node in the moved subtree are not in the snapshot.
    SubtreeUnverifiable { id: WorkgroupId },
    /// A sibling under the target parent already uses the name.
    NameCollision { name: String, existing: WorkgroupId },
}

impl Denial {
    /// Stable snake_case identifier for machine consumers.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MaxDepthReached { .. } => "max_depth_reached",
            Self::SelfParent => "self_parent",
            Self::DescendantParent { .. } => "descendant_parent",
            Self::AncestryUnverifiable { .. } => "ancestry_unverifiable",
            Self::AncestryCyclic { .. } => "ancestry_cyclic",
            Self::DepthOverflow { .. } => "depth_overflow",
            Self::SubtreeUnverifiable { .. } => "subtree_unverifiable",
            Self::NameCollision { .. } => "name_collision",
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MaxDepthReached { max_depth } => {
                write!(f, "maximum depth ({max_depth} levels) reached")
            }
            Self::SelfParent => write!(f, "a workgroup cannot be its own parent"),
            Self::DescendantParent { candidate } => write!(
                f,
                "workgroup {candidate} is a descendant of the workgroup being moved"
            ),
            Self::AncestryUnverifiable { missing } => write!(
                f,
                "cannot verify ancestry: workgroup {missing} is missing from the snapshot"
            ),
            Self::AncestryCyclic { at } => write!(
                f,
                "cannot verify ancestry: parent chain loops at workgroup {at}"
            ),
            Self::DepthOverflow { deepest, max_depth } => write!(
                f,
                "move would place workgroups at depth {deepest}, exceeding the maximum depth ({max_depth} levels)"
            ),
            Self::SubtreeUnverifiable { id } => write!(
                f,
                "cannot verify subtree depth: children of workgroup {id} are not loaded"
            ),
            Self::NameCollision { name, .. } => {
                write!(f, "a sibling workgroup named '{name}' already exists")
            }
        }
    }
}

/// Outcome of a create-child or move check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The change is legal; `new_depth` is the depth the created or moved
    /// workgroup will have.
    Allowed { new_depth: u32 },
    Denied(Denial),
}

impl Verdict {
    pub const fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed { .. })
    }

    pub const fn new_depth(&self) -> Option<u32> {
        match self {
            Self::Allowed { new_depth } => Some(*new_depth),
            Self::Denied(_) => None,
        }
    }

    pub const fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allowed { .. } => None,
            Self::Denied(denial) => Some(denial),
        }
    }

    /// Human-readable reason, present only for denials.
    pub fn reason(&self) -> Option<String> {
        self.denial().map(ToString::to_string)
    }

    /// Error code a host should report for a denial.
    pub const fn error_code(&self) -> Option<ErrorCode> {
        match self {
            Self::Allowed { .. } => None,
            Self::Denied(Denial::MaxDepthReached { .. }) => Some(ErrorCode::CreateDenied),
            Self::Denied(_) => Some(ErrorCode::MoveDenied),
        }
    }
}

impl Serialize for Verdict {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Allowed { new_depth } => {
                let mut s = serializer.serialize_struct("Verdict", 2)?;
                s.serialize_field("allowed", &true)?;
                s.serialize_field("newDepth", new_depth)?;
                s.end()
            }
            Self::Denied(denial) => {
                let mut s = serializer.serialize_struct("Verdict", 3)?;
                s.serialize_field("allowed", &false)?;
                s.serialize_field("reason", &denial.to_string())?;
                s.serialize_field("code", denial.code())?;
                s.end()
            }
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allowed { new_depth } => write!(f, "allowed (new depth {new_depth})"),
            Self::Denied(denial) => write!(f, "denied: {denial}"),
        }
    }
}

/// One entry of [`HierarchyValidator::explain_parents`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentOption<'g> {
    pub workgroup: &'g WorkgroupNode,
    pub verdict: Verdict,
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Decide whether a child may be created under `parent`.
///
/// Pure function of `parent.depth`; the new child's depth is
/// `parent.depth + 1`.
pub fn can_create_child(parent: &WorkgroupNode, policy: &HierarchyPolicy) -> Verdict {
    if parent.depth >= policy.max_depth {
        tracing::debug!(parent = %parent.id, depth = parent.depth, "create-child denied");
        return Verdict::Denied(Denial::MaxDepthReached {
            max_depth: policy.max_depth,
        });
    }
    Verdict::Allowed {
        new_depth: parent.depth + 1,
    }
}

/// Loaded height of a move subject, and the first node below it whose
/// children are missing from the snapshot.
#[derive(Debug, Clone, Copy)]
struct Subtree {
    height: u32,
    unloaded: Option<WorkgroupId>,
}

/// Move and create validation over one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct HierarchyValidator<'g> {
    graph: &'g WorkgroupGraph,
    policy: HierarchyPolicy,
}

impl<'g> HierarchyValidator<'g> {
    pub const fn new(graph: &'g WorkgroupGraph, policy: HierarchyPolicy) -> Self {
        Self { graph, policy }
    }

    pub const fn graph(&self) -> &'g WorkgroupGraph {
        self.graph
    }

    pub const fn policy(&self) -> &HierarchyPolicy {
        &self.policy
    }

    /// See [`can_create_child`].
    pub fn can_create_child(&self, parent: &WorkgroupNode) -> Verdict {
        can_create_child(parent, &self.policy)
    }

    /// Depth check plus a sibling-name check for a child named `name`.
    ///
    /// `parent = None` creates a new root.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::WorkgroupNotFound`] if `parent` is not in
    /// the snapshot.
    pub fn can_create_named(
        &self,
        parent: Option<&WorkgroupNode>,
        name: &str,
    ) -> Result<Verdict, HierarchyError> {
        let verdict = match parent {
            Some(p) => {
                self.graph.require(p.id)?;
                self.can_create_child(p)
            }
            None => Verdict::Allowed { new_depth: 1 },
        };
        if !verdict.is_allowed() {
            return Ok(verdict);
        }
        if let Some(denial) = self.name_collision(parent.map(|p| p.id), name, None) {
            return Ok(Verdict::Denied(denial));
        }
        Ok(verdict)
    }

    /// Decide whether `subject` may be re-parented under `candidate`
    /// (`None` moves it to the root level).
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::WorkgroupNotFound`] if `subject` or
    /// `candidate` is not in the snapshot.
    pub fn can_move(
        &self,
        subject: &WorkgroupNode,
        candidate: Option<&WorkgroupNode>,
    ) -> Result<Verdict, HierarchyError> {
        self.graph.require(subject.id)?;
        if let Some(parent) = candidate {
            self.graph.require(parent.id)?;
        }
        let subtree = self.measure(subject);
        let verdict = self.evaluate_move(subject, candidate, subtree);
        if let Verdict::Denied(ref denial) = verdict {
            tracing::debug!(
                subject = %subject.id,
                candidate = ?candidate.map(|c| c.id),
                code = denial.code(),
                "move denied"
            );
        }
        Ok(verdict)
    }

    /// Every workgroup `subject` may legally be moved under, ordered by
    /// `(depth, name, id)`.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::WorkgroupNotFound`] if `subject` is not in
    /// the snapshot.
    pub fn list_valid_parents(
        &self,
        subject: &WorkgroupNode,
    ) -> Result<Vec<&'g WorkgroupNode>, HierarchyError> {
        Ok(self
            .explain_parents(subject)?
            .into_iter()
            .filter(|option| option.verdict.is_allowed())
            .map(|option| option.workgroup)
            .collect())
    }

    /// Every other workgroup paired with the verdict for moving `subject`
    /// under it, in the same order as [`Self::list_valid_parents`].
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::WorkgroupNotFound`] if `subject` is not in
    /// the snapshot.
    pub fn explain_parents(
        &self,
        subject: &WorkgroupNode,
    ) -> Result<Vec<ParentOption<'g>>, HierarchyError> {
        self.graph.require(subject.id)?;
        let subtree = self.measure(subject);

        let mut options: Vec<ParentOption<'g>> = self
            .graph
            .nodes()
            .filter(|candidate| candidate.id != subject.id)
            .map(|candidate| ParentOption {
                workgroup: candidate,
                verdict: self.evaluate_move(subject, Some(candidate), subtree),
            })
            .collect();
        options.sort_by(|a, b| {
            (a.workgroup.depth, &a.workgroup.name, a.workgroup.id).cmp(&(
                b.workgroup.depth,
                &b.workgroup.name,
                b.workgroup.id,
            ))
        });
        Ok(options)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn measure(&self, subject: &WorkgroupNode) -> Subtree {
        Subtree {
            height: self.graph.subtree_height(subject.id),
            unloaded: self.graph.first_unloaded(subject.id),
        }
    }

    /// Rules 1–4 for a subject whose subtree is already measured.
    fn evaluate_move(
        &self,
        subject: &WorkgroupNode,
        candidate: Option<&WorkgroupNode>,
        subtree: Subtree,
    ) -> Verdict {
        if let Some(parent) = candidate {
            if parent.id == subject.id {
                return Verdict::Denied(Denial::SelfParent);
            }
            if let Some(denial) = self.ancestry_denial(subject, parent) {
                return Verdict::Denied(denial);
            }
        }

        let new_depth = candidate.map_or(1, |p| p.depth.saturating_add(1));
        let deepest = new_depth.saturating_add(subtree.height);
        if deepest > self.policy.max_depth {
            return Verdict::Denied(Denial::DepthOverflow {
                deepest,
                max_depth: self.policy.max_depth,
            });
        }
        if let Some(id) = subtree.unloaded {
            return Verdict::Denied(Denial::SubtreeUnverifiable { id });
        }

        if let Some(denial) =
            self.name_collision(candidate.map(|p| p.id), &subject.name, Some(subject.id))
        {
            return Verdict::Denied(denial);
        }

        Verdict::Allowed { new_depth }
    }

    /// Rule 2: walk up from `candidate` looking for `subject`.
    fn ancestry_denial(&self, subject: &WorkgroupNode, candidate: &WorkgroupNode) -> Option<Denial> {
        let chain = self.graph.ancestor_chain(candidate);
        if chain.contains(subject.id) {
            return Some(Denial::DescendantParent {
                candidate: candidate.id,
            });
        }
        match chain.end {
            ChainEnd::Root => None,
            ChainEnd::Missing(missing) => Some(Denial::AncestryUnverifiable { missing }),
            ChainEnd::Cycle(at) if at == subject.id => Some(Denial::DescendantParent {
                candidate: candidate.id,
            }),
            ChainEnd::Cycle(at) => Some(Denial::AncestryCyclic { at }),
        }
    }

    /// Rule 4: another sibling under `parent` already named `name`.
    fn name_collision(
        &self,
        parent: Option<WorkgroupId>,
        name: &str,
        exclude: Option<WorkgroupId>,
    ) -> Option<Denial> {
        self.graph
            .siblings_under(parent)
            .find(|sibling| Some(sibling.id) != exclude && self.policy.name_match.same(&sibling.name, name))
            .map(|existing| Denial::NameCollision {
                name: name.to_string(),
                existing: existing.id,
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
