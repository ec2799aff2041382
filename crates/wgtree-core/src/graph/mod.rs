//! Graph-level abstractions over a workgroup snapshot.
//!
//! ## Submodules
//!
//! - [`forest`] — [`WorkgroupGraph`]: adjacency map built once from a bulk
//!   listing, with visited-set guarded traversals.
//! - [`hierarchy`] — create-child and move validation.
//! - [`integrity`] — whole-snapshot invariant checks.
//! - [`preview`] — depth and breadcrumb changes a move would cause.

pub mod forest;
pub mod hierarchy;
pub mod integrity;
pub mod preview;

pub use forest::{AncestorChain, ChainEnd, Descendants, WorkgroupGraph};
pub use hierarchy::{Denial, HierarchyPolicy, HierarchyValidator, Verdict};
