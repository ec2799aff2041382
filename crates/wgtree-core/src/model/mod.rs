//! Workgroup data model.
//!
//! - [`node`] — the [`WorkgroupNode`] shape shared by the tree display,
//!   create-child and move flows.
//! - [`field`] — length and content rules for user-entered fields.

pub mod field;
pub mod node;

pub use node::{AncestorRef, NameMatch, WorkgroupId, WorkgroupNode};

/// Maximum depth of any workgroup in the forest (roots are depth 1).
pub const MAX_DEPTH: u32 = 5;
