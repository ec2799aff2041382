//! Workgroup identifiers, nodes and the sibling-name policy.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Backend-assigned workgroup identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkgroupId(pub i64);

impl fmt::Display for WorkgroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for WorkgroupId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse::<i64>().map(Self)
    }
}

impl From<i64> for WorkgroupId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// One breadcrumb entry: an ancestor's ID and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AncestorRef {
    pub id: WorkgroupId,
    pub name: String,
}

/// A workgroup as returned by the backend listing.
///
/// `depth` is 1 for roots and parent depth + 1 otherwise. `child_count` may
/// be 0 for a node whose children were not loaded; `has_children` carries
/// the lazy flag in that case. `ancestors` runs from the root down to, but
/// excluding, this node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkgroupNode {
    pub id: WorkgroupId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_id: Option<WorkgroupId>,
    pub depth: u32,
    #[serde(default)]
    pub child_count: u32,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub ancestors: Vec<AncestorRef>,
}

impl WorkgroupNode {
    /// Build a node with no description and empty breadcrumb.
    pub fn new(
        id: impl Into<WorkgroupId>,
        name: impl Into<String>,
        parent_id: Option<WorkgroupId>,
        depth: u32,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            parent_id,
            depth,
            child_count: 0,
            has_children: false,
            ancestors: Vec::new(),
        }
    }

    /// Returns `true` if the node sits at the top level.
    pub const fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    /// This node as a breadcrumb entry.
    pub fn as_ancestor(&self) -> AncestorRef {
        AncestorRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// How sibling names are compared for uniqueness.
///
/// `Exact` is the default: `"Ops"` and `"ops"` may coexist under one parent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NameMatch {
    #[default]
    Exact,
    CaseInsensitive,
}

impl NameMatch {
    /// The form of `name` that sibling uniqueness is decided on.
    pub fn key(self, name: &str) -> Cow<'_, str> {
        match self {
            Self::Exact => Cow::Borrowed(name),
            Self::CaseInsensitive => Cow::Owned(name.to_lowercase()),
        }
    }

    /// Compare two sibling names under this policy.
    pub fn same(self, a: &str, b: &str) -> bool {
        self.key(a) == self.key(b)
    }
}

impl FromStr for NameMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(Self::Exact),
            "case-insensitive" | "ignore-case" => Ok(Self::CaseInsensitive),
            other => Err(format!(
                "unknown name match policy '{other}' (expected exact or case-insensitive)"
            )),
        }
    }
}
