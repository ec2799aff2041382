//! Stable error codes and the caller-contract errors of the validator.

use std::fmt;

use crate::model::WorkgroupId;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    SnapshotUnreadable,
    SnapshotStale,
    WorkgroupNotFound,
    DuplicateWorkgroupId,
    MoveDenied,
    CreateDenied,
    InvalidField,
    NotAuthorized,
    AuthTimeout,
    IntegrityViolation,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::SnapshotUnreadable => "E1002",
            Self::SnapshotStale => "E1003",
            Self::WorkgroupNotFound => "E2001",
            Self::DuplicateWorkgroupId => "E2002",
            Self::MoveDenied => "E2003",
            Self::CreateDenied => "E2004",
            Self::InvalidField => "E2005",
            Self::NotAuthorized => "E4001",
            Self::AuthTimeout => "E4002",
            Self::IntegrityViolation => "E3001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::SnapshotUnreadable => "Workgroup snapshot unreadable",
            Self::SnapshotStale => "Workgroup snapshot is stale",
            Self::WorkgroupNotFound => "Workgroup not in snapshot",
            Self::DuplicateWorkgroupId => "Duplicate workgroup ID in snapshot",
            Self::MoveDenied => "Move not allowed",
            Self::CreateDenied => "Child workgroup not allowed",
            Self::InvalidField => "Invalid field value",
            Self::NotAuthorized => "Missing required role",
            Self::AuthTimeout => "Auth context did not load in time",
            Self::IntegrityViolation => "Snapshot violates hierarchy invariants",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in .wgtree/config.toml and retry."),
            Self::SnapshotUnreadable => {
                Some("Re-export the workgroup listing as JSON and pass it with --snapshot.")
            }
            Self::SnapshotStale => Some("Fetch a fresh snapshot before submitting changes."),
            Self::WorkgroupNotFound => {
                Some("Fetch a fresh snapshot; the workgroup may have been created elsewhere.")
            }
            Self::DuplicateWorkgroupId => Some("Re-export the snapshot; IDs must be unique."),
            Self::MoveDenied | Self::CreateDenied => None,
            Self::InvalidField => Some("Correct the field and retry."),
            Self::NotAuthorized => Some("Ask an administrator to grant the ADMIN role."),
            Self::AuthTimeout => Some("Raise auth.init_timeout_ms or check the auth provider."),
            Self::IntegrityViolation => Some("Run `wgt verify` for the full violation list."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Caller-contract violations raised by graph construction and the
/// hierarchy validator.
///
/// A denied move or create is not an error; see
/// [`Verdict`](crate::graph::hierarchy::Verdict).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HierarchyError {
    /// A workgroup referenced by the caller is absent from the snapshot.
    #[error("workgroup {0} is not present in the snapshot")]
    WorkgroupNotFound(WorkgroupId),

    /// Two nodes in one listing share an ID.
    #[error("workgroup ID {0} appears more than once in the snapshot")]
    DuplicateWorkgroupId(WorkgroupId),
}

impl HierarchyError {
    /// Stable error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::WorkgroupNotFound(_) => ErrorCode::WorkgroupNotFound,
            Self::DuplicateWorkgroupId(_) => ErrorCode::DuplicateWorkgroupId,
        }
    }
}
