//! Pre-flight checks run right before a create or move is submitted.
//!
//! Combines the caller's role, field validation, and the hierarchy
//! verdict into one answer: either a ready-to-send request or a
//! [`Rejection`] with every reason the user should see.
//!
//! Run this against a freshly loaded snapshot each time; the backend
//! remains the authority and may still refuse a request that passed here.

use std::fmt;

use crate::auth::{self, AuthContext, AuthError, Role};
use crate::error::{ErrorCode, HierarchyError};
use crate::form::WorkgroupForm;
use crate::graph::hierarchy::{Denial, HierarchyValidator, Verdict};
use crate::graph::preview::{MovePreview, preview_move};
use crate::model::WorkgroupId;
use crate::model::field::FieldError;
use crate::request::{CreateWorkgroupRequest, MoveWorkgroupRequest};

/// Role required for structural changes.
pub const REQUIRED_ROLE: Role = Role::Admin;

/// Outcome of a pre-flight check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preflight<T> {
    Ready(T),
    Rejected(Rejection),
}

impl<T> Preflight<T> {
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Why a pre-flight check refused to produce a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Unauthorized(AuthError),
    InvalidInput(Vec<FieldError>),
    CreateDenied(Denial),
    MoveDenied(Denial),
}

impl Rejection {
    /// Reasons to render verbatim, one per line.
    #[must_use]
    pub fn reasons(&self) -> Vec<String> {
        match self {
            Self::Unauthorized(e) => vec![e.to_string()],
            Self::InvalidInput(errors) => errors.iter().map(ToString::to_string).collect(),
            Self::CreateDenied(denial) | Self::MoveDenied(denial) => vec![denial.to_string()],
        }
    }

    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Unauthorized(e) => e.error_code(),
            Self::InvalidInput(_) => ErrorCode::InvalidField,
            Self::CreateDenied(_) => ErrorCode::CreateDenied,
            Self::MoveDenied(_) => ErrorCode::MoveDenied,
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reasons().join("; "))
    }
}

/// A create request that passed every local check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePlan {
    pub request: CreateWorkgroupRequest,
    pub new_depth: u32,
}

/// A move request that passed every local check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovePlan {
    pub request: MoveWorkgroupRequest,
    pub new_depth: u32,
    pub preview: MovePreview,
}

/// Check a create-workgroup form.
///
/// # Errors
///
/// Returns [`HierarchyError::WorkgroupNotFound`] if the form names a parent
/// that is not in the snapshot.
pub fn preflight_create(
    ctx: &AuthContext,
    validator: &HierarchyValidator<'_>,
    form: &WorkgroupForm,
) -> Result<Preflight<CreatePlan>, HierarchyError> {
    if let Err(e) = auth::require_role(ctx, REQUIRED_ROLE) {
        return Ok(Preflight::Rejected(Rejection::Unauthorized(e)));
    }
    let request = match form.to_create_request() {
        Ok(request) => request,
        Err(errors) => return Ok(Preflight::Rejected(Rejection::InvalidInput(errors))),
    };

    let parent = request
        .parent_id
        .map(|id| validator.graph().require(id))
        .transpose()?;
    match validator.can_create_named(parent, &request.name)? {
        Verdict::Allowed { new_depth } => {
            tracing::info!(
                user = %ctx.user_id,
                parent = ?request.parent_id,
                name = %request.name,
                "create pre-flight passed"
            );
            Ok(Preflight::Ready(CreatePlan { request, new_depth }))
        }
        Verdict::Denied(denial) => Ok(Preflight::Rejected(Rejection::CreateDenied(denial))),
    }
}

/// Check moving `subject` under `new_parent` (`None` for the root level).
///
/// # Errors
///
/// Returns [`HierarchyError::WorkgroupNotFound`] if either workgroup is not
/// in the snapshot.
pub fn preflight_move(
    ctx: &AuthContext,
    validator: &HierarchyValidator<'_>,
    subject: WorkgroupId,
    new_parent: Option<WorkgroupId>,
) -> Result<Preflight<MovePlan>, HierarchyError> {
    if let Err(e) = auth::require_role(ctx, REQUIRED_ROLE) {
        return Ok(Preflight::Rejected(Rejection::Unauthorized(e)));
    }
    let graph = validator.graph();
    let subject_node = graph.require(subject)?;
    let parent_node = new_parent.map(|id| graph.require(id)).transpose()?;

    match validator.can_move(subject_node, parent_node)? {
        Verdict::Allowed { new_depth } => {
            let preview = preview_move(graph, subject, new_parent)?;
            tracing::info!(
                user = %ctx.user_id,
                workgroup = %subject,
                new_parent = ?new_parent,
                "move pre-flight passed"
            );
            Ok(Preflight::Ready(MovePlan {
                request: MoveWorkgroupRequest {
                    workgroup_id: subject,
                    new_parent_id: new_parent,
                },
                new_depth,
                preview,
            }))
        }
        Verdict::Denied(denial) => Ok(Preflight::Rejected(Rejection::MoveDenied(denial))),
    }
}
