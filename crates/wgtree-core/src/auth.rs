//! Explicit auth context for hosts of the validator.
//!
//! The signed-in user's identity and roles are a plain value passed to the
//! code that needs them. Role checks are pure predicates over that value.
//!
//! Loading the context is an explicit initialisation phase: a host hands a
//! channel receiver to [`await_context`], which waits at most the configured
//! timeout (`auth.init_timeout_ms`) and then gives up with
//! [`AuthError::Timeout`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

use crate::error::ErrorCode;

/// Roles known to the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::User => write!(f, "USER"),
        }
    }
}

impl FromStr for Role {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Self::Admin),
            "USER" => Ok(Self::User),
            other => Err(AuthError::UnknownRole(other.to_string())),
        }
    }
}

/// Identity and roles of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: String,
    pub roles: BTreeSet<Role>,
}

impl AuthContext {
    pub fn new(user_id: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id: user_id.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Parse a comma-separated role list such as `"ADMIN,USER"`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownRole`] for an unrecognised entry.
    pub fn with_role_list(user_id: impl Into<String>, roles: &str) -> Result<Self, AuthError> {
        let roles = roles
            .split(',')
            .filter(|r| !r.trim().is_empty())
            .map(str::parse)
            .collect::<Result<BTreeSet<Role>, _>>()?;
        Ok(Self {
            user_id: user_id.into(),
            roles,
        })
    }

    /// Context from `WGTREE_USER` and `WGTREE_ROLES`.
    ///
    /// Returns `Ok(None)` when `WGTREE_USER` is unset.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UnknownRole`] for an unrecognised role.
    pub fn from_env() -> Result<Option<Self>, AuthError> {
        let Ok(user) = std::env::var("WGTREE_USER") else {
            return Ok(None);
        };
        let roles = std::env::var("WGTREE_ROLES").unwrap_or_default();
        Self::with_role_list(user, &roles).map(Some)
    }
}

/// Returns `true` if `ctx` carries `role`.
pub fn has_role(ctx: &AuthContext, role: Role) -> bool {
    ctx.roles.contains(&role)
}

/// Fail unless `ctx` carries `role`.
///
/// # Errors
///
/// Returns [`AuthError::MissingRole`].
pub fn require_role(ctx: &AuthContext, role: Role) -> Result<(), AuthError> {
    if has_role(ctx, role) {
        Ok(())
    } else {
        Err(AuthError::MissingRole {
            user_id: ctx.user_id.clone(),
            role,
        })
    }
}

/// Wait for the auth provider to deliver the context.
///
/// # Errors
///
/// [`AuthError::Timeout`] when nothing arrives within `timeout`,
/// [`AuthError::ProviderGone`] when the sender was dropped first.
pub fn await_context(rx: &Receiver<AuthContext>, timeout: Duration) -> Result<AuthContext, AuthError> {
    match rx.recv_timeout(timeout) {
        Ok(ctx) => {
            tracing::debug!(user = %ctx.user_id, roles = ctx.roles.len(), "auth context loaded");
            Ok(ctx)
        }
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(timeout_ms = timeout.as_millis(), "auth context did not load in time");
            Err(AuthError::Timeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(AuthError::ProviderGone),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("auth context not loaded within {0:?}")]
    Timeout(Duration),

    #[error("auth provider stopped before delivering a context")]
    ProviderGone,

    #[error("user '{user_id}' lacks the {role} role")]
    MissingRole { user_id: String, role: Role },

    #[error("unknown role '{0}'")]
    UnknownRole(String),
}

impl AuthError {
    #[must_use]
    pub const fn error_code(&self) -> ErrorCode {
        match self {
            Self::Timeout(_) | Self::ProviderGone => ErrorCode::AuthTimeout,
            Self::MissingRole { .. } => ErrorCode::NotAuthorized,
            Self::UnknownRole(_) => ErrorCode::InvalidField,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn role_predicates() {
        let admin = AuthContext::new("alice", [Role::Admin, Role::User]);
        let user = AuthContext::new("bob", [Role::User]);
        assert!(has_role(&admin, Role::Admin));
        assert!(!has_role(&user, Role::Admin));
        assert!(require_role(&admin, Role::Admin).is_ok());
        assert_eq!(
            require_role(&user, Role::Admin),
            Err(AuthError::MissingRole {
                user_id: "bob".into(),
                role: Role::Admin
            })
        );
    }

    #[test]
    fn role_list_parsing() {
        let ctx = AuthContext::with_role_list("carol", " admin , USER,").expect("parse");
        assert_eq!(ctx.roles.len(), 2);
        assert_eq!(
            AuthContext::with_role_list("dan", "ADMIN,ROOT"),
            Err(AuthError::UnknownRole("ROOT".into()))
        );
        assert!(AuthContext::with_role_list("erin", "").expect("empty").roles.is_empty());
    }

    #[test]
    fn await_context_receives_value() {
        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            tx.send(AuthContext::new("alice", [Role::Admin])).expect("send");
        });
        let ctx = await_context(&rx, Duration::from_secs(5)).expect("context");
        assert_eq!(ctx.user_id, "alice");
        handle.join().expect("join");
    }

    #[test]
    fn await_context_times_out() {
        let (_tx, rx) = mpsc::channel::<AuthContext>();
        let err = await_context(&rx, Duration::from_millis(10)).expect_err("timeout");
        assert_eq!(err, AuthError::Timeout(Duration::from_millis(10)));
        assert_eq!(err.error_code(), ErrorCode::AuthTimeout);
    }

    #[test]
    fn await_context_reports_dropped_provider() {
        let (tx, rx) = mpsc::channel::<AuthContext>();
        drop(tx);
        assert_eq!(
            await_context(&rx, Duration::from_millis(10)),
            Err(AuthError::ProviderGone)
        );
    }
}
