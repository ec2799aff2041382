//! Command handlers and the state they share.
//!
//! Every handler works on a [`Session`]: the project config plus one
//! snapshot and the graph built from it. Commands that submit changes
//! additionally need an [`AuthContext`], loaded via [`load_auth`].

pub mod completions;
pub mod create;
pub mod move_cmd;
pub mod parents;
pub mod show;
pub mod tree;
pub mod verify;

use anyhow::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use wgtree_core::auth::{self, AuthContext, AuthError};
use wgtree_core::config::ProjectConfig;
use wgtree_core::error::ErrorCode;
use wgtree_core::graph::{HierarchyValidator, WorkgroupGraph};
use wgtree_core::model::WorkgroupId;
use wgtree_core::snapshot::Snapshot;

use crate::output::{CliError, OutputMode, render_error};

/// Loaded config, snapshot and graph for one invocation.
pub struct Session {
    pub config: ProjectConfig,
    pub snapshot: Snapshot,
    pub graph: WorkgroupGraph,
    pub snapshot_path: PathBuf,
}

impl Session {
    /// Load the snapshot named by `--snapshot` or `[snapshot] path`.
    ///
    /// Errors are rendered in `output` before being returned.
    pub fn load(
        project_root: &Path,
        config: ProjectConfig,
        snapshot_flag: Option<&Path>,
        output: OutputMode,
    ) -> Result<Self> {
        let snapshot_path = snapshot_flag.map_or_else(
            || project_root.join(&config.snapshot.path),
            |p| project_root.join(p),
        );

        let snapshot = match Snapshot::load(&snapshot_path) {
            Ok(s) => s,
            Err(e) => {
                render_error(
                    output,
                    &CliError::with_code(format!("{e:#}"), ErrorCode::SnapshotUnreadable),
                )?;
                return Err(e);
            }
        };

        let graph = match snapshot.graph() {
            Ok(g) => g,
            Err(e) => {
                render_error(output, &CliError::from(&e))?;
                return Err(e.into());
            }
        };

        Ok(Self {
            config,
            snapshot,
            graph,
            snapshot_path,
        })
    }

    pub fn validator(&self) -> HierarchyValidator<'_> {
        HierarchyValidator::new(&self.graph, self.config.policy())
    }

    /// Refuse to pre-flight a change against a snapshot older than
    /// `[snapshot] max_age_secs`.
    pub fn ensure_fresh(&self, output: OutputMode) -> Result<()> {
        let Some(max_age) = self.config.snapshot.max_age() else {
            return Ok(());
        };
        let now = Utc::now();
        if !self.snapshot.is_stale(now, max_age) {
            return Ok(());
        }
        let age = self.snapshot.age(now).as_secs();
        let message = format!(
            "snapshot {} was fetched {age}s ago (limit {}s)",
            self.snapshot_path.display(),
            max_age.as_secs()
        );
        render_error(output, &CliError::with_code(&message, ErrorCode::SnapshotStale))?;
        anyhow::bail!("{message}")
    }

    /// Log, but do not fail, when a read-only command runs on an old snapshot.
    pub fn warn_if_stale(&self) {
        if let Some(max_age) = self.config.snapshot.max_age() {
            let now = Utc::now();
            if self.snapshot.is_stale(now, max_age) {
                tracing::warn!(
                    age_secs = self.snapshot.age(now).as_secs(),
                    path = %self.snapshot_path.display(),
                    "snapshot is stale"
                );
            }
        }
    }
}

/// Parse `--parent`: a workgroup ID, or `none` for the root level.
pub fn parse_parent(raw: &str) -> Result<Option<WorkgroupId>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    parse_id(raw).map(Some)
}

/// Parse a workgroup ID argument.
pub fn parse_id(raw: &str) -> Result<WorkgroupId> {
    raw.parse::<WorkgroupId>()
        .map_err(|e| anyhow::anyhow!("invalid workgroup ID '{raw}': {e}"))
}

/// Load the signed-in user's context from the environment.
///
/// The provider runs on its own thread and the caller waits at most
/// `timeout` for it.
pub fn load_auth(timeout: Duration, output: OutputMode) -> Result<AuthContext> {
    let (tx, rx) = mpsc::channel();
    let (err_tx, err_rx) = mpsc::channel::<AuthError>();
    thread::spawn(move || match AuthContext::from_env() {
        Ok(Some(ctx)) => {
            let _ = tx.send(ctx);
        }
        Ok(None) => tracing::debug!("WGTREE_USER not set"),
        Err(e) => {
            let _ = err_tx.send(e);
        }
    });

    match auth::await_context(&rx, timeout) {
        Ok(ctx) => Ok(ctx),
        Err(e) => {
            let e = err_rx.try_recv().unwrap_or(e);
            let mut cli_error = CliError::with_code(e.to_string(), e.error_code());
            if matches!(e, AuthError::ProviderGone) {
                cli_error = cli_error.suggest("Set WGTREE_USER and WGTREE_ROLES for the signed-in user.");
            }
            render_error(output, &cli_error)?;
            Err(e.into())
        }
    }
}
