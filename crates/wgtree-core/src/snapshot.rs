//! Workgroup snapshots loaded from disk.
//!
//! A snapshot is one bulk listing of the forest plus the time it was
//! fetched. Files hold either the wrapper object
//! `{"fetchedAt": "...", "workgroups": [...]}` or a bare JSON array of
//! nodes; a bare array takes the file's modification time as `fetchedAt`.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::HierarchyError;
use crate::graph::WorkgroupGraph;
use crate::model::WorkgroupNode;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub fetched_at: DateTime<Utc>,
    pub workgroups: Vec<WorkgroupNode>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotFile {
    Wrapped(Snapshot),
    Bare(Vec<WorkgroupNode>),
}

impl Snapshot {
    pub fn new(fetched_at: DateTime<Utc>, workgroups: Vec<WorkgroupNode>) -> Self {
        Self {
            fetched_at,
            workgroups,
        }
    }

    /// Parse snapshot JSON. `fallback_time` stamps a bare array.
    ///
    /// # Errors
    ///
    /// Fails when the text is neither accepted shape.
    pub fn from_json(text: &str, fallback_time: DateTime<Utc>) -> Result<Self> {
        let file: SnapshotFile = serde_json::from_str(text)
            .context("snapshot must be {\"fetchedAt\", \"workgroups\"} or an array of workgroups")?;
        Ok(match file {
            SnapshotFile::Wrapped(snapshot) => snapshot,
            SnapshotFile::Bare(workgroups) => Self::new(fallback_time, workgroups),
        })
    }

    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read snapshot {}", path.display()))?;
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
        let snapshot = Self::from_json(&text, modified)
            .with_context(|| format!("Failed to parse snapshot {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            workgroups = snapshot.workgroups.len(),
            fetched_at = %snapshot.fetched_at,
            "loaded workgroup snapshot"
        );
        Ok(snapshot)
    }

    /// Time elapsed since the snapshot was fetched (zero if in the future).
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        (now - self.fetched_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Returns `true` if the snapshot is older than `max_age`.
    pub fn is_stale(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        self.age(now) > max_age
    }

    /// Build the graph for this snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::DuplicateWorkgroupId`] for repeated IDs.
    pub fn graph(&self) -> Result<WorkgroupGraph, HierarchyError> {
        WorkgroupGraph::from_nodes(self.workgroups.iter().cloned())
    }
}
