//! wgtree-core library.
//!
//! Workgroups form a forest of at most [`model::MAX_DEPTH`] levels. This
//! crate holds the node model, the [`graph::WorkgroupGraph`] built from a
//! bulk listing, and the advisory validator that decides whether a
//! create-child or move is legal before it is submitted to the backend.
//!
//! # Conventions
//!
//! - **Errors**: [`error::HierarchyError`] for contract violations,
//!   `anyhow::Result` for file loaders. Business-rule denials are values
//!   ([`graph::hierarchy::Verdict`]), never errors.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod auth;
pub mod config;
pub mod error;
pub mod form;
pub mod graph;
pub mod model;
pub mod preflight;
pub mod request;
pub mod snapshot;
