//! `wgt verify` — check the snapshot against every hierarchy invariant.

use crate::cmd::Session;
use crate::output::{CliError, OutputMode, render, render_error};
use anyhow::Result;
use std::io::Write;
use wgtree_core::error::ErrorCode;
use wgtree_core::graph::integrity;

pub fn run_verify(session: &Session, output: OutputMode) -> Result<()> {
    let report = integrity::check(&session.graph, &session.config.policy());

    render(output, &report, |r, w| {
        for violation in &r.violations {
            writeln!(w, "FAIL {violation}")?;
        }
        if r.is_ok() {
            writeln!(w, "OK   {} workgroups checked", r.checked)
        } else {
            writeln!(
                w,
                "verify: {} violation(s) in {} workgroups",
                r.violations.len(),
                r.checked
            )
        }
    })?;

    if report.is_ok() {
        Ok(())
    } else {
        let message = format!(
            "snapshot {} violates hierarchy invariants",
            session.snapshot_path.display()
        );
        render_error(
            output,
            &CliError::with_code(&message, ErrorCode::IntegrityViolation)
                .suggest("Re-fetch the snapshot; if violations persist the backend data needs repair."),
        )?;
        anyhow::bail!("verify: failed")
    }
}
