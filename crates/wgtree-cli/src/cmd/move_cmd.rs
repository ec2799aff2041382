//! `wgt move` — pre-flight reparenting a workgroup.

use crate::cmd::create::reject;
use crate::cmd::{Session, load_auth, parse_id, parse_parent};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use wgtree_core::graph::preview::MovePreview;
use wgtree_core::preflight::{self, Preflight};
use wgtree_core::request::MoveWorkgroupRequest;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Workgroup ID to move.
    pub id: String,

    /// New parent workgroup ID. Use "--parent none" to move to the root level.
    #[arg(long)]
    pub parent: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveView {
    ok: bool,
    new_depth: u32,
    request: MoveWorkgroupRequest,
    preview: MovePreview,
}

pub fn run_move(args: &MoveArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    let subject = parse_id(&args.id)?;
    let new_parent = parse_parent(&args.parent)?;
    session.ensure_fresh(output)?;
    let ctx = load_auth(session.config.auth.init_timeout(), output)?;
    let validator = session.validator();

    let plan = match preflight::preflight_move(&ctx, &validator, subject, new_parent) {
        Ok(Preflight::Ready(plan)) => plan,
        Ok(Preflight::Rejected(rejection)) => return reject(output, &rejection),
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    let view = MoveView {
        ok: true,
        new_depth: plan.new_depth,
        request: plan.request,
        preview: plan.preview,
    };
    render_mode(
        output,
        &view,
        |v, w| {
            let body = serde_json::to_string(&v.request).map_err(std::io::Error::other)?;
            writeln!(w, "ok\t{}\t{body}", v.new_depth)?;
            for change in &v.preview.changes {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    change.id, change.old_depth, change.new_depth, change.name
                )?;
            }
            Ok(())
        },
        |v, w| {
            let target = v
                .request
                .new_parent_id
                .map_or_else(|| "the root level".to_string(), |p| format!("workgroup {p}"));
            writeln!(w, "✓ {} may be moved under {target}", v.request.workgroup_id)?;
            let path: Vec<&str> = v.preview.breadcrumb.iter().map(|a| a.name.as_str()).collect();
            if !path.is_empty() {
                pretty_kv(w, "New path", path.join(" / "))?;
            }
            pretty_kv(w, "Depth", v.new_depth.to_string())?;
            writeln!(w)?;
            pretty_section(w, "Depth changes")?;
            for change in &v.preview.changes {
                writeln!(
                    w,
                    "  {} (#{}): {} → {}",
                    change.name, change.id, change.old_depth, change.new_depth
                )?;
            }
            let body =
                serde_json::to_string_pretty(&v.request).map_err(std::io::Error::other)?;
            writeln!(w, "\nPOST /workgroups/{}/move\n{body}", v.request.workgroup_id)
        },
    )
}
