//! `wgt create` — pre-flight a new workgroup and print the request body.

use crate::cmd::{Session, load_auth};
use crate::output::{CliError, OutputMode, pretty_kv, render_error, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use wgtree_core::form::{FormField, WorkgroupForm};
use wgtree_core::preflight::{self, Preflight, Rejection};
use wgtree_core::request::CreateWorkgroupRequest;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Parent workgroup ID, or "none" for a new root.
    #[arg(long)]
    pub parent: String,

    /// Name of the new workgroup.
    #[arg(long)]
    pub name: String,

    /// Optional description.
    #[arg(long)]
    pub description: Option<String>,
}

impl CreateArgs {
    fn to_form(&self) -> WorkgroupForm {
        WorkgroupForm::new()
            .with_field(FormField::Name, &self.name)
            .with_field(
                FormField::Description,
                self.description.clone().unwrap_or_default(),
            )
            .with_field(FormField::Parent, &self.parent)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateView {
    ok: bool,
    new_depth: u32,
    request: CreateWorkgroupRequest,
}

/// Render a pre-flight rejection and turn it into the command's error.
pub fn reject(output: OutputMode, rejection: &Rejection) -> anyhow::Result<()> {
    let reasons = rejection.reasons();
    let code = rejection.error_code();
    let mut error = CliError::with_code(reasons.join("; "), code);
    if let Rejection::InvalidInput(errors) = rejection {
        if let Some(first) = errors.first() {
            error = error.suggest(first.suggestion);
        }
    }
    render_error(output, &error)?;
    anyhow::bail!("{}", reasons.join("; "))
}

pub fn run_create(args: &CreateArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    session.ensure_fresh(output)?;
    let ctx = load_auth(session.config.auth.init_timeout(), output)?;
    let validator = session.validator();

    let plan = match preflight::preflight_create(&ctx, &validator, &args.to_form()) {
        Ok(Preflight::Ready(plan)) => plan,
        Ok(Preflight::Rejected(rejection)) => return reject(output, &rejection),
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    let view = CreateView {
        ok: true,
        new_depth: plan.new_depth,
        request: plan.request,
    };
    render_mode(
        output,
        &view,
        |v, w| {
            let body = serde_json::to_string(&v.request).map_err(std::io::Error::other)?;
            writeln!(w, "ok\t{}\t{body}", v.new_depth)
        },
        |v, w| {
            let parent = v
                .request
                .parent_id
                .map_or_else(|| "(root)".to_string(), |p| p.to_string());
            writeln!(w, "✓ '{}' may be created", v.request.name)?;
            pretty_kv(w, "Parent", parent)?;
            pretty_kv(w, "Depth", v.new_depth.to_string())?;
            let body =
                serde_json::to_string_pretty(&v.request).map_err(std::io::Error::other)?;
            writeln!(w, "\nPOST /workgroups\n{body}")
        },
    )
}
