//! `wgt parents` — where can this workgroup be moved?

use crate::cmd::{Session, parse_id};
use crate::output::{CliError, OutputMode, pretty_section, render_error, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use wgtree_core::graph::Verdict;
use wgtree_core::model::WorkgroupNode;

#[derive(Args, Debug)]
pub struct ParentsArgs {
    /// Workgroup ID to move.
    pub id: String,

    /// List every other workgroup with the verdict for moving under it.
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ParentEntry<'a> {
    workgroup: &'a WorkgroupNode,
    #[serde(skip_serializing_if = "Option::is_none")]
    verdict: Option<Verdict>,
}

fn verdict_cell(verdict: Option<&Verdict>) -> String {
    match verdict {
        None | Some(Verdict::Allowed { .. }) => "ok".to_string(),
        Some(Verdict::Denied(denial)) => denial.to_string(),
    }
}

pub fn run_parents(args: &ParentsArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    session.warn_if_stale();
    let id = parse_id(&args.id)?;
    let validator = session.validator();
    let subject = match session.graph.require(id) {
        Ok(node) => node,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    let entries: Vec<ParentEntry<'_>> = if args.explain {
        validator
            .explain_parents(subject)?
            .into_iter()
            .map(|option| ParentEntry {
                workgroup: option.workgroup,
                verdict: Some(option.verdict),
            })
            .collect()
    } else {
        validator
            .list_valid_parents(subject)?
            .into_iter()
            .map(|workgroup| ParentEntry {
                workgroup,
                verdict: None,
            })
            .collect()
    };
    let to_root = validator.can_move(subject, None)?;
    tracing::debug!(subject = %id, candidates = entries.len(), "listed parents");

    render_mode(
        output,
        &entries,
        |entries, w| {
            for e in entries {
                writeln!(
                    w,
                    "{}\t{}\t{}\t{}",
                    e.workgroup.id,
                    e.workgroup.depth,
                    e.workgroup.name,
                    verdict_cell(e.verdict.as_ref())
                )?;
            }
            Ok(())
        },
        |entries, w| {
            let heading = if args.explain {
                format!("Move candidates for {} (#{})", subject.name, subject.id)
            } else {
                format!("Valid parents for {} (#{})", subject.name, subject.id)
            };
            pretty_section(w, &heading)?;
            if entries.is_empty() {
                writeln!(w, "  (none)")?;
            }
            for e in entries {
                let mark = if e.verdict.as_ref().is_none_or(Verdict::is_allowed) {
                    "✓"
                } else {
                    "✗"
                };
                write!(
                    w,
                    "  {mark} {} (#{}) depth {}",
                    e.workgroup.name, e.workgroup.id, e.workgroup.depth
                )?;
                if let Some(Verdict::Denied(denial)) = &e.verdict {
                    write!(w, ": {denial}")?;
                }
                writeln!(w)?;
            }
            writeln!(w, "  root level (--parent none): {}", verdict_cell(Some(&to_root)))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgtree_core::graph::Denial;

    #[test]
    fn verdict_cells() {
        assert_eq!(verdict_cell(None), "ok");
        assert_eq!(verdict_cell(Some(&Verdict::Allowed { new_depth: 2 })), "ok");
        assert_eq!(
            verdict_cell(Some(&Verdict::Denied(Denial::SelfParent))),
            "a workgroup cannot be its own parent"
        );
    }

    #[test]
    fn entry_json_omits_missing_verdict() {
        let node = WorkgroupNode::new(4, "Ops", None, 1);
        let value = serde_json::to_value(ParentEntry {
            workgroup: &node,
            verdict: None,
        })
        .expect("json");
        assert!(value.get("verdict").is_none());
        assert_eq!(value["workgroup"]["id"], 4);
    }
}
