//! `wgt show` — one workgroup with its breadcrumb and create-child verdict.

use crate::cmd::{Session, parse_id};
use crate::output::{CliError, OutputMode, pretty_kv, pretty_section, render_error, render_mode};
use clap::Args;
use serde::Serialize;
use std::io::Write;
use wgtree_core::graph::Verdict;
use wgtree_core::model::{AncestorRef, WorkgroupNode};

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Workgroup ID.
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShowView<'a> {
    workgroup: &'a WorkgroupNode,
    breadcrumb: Vec<AncestorRef>,
    children: Vec<&'a WorkgroupNode>,
    create_child: Verdict,
}

fn breadcrumb_text(view: &ShowView<'_>) -> String {
    view.breadcrumb
        .iter()
        .map(|a| a.name.as_str())
        .chain(std::iter::once(view.workgroup.name.as_str()))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn verdict_text(verdict: &Verdict) -> String {
    match verdict {
        Verdict::Allowed { new_depth } => format!("yes (depth {new_depth})"),
        Verdict::Denied(denial) => format!("no: {denial}"),
    }
}

pub fn run_show(args: &ShowArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    session.warn_if_stale();
    let id = parse_id(&args.id)?;
    let graph = &session.graph;
    let node = match graph.require(id) {
        Ok(node) => node,
        Err(e) => {
            render_error(output, &CliError::from(&e))?;
            return Err(e.into());
        }
    };

    let view = ShowView {
        workgroup: node,
        breadcrumb: graph.breadcrumb(node),
        children: graph.children(id).collect(),
        create_child: session.validator().can_create_child(node),
    };

    render_mode(
        output,
        &view,
        |v, w| {
            writeln!(w, "id\t{}", v.workgroup.id)?;
            writeln!(w, "name\t{}", v.workgroup.name)?;
            writeln!(w, "depth\t{}", v.workgroup.depth)?;
            writeln!(w, "path\t{}", breadcrumb_text(v))?;
            writeln!(w, "children\t{}", v.children.len())?;
            writeln!(w, "add_child\t{}", verdict_text(&v.create_child))
        },
        |v, w| {
            pretty_section(w, &format!("{} (#{})", v.workgroup.name, v.workgroup.id))?;
            pretty_kv(w, "Path", breadcrumb_text(v))?;
            pretty_kv(w, "Depth", v.workgroup.depth.to_string())?;
            if let Some(description) = &v.workgroup.description {
                pretty_kv(w, "About", description)?;
            }
            let parent = v
                .workgroup
                .parent_id
                .map_or_else(|| "(root)".to_string(), |p| p.to_string());
            pretty_kv(w, "Parent", parent)?;
            pretty_kv(w, "Add child", verdict_text(&v.create_child))?;
            if !v.children.is_empty() {
                writeln!(w)?;
                pretty_section(w, "Children")?;
                for child in &v.children {
                    writeln!(w, "  {} (#{})", child.name, child.id)?;
                }
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wgtree_core::graph::Denial;
    use wgtree_core::model::WorkgroupId;

    #[test]
    fn breadcrumb_includes_the_node_itself() {
        let node = WorkgroupNode::new(3, "Pentest", Some(WorkgroupId(2)), 3);
        let view = ShowView {
            workgroup: &node,
            breadcrumb: vec![
                AncestorRef {
                    id: WorkgroupId(1),
                    name: "Security".into(),
                },
                AncestorRef {
                    id: WorkgroupId(2),
                    name: "AppSec".into(),
                },
            ],
            children: Vec::new(),
            create_child: Verdict::Allowed { new_depth: 4 },
        };
        assert_eq!(breadcrumb_text(&view), "Security / AppSec / Pentest");
    }

    #[test]
    fn verdict_text_quotes_reason() {
        let denied = Verdict::Denied(Denial::MaxDepthReached { max_depth: 5 });
        assert_eq!(verdict_text(&denied), "no: maximum depth (5 levels) reached");
        assert_eq!(
            verdict_text(&Verdict::Allowed { new_depth: 2 }),
            "yes (depth 2)"
        );
    }
}
