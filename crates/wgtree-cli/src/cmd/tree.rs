//! `wgt tree` — print the forest, or one subtree, with depths.

use crate::cmd::{Session, parse_id};
use crate::output::{CliError, OutputMode, Renderable, render_error, render_list};
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use wgtree_core::graph::WorkgroupGraph;
use wgtree_core::model::{WorkgroupId, WorkgroupNode};

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Only print the subtree below this workgroup.
    #[arg(long)]
    pub root: Option<String>,
}

/// One line of the tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub id: WorkgroupId,
    pub name: String,
    pub parent_id: Option<WorkgroupId>,
    pub depth: u32,
    pub children: usize,
    #[serde(skip)]
    indent: u32,
}

impl TreeRow {
    fn new(graph: &WorkgroupGraph, node: &WorkgroupNode, indent: u32) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            parent_id: node.parent_id,
            depth: node.depth,
            children: graph.children(node.id).count(),
            indent,
        }
    }
}

impl Renderable for TreeRow {
    fn render_human(&self, w: &mut dyn Write) -> io::Result<()> {
        let pad = "  ".repeat(self.indent as usize);
        let marker = if self.indent == 0 { "" } else { "└─ " };
        write!(w, "{pad}{marker}{} (#{}) depth {}", self.name, self.id, self.depth)?;
        if self.children > 0 {
            write!(w, ", {} children", self.children)?;
        }
        writeln!(w)
    }

    fn render_json(&self, w: &mut dyn Write) -> io::Result<()> {
        serde_json::to_writer(&mut *w, self).map_err(io::Error::other)?;
        writeln!(w)
    }

    fn render_table(&self, w: &mut dyn Write) -> io::Result<()> {
        let parent = self.parent_id.map_or_else(|| "-".to_string(), |p| p.to_string());
        writeln!(
            w,
            "{}\t{}\t{}\t{}\t{}",
            self.id, self.depth, parent, self.children, self.name
        )
    }

    fn table_headers() -> &'static [&'static str] {
        &["id", "depth", "parent", "children", "name"]
    }
}

/// Pre-order rows for the subtree rooted at `start`.
fn subtree_rows(graph: &WorkgroupGraph, start: &WorkgroupNode, rows: &mut Vec<TreeRow>) {
    rows.push(TreeRow::new(graph, start, 0));
    rows.extend(
        graph
            .descendants(start.id)
            .map(|(node, rel)| TreeRow::new(graph, node, rel)),
    );
}

pub fn run_tree(args: &TreeArgs, session: &Session, output: OutputMode) -> anyhow::Result<()> {
    session.warn_if_stale();
    let graph = &session.graph;
    let mut rows = Vec::new();

    match &args.root {
        Some(raw) => {
            let id = parse_id(raw)?;
            let start = match graph.require(id) {
                Ok(node) => node,
                Err(e) => {
                    render_error(output, &CliError::from(&e))?;
                    return Err(e.into());
                }
            };
            subtree_rows(graph, start, &mut rows);
        }
        None => {
            for root in graph.roots() {
                subtree_rows(graph, root, &mut rows);
            }
            if rows.len() < graph.len() {
                tracing::warn!(
                    unreachable = graph.len() - rows.len(),
                    "some workgroups are not reachable from any root; run `wgt verify`"
                );
            }
        }
    }

    render_list(&rows, output)?;
    Ok(())
}
