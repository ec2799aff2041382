#![forbid(unsafe_code)]

mod cmd;
mod output;

use clap::{CommandFactory, Parser, Subcommand};
use cmd::Session;
use output::{CliError, OutputMode};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use wgtree_core::config;
use wgtree_core::error::ErrorCode;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "wgt: pre-flight checks for the workgroup hierarchy",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Snapshot file (defaults to `[snapshot] path` in .wgtree/config.toml).
    #[arg(long, global = true, value_name = "PATH")]
    snapshot: Option<PathBuf>,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Alias for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Read",
        about = "Print the workgroup tree",
        long_about = "Print every workgroup, or one subtree, with depth and child counts.",
        after_help = "EXAMPLES:\n    # Whole forest\n    wgt tree\n\n    # One subtree\n    wgt tree --root 12\n\n    # Emit machine-readable output\n    wgt tree --format json"
    )]
    Tree(cmd::tree::TreeArgs),

    #[command(
        next_help_heading = "Read",
        about = "Show one workgroup",
        long_about = "Show a workgroup's details, breadcrumb, children, and whether a child may be added.",
        after_help = "EXAMPLES:\n    # Show a workgroup\n    wgt show 12\n\n    # Emit machine-readable output\n    wgt show 12 --format json"
    )]
    Show(cmd::show::ShowArgs),

    #[command(
        next_help_heading = "Pre-flight",
        about = "Check a new workgroup",
        long_about = "Check role, fields, depth and sibling names for a new workgroup and print the request body.",
        after_help = "EXAMPLES:\n    # New child of workgroup 4\n    wgt create --parent 4 --name \"Red Team\"\n\n    # New root\n    wgt create --parent none --name Platform --description \"Platform teams\""
    )]
    Create(cmd::create::CreateArgs),

    #[command(
        next_help_heading = "Pre-flight",
        about = "Check a move",
        long_about = "Check whether a workgroup may be moved under a new parent and preview the depth changes.",
        after_help = "EXAMPLES:\n    # Move under workgroup 3\n    wgt move 7 --parent 3\n\n    # Move to the root level\n    wgt move 7 --parent none"
    )]
    Move(cmd::move_cmd::MoveArgs),

    #[command(
        next_help_heading = "Pre-flight",
        about = "List valid new parents",
        long_about = "List the workgroups a workgroup may be moved under, ordered by depth then name.",
        after_help = "EXAMPLES:\n    # Valid parents only\n    wgt parents 7\n\n    # Every candidate with the reason it is refused\n    wgt parents 7 --explain"
    )]
    Parents(cmd::parents::ParentsArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Verify snapshot integrity",
        long_about = "Check depths, parent links, cycles, sibling names and fields across the whole snapshot.",
        after_help = "EXAMPLES:\n    # Verify the configured snapshot\n    wgt verify\n\n    # Verify another file\n    wgt verify --snapshot export.json"
    )]
    Verify,

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        long_about = "Generate shell completion scripts for supported shells.",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    wgt completions bash\n\n    # Generate zsh completions\n    wgt completions zsh"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("WGTREE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "wgtree=debug,info"
        } else {
            "wgtree=info,warn"
        })
    });

    let format = env::var("WGTREE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    if let Commands::Completions(args) = &cli.command {
        let mut command = Cli::command();
        return cmd::completions::run_completions(args.shell, &mut command);
    }

    let project_root = env::current_dir()?;
    let effective = match config::resolve_config(&project_root, cli.json) {
        Ok(effective) => effective,
        Err(e) => {
            let mode = cli.format.unwrap_or(OutputMode::Text);
            output::render_error(
                mode,
                &CliError::with_code(format!("{e:#}"), ErrorCode::ConfigParseError),
            )?;
            return Err(e);
        }
    };
    let output = output::select_output_mode(cli.format, &effective.resolved_output);

    let session = Session::load(
        &project_root,
        effective.project,
        cli.snapshot.as_deref(),
        output,
    )?;

    match cli.command {
        Commands::Tree(ref args) => cmd::tree::run_tree(args, &session, output),
        Commands::Show(ref args) => cmd::show::run_show(args, &session, output),
        Commands::Create(ref args) => cmd::create::run_create(args, &session, output),
        Commands::Move(ref args) => cmd::move_cmd::run_move(args, &session, output),
        Commands::Parents(ref args) => cmd::parents::run_parents(args, &session, output),
        Commands::Verify => cmd::verify::run_verify(&session, output),
        Commands::Completions(_) => Ok(()),
    }
}
