mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "zest-spec",
    about = "A lightweight, file-driven development workflow for swappable coding agents",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .zest-spec/ or .git/)
    #[arg(long, global = true, env = "ZEST_SPEC_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON instead of YAML
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show project status
    Status,

    /// List all specs
    List {
        /// Print a human-readable table
        #[arg(long)]
        table: bool,
    },

    /// Show spec details
    Show {
        /// Spec id (e.g. 001) or `current`
        spec: String,
    },

    /// Create a new spec
    Create { slug: String },

    /// Set the current spec
    SetCurrent {
        /// Spec id (e.g. 001)
        spec: String,
    },

    /// Unset the current spec
    UnsetCurrent,

    /// Move a spec forward in its lifecycle
    UpdateStatus {
        /// Spec id (e.g. 001) or `current`
        spec: String,
        /// One of: new, researched, designed, implemented
        status: String,
    },

    /// Deploy agent commands and skills to .cursor/ and .opencode/
    Init,
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let root = root::resolve_root(cli.root.as_deref());

    let result = match cli.command {
        Commands::Status => cmd::status::run(&root, cli.json),
        Commands::List { table } => cmd::spec::list(&root, table, cli.json),
        Commands::Show { spec } => cmd::spec::show(&root, &spec, cli.json),
        Commands::Create { slug } => cmd::spec::create(&root, &slug, cli.json),
        Commands::SetCurrent { spec } => cmd::spec::set_current(&root, &spec, cli.json),
        Commands::UnsetCurrent => cmd::spec::unset_current(&root, cli.json),
        Commands::UpdateStatus { spec, status } => {
            cmd::spec::update_status(&root, &spec, &status, cli.json)
        }
        Commands::Init => cmd::init::run(&root, cli.json),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
