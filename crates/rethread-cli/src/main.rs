mod cmd;
mod output;
mod root;
mod session;

use clap::{Parser, Subcommand};
use cmd::{
    check::CheckSubcommand, config::ConfigSubcommand, home::HomeSubcommand,
    roles::RolesSubcommand, sync::SyncSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "rethread",
    about = "ReThread operating cycle tracker: phases, checklists, roles and progress",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .rethread/ or .git/)
    #[arg(long, global = true, env = "RETHREAD_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the tracker in the current project
    Init,

    /// List the phases of the cycle
    Phases {
        /// Only phases of this week (A or B)
        #[arg(long)]
        week: Option<String>,
        /// Case-insensitive filter on title, purpose and tags
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one phase in full (default: the current phase)
    Show { phase: Option<String> },

    /// Move to the next phase (stays put on the last one)
    Next,

    /// Move to the previous phase (stays put on the first one)
    Prev,

    /// Move to a phase by id
    Jump { phase: String },

    /// Move to the kill-or-commit decision gate
    Gate,

    /// Tick, untick and list checklist items
    Check {
        #[command(subcommand)]
        subcommand: CheckSubcommand,
    },

    /// Show, edit and swap the lead/challenger rotation
    Roles {
        #[command(subcommand)]
        subcommand: RolesSubcommand,
    },

    /// Completion per phase, per week and for the whole cycle
    Progress,

    /// List the phase document templates
    Templates {
        /// Only templates used in this phase
        #[arg(long)]
        phase: Option<String>,
    },

    /// Weeks, principles and guardrails of the operating cycle
    Guide,

    /// Show the strategic roadmap from .rethread/roadmap.json
    Roadmap,

    /// Show or edit the homepage content
    Home {
        #[command(subcommand)]
        subcommand: HomeSubcommand,
    },

    /// Push or pull tracker state to the remote mirror
    Sync {
        #[command(subcommand)]
        subcommand: SyncSubcommand,
    },

    /// Inspect and validate the project configuration
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
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
        Commands::Init => cmd::init::run(&root),
        Commands::Phases { week, search } => {
            cmd::phases::list(&root, week.as_deref(), search.as_deref(), cli.json)
        }
        Commands::Show { phase } => cmd::phases::show(&root, phase.as_deref(), cli.json),
        Commands::Next => cmd::nav::run(&root, cmd::nav::Move::Next, cli.json),
        Commands::Prev => cmd::nav::run(&root, cmd::nav::Move::Prev, cli.json),
        Commands::Jump { phase } => cmd::nav::run(&root, cmd::nav::Move::Jump(phase), cli.json),
        Commands::Gate => cmd::nav::run(&root, cmd::nav::Move::Gate, cli.json),
        Commands::Check { subcommand } => cmd::check::run(&root, subcommand, cli.json),
        Commands::Roles { subcommand } => cmd::roles::run(&root, subcommand, cli.json),
        Commands::Progress => cmd::progress::run(&root, cli.json),
        Commands::Templates { phase } => cmd::guide::list_templates(phase.as_deref(), cli.json),
        Commands::Guide => cmd::guide::run(&root, cli.json),
        Commands::Roadmap => cmd::roadmap::run(&root, cli.json),
        Commands::Home { subcommand } => cmd::home::run(&root, subcommand, cli.json),
        Commands::Sync { subcommand } => cmd::sync::run(&root, subcommand, cli.json),
        Commands::Config { subcommand } => cmd::config::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
