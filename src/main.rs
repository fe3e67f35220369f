use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::graph::OutputFormat;

#[derive(Parser)]
#[command(name = "sg")]
#[command(about = "Stepgraph - a lightweight step tracker with dependency graphs")]
#[command(version)]
struct Cli {
    /// Path to the stepgraph directory (default: .stepgraph in current dir)
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Output as JSON for machine consumption
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new stepgraph in the current directory
    Init,

    /// Add a new step
    Add {
        /// Step title
        title: String,

        /// Step ID (auto-generated from the title if not provided)
        #[arg(long)]
        id: Option<String>,

        /// Detailed description (body, acceptance criteria, etc.)
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Steps this one depends on (can specify multiple)
        #[arg(long = "depends-on", value_delimiter = ',', num_args = 1..)]
        depends_on: Vec<String>,
    },

    /// Mark a step as done
    Done {
        /// Step ID to mark as done
        id: String,
    },

    /// Mark a step as not done again
    Todo {
        /// Step ID to reset
        id: String,
    },

    /// Add a dependency: STEP requires DEPENDENCY first
    Dep {
        /// The dependent step
        step: String,

        /// The prerequisite step
        dependency: String,
    },

    /// Remove a dependency edge
    Undep {
        /// The dependent step
        step: String,

        /// The prerequisite step
        dependency: String,
    },

    /// List all steps
    List {
        /// Only completed steps
        #[arg(long, conflicts_with = "pending")]
        completed: bool,

        /// Only pending steps
        #[arg(long)]
        pending: bool,
    },

    /// Check the graph for issues (cycles, orphan references)
    Check,

    /// Show the dependency graph layout
    Graph {
        /// Output format: grid, dot, or json
        #[arg(long, default_value = "grid")]
        format: String,
    },
}

fn main() -> Result<()> {
    logging::init_logging();

    let cli = Cli::parse();
    let dir = cli.dir.unwrap_or_else(|| PathBuf::from(".stepgraph"));

    match cli.command {
        Commands::Init => commands::init::run(&dir),
        Commands::Add {
            title,
            id,
            description,
            depends_on,
        } => commands::add::run(
            &dir,
            &title,
            id.as_deref(),
            description.as_deref(),
            &depends_on,
        ),
        Commands::Done { id } => commands::done::run(&dir, &id, true),
        Commands::Todo { id } => commands::done::run(&dir, &id, false),
        Commands::Dep { step, dependency } => commands::dep::run_add(&dir, &step, &dependency),
        Commands::Undep { step, dependency } => {
            commands::dep::run_remove(&dir, &step, &dependency)
        }
        Commands::List { completed, pending } => {
            let filter = if completed {
                Some(true)
            } else if pending {
                Some(false)
            } else {
                None
            };
            commands::list::run(&dir, filter, cli.json)
        }
        Commands::Check => commands::check::run(&dir, cli.json),
        Commands::Graph { format } => {
            let format = if cli.json {
                OutputFormat::Json
            } else {
                format.parse().map_err(|e: String| anyhow::anyhow!(e))?
            };
            commands::graph::run(&dir, format)
        }
    }
}
