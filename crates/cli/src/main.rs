//! Hearth CLI: the main entry point.
//!
//! Commands:
//! - `context` : Assemble the context for a message and print it
//! - `memory`  : Append or list memory records
//! - `dialogue`: Append a turn to the transcript
//! - `config`  : Show configuration or triage config proposals

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "hearth",
    about = "Hearth: memory-aware context assembly for a companion assistant",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the context for a message
    Context {
        /// Owner (user) id
        #[arg(short, long)]
        owner: String,

        /// The incoming message
        #[arg(short, long)]
        query: String,

        /// Override the character budget
        #[arg(short, long)]
        budget: Option<usize>,

        /// Print blocks and metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Memory record commands
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Transcript commands
    Dialogue {
        #[command(subcommand)]
        action: DialogueAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Append a memory record
    Add {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long)]
        summary: String,

        /// profile, preference, project, relationship, observation, episode
        #[arg(short, long, default_value = "observation")]
        kind: String,

        /// Weight in [0, 1]
        #[arg(short, long, default_value_t = 0.5)]
        importance: f64,

        /// Tag (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,

        #[arg(long, default_value = "cli")]
        source: String,
    },

    /// List the most recent records
    Recent {
        #[arg(short, long)]
        owner: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand)]
enum DialogueAction {
    /// Append a turn
    Append {
        #[arg(short, long)]
        owner: String,

        /// user or assistant
        #[arg(short, long)]
        role: String,

        #[arg(short, long)]
        content: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Sort proposed config changes by zone (nothing is applied)
    Triage {
        /// JSON file holding an array of proposals
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Context {
            owner,
            query,
            budget,
            json,
        } => commands::context::run(&owner, &query, budget, json).await?,
        Commands::Memory { action } => match action {
            MemoryAction::Add {
                owner,
                summary,
                kind,
                importance,
                tags,
                source,
            } => commands::memory::add(&owner, &summary, &kind, importance, tags, &source).await?,
            MemoryAction::Recent { owner, limit } => commands::memory::recent(&owner, limit).await?,
        },
        Commands::Dialogue { action } => match action {
            DialogueAction::Append {
                owner,
                role,
                content,
            } => commands::dialogue::append(&owner, &role, &content).await?,
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
            ConfigAction::Triage { file } => commands::config_cmd::triage(&file).await?,
        },
    }

    Ok(())
}
