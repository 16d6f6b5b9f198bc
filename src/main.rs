mod cli;
mod server;
mod tools;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use finsage::config::FinsageConfig;

#[derive(Parser)]
#[command(name = "finsage", version, about = "Personal finance advisor MCP server")]
struct Cli {
    /// Config file (defaults to ~/.finsage/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the MCP server (transport from `server.transport`)
    Serve,
    /// Manage the embedding model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// Curate the static FAQ corpus
    Faq {
        #[command(subcommand)]
        action: FaqAction,
    },
    /// Resolve a question through the static, approved and generated tiers
    Ask {
        question: String,
        /// Identifier stored with a generated answer
        #[arg(long)]
        user: Option<String>,
    },
    /// List AI answers awaiting approval
    Pending {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Approve an AI answer so it can answer later questions
    Approve { id: String },
    /// Withdraw approval from an AI answer
    Revoke { id: String },
    /// Monthly contribution needed to reach a savings goal
    Savings {
        #[arg(long)]
        goal: f64,
        #[arg(long)]
        months: i64,
        /// Desired annual return as a fraction (0.0-0.30)
        #[arg(long, default_value_t = 0.0)]
        rate: f64,
        /// Ask the advisor for a short narrative
        #[arg(long)]
        narrative: bool,
    },
    /// Five-year projection of a set of holdings
    Portfolio {
        /// Holding as CLASS=VALUE, e.g. stock=1000 (repeatable)
        #[arg(long = "asset", required = true)]
        assets: Vec<String>,
        /// Risk tolerance: low, medium or high
        #[arg(long)]
        risk: String,
        #[arg(long)]
        narrative: bool,
    },
    /// Recent projections, newest first
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Knowledge base statistics
    Stats,
}

#[derive(Subcommand)]
enum ModelAction {
    /// Download the embedding model to ~/.finsage/models/
    Download,
}

#[derive(Subcommand)]
enum FaqAction {
    /// Embed and upsert the [[faq]] entries of a TOML file
    Import { file: PathBuf },
    /// Re-embed every static question with the configured model
    Reembed,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => FinsageConfig::load_from(path)?,
        None => FinsageConfig::load()?,
    };

    // stderr keeps stdout clean for MCP JSON-RPC
    let filter = EnvFilter::try_new(&config.server.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Serve => server::serve(config).await?,
        Command::Model { action } => match action {
            ModelAction::Download => cli::model_download(&config.embedding).await?,
        },
        Command::Faq { action } => match action {
            FaqAction::Import { file } => cli::faq::import(&config, &file).await?,
            FaqAction::Reembed => cli::faq::reembed(&config).await?,
        },
        Command::Ask { question, user } => {
            cli::ask::ask(&config, &question, user.as_deref()).await?
        }
        Command::Pending { limit } => cli::moderation::pending(&config, limit)?,
        Command::Approve { id } => cli::moderation::set_approval(&config, &id, true)?,
        Command::Revoke { id } => cli::moderation::set_approval(&config, &id, false)?,
        Command::Savings {
            goal,
            months,
            rate,
            narrative,
        } => cli::project::savings(&config, goal, months, rate, narrative).await?,
        Command::Portfolio {
            assets,
            risk,
            narrative,
        } => cli::project::portfolio(&config, &assets, &risk, narrative).await?,
        Command::History { limit } => cli::history::history(&config, limit)?,
        Command::Stats => cli::stats::stats(&config)?,
    }

    Ok(())
}
