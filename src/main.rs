//! Agora CLI entrypoint.

use agora_runtime::cli::{ask_cmd, chat_cmd, converse_cmd, panel_cmd};
use agora_runtime::{
    config, ClusterConfig, JsonStore, Moderator, OpenAiClient, OpenAiConfig, PanelConfig, Roster,
    Surveyor,
};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "agora", version, about = "Synthetic opinion panel")]
struct Cli {
    /// Directory holding roster files and panel state (default: ~/.agora).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Emit machine-readable JSON instead of styled output.
    #[arg(long, global = true)]
    json: bool,

    /// Seed for the run's random choices, for reproducible runs.
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the panel a question and cluster the answers.
    Ask {
        question: String,
        /// How many roster members to ask.
        #[arg(long, default_value_t = 20)]
        panel: usize,
        /// Pin the cluster count instead of auto-detecting it.
        #[arg(long)]
        clusters: Option<usize>,
    },
    /// Run a synthetic conversation between respondents, then re-cluster.
    Converse {
        /// Participant ids, comma separated.
        #[arg(value_delimiter = ',', required = true)]
        ids: Vec<u32>,
    },
    /// Chat directly with one respondent.
    Chat { id: u32, message: String },
    /// Show every respondent's current answer.
    Panel,
    /// Show the latest cluster groupings.
    Clusters,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("agora=info".parse().unwrap()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(config::default_data_dir);
    info!(data_dir = %data_dir.display(), "starting agora v{}", env!("CARGO_PKG_VERSION"));

    let roster = Arc::new(Roster::load(
        &data_dir.join("roster.json"),
        Some(&data_dir.join("roster-extra.json")),
        Some(&data_dir.join("roster-fallback.json")),
    ));
    let store = Arc::new(JsonStore::open(data_dir.join("panel.json"))?);

    let mut rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match cli.command {
        Command::Panel => panel_cmd::run_panel(store.as_ref(), &roster, cli.json).await,
        Command::Clusters => panel_cmd::run_clusters(store.as_ref(), cli.json).await,
        command => {
            if roster.is_empty() {
                bail!(
                    "no roster profiles found under {} — add a roster.json first",
                    data_dir.display()
                );
            }

            let client = Arc::new(OpenAiClient::new(OpenAiConfig::from_env()?));
            let panel_config = PanelConfig::default();
            let surveyor = Arc::new(Surveyor::new(
                client.clone(),
                client,
                store,
                roster,
                ClusterConfig::default(),
                panel_config.max_concurrent_queries,
            ));

            match command {
                Command::Ask {
                    question,
                    panel,
                    clusters,
                } => {
                    ask_cmd::run(&surveyor, &question, panel, clusters, &mut rng, cli.json).await
                }
                Command::Converse { ids } => {
                    let moderator = Moderator::new(surveyor, panel_config.turn_budget);
                    converse_cmd::run(&moderator, &ids, &mut rng, cli.json).await
                }
                Command::Chat { id, message } => {
                    let moderator = Moderator::new(surveyor, panel_config.turn_budget);
                    chat_cmd::run(&moderator, id, &message, cli.json).await
                }
                Command::Panel | Command::Clusters => unreachable!(),
            }
        }
    }
}
