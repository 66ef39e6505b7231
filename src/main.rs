use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use trackhaul::config::{AppConfig, CliConfig, FileConfig};
use trackhaul::pipeline;
use trackhaul::RunId;

#[derive(Parser, Debug)]
#[clap(about = "Playlist feature pipeline: extract, stage and load track audio features")]
struct CliArgs {
    /// Path to the TOML config file.
    #[clap(short, long)]
    pub config: PathBuf,

    /// Run identifier, an 8-digit calendar date (YYYYMMDD).
    #[clap(long)]
    pub run_id: String,

    /// Playlist to snapshot; overrides catalog.playlist_id from the config file.
    #[clap(long)]
    pub playlist_id: Option<String>,

    /// Destination table; overrides warehouse.table from the config file.
    #[clap(long)]
    pub table: Option<String>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Snapshot the playlist and stage the feature table.
    Extract,
    /// Load an already staged feature table into the warehouse.
    Load,
    /// Extract then load.
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .unwrap();

    // Validate before touching any external system.
    let run_id = RunId::parse(&cli_args.run_id)?;

    let cli_config = CliConfig {
        playlist_id: cli_args.playlist_id.clone(),
        table: cli_args.table.clone(),
    };
    let file_config = FileConfig::load(&cli_args.config)?;
    let config = AppConfig::resolve(&cli_config, Some(file_config))?;

    match cli_args.command {
        Command::Extract => {
            pipeline::run_extract(&config, &run_id).await?;
        }
        Command::Load => {
            pipeline::run_load(&config, &run_id).await?;
        }
        Command::Run => {
            pipeline::run_extract(&config, &run_id).await?;
            pipeline::run_load(&config, &run_id).await?;
        }
    }

    info!("Run {} finished", run_id);
    Ok(())
}
