//! reward - local development environment orchestrator CLI

use clap::{Parser, Subcommand};
use reward_cli::commands;
use reward_config::GlobalConfig;
use reward_core::{Extractor, LocalShell, MeshOrchestrator, Platform};
use reward_provider::create_engine;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "reward")]
#[command(author, version, about = "Local development environment orchestrator", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shared services on environment networks
    Network {
        #[command(subcommand)]
        command: NetworkCommands,
    },

    /// Look up running containers
    Container {
        #[command(subcommand)]
        command: ContainerCommands,
    },

    /// Download and install a helper binary
    Install {
        /// Release archive URL
        url: String,
        /// Executable to extract from the archive
        executable: String,
        /// Installation directory (defaults to the reward data directory)
        #[arg(long)]
        dest: Option<String>,
        /// Skip the download when this version (or newer) is installed
        #[arg(long)]
        version: Option<String>,
    },

    /// Extract a zip archive
    Unzip {
        /// Zip archive to extract
        file: PathBuf,
        /// Destination directory
        dest: PathBuf,
    },
}

#[derive(Subcommand)]
enum NetworkCommands {
    /// Attach the shared services to a network
    Connect { network: String },
    /// Detach the shared services from a network
    Disconnect { network: String },
    /// Check whether a network exists (exit status 1 if not)
    Exists { network: String },
}

#[derive(Subcommand)]
enum ContainerCommands {
    /// Print the ID of the single running container whose name contains NAME
    Find { name: String },
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run() -> anyhow::Result<i32> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("REWARD_LOG").unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = match &cli.config {
        Some(path) => GlobalConfig::load_from(path)?,
        None => GlobalConfig::load().unwrap_or_else(|e| {
            tracing::warn!("Ignoring unusable config, using defaults: {}", e);
            GlobalConfig::default()
        }),
    };

    match cli.command {
        Commands::Install {
            url,
            executable,
            dest,
            version,
        } => {
            let shell = LocalShell::with_capture_output(true);
            let extractor = Extractor::new(Platform::current());
            commands::install(
                &shell,
                &extractor,
                &url,
                &executable,
                dest.as_deref(),
                version.as_deref(),
            )
            .await?;
        }
        Commands::Unzip { file, dest } => {
            commands::unzip(&file, &dest)?;
        }
        Commands::Network { command } => {
            let mesh = connect_mesh(&config).await?;
            match command {
                NetworkCommands::Connect { network } => {
                    commands::network_peer(&mesh, "connect", &network).await?;
                }
                NetworkCommands::Disconnect { network } => {
                    commands::network_peer(&mesh, "disconnect", &network).await?;
                }
                NetworkCommands::Exists { network } => {
                    if !commands::network_exists(&mesh, &network).await? {
                        return Ok(1);
                    }
                }
            }
        }
        Commands::Container { command } => {
            let mesh = connect_mesh(&config).await?;
            match command {
                ContainerCommands::Find { name } => {
                    commands::container_find(&mesh, &name).await?;
                }
            }
        }
    }

    Ok(0)
}

async fn connect_mesh(config: &GlobalConfig) -> anyhow::Result<MeshOrchestrator> {
    let engine = create_engine(config).await?;
    Ok(MeshOrchestrator::new(engine, config.peering.clone()))
}
