//! Mocktrial CLI — the main entry point.
//!
//! Commands:
//! - `onboard`   — Write a default config file
//! - `simulate`  — Run a full proceeding over a local document
//! - `gateway`   — Start the HTTP API server
//! - `kb`        — List the legal knowledge base
//! - `status`    — Show effective configuration
//! - `doctor`    — Diagnose configuration, knowledge base and provider

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "mocktrial",
    about = "Mocktrial — educational courtroom simulator (not legal advice)",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Simulate a trial over a case document
    Simulate {
        /// Plain-text case document
        file: PathBuf,

        /// Case title (defaults to the file name)
        #[arg(short, long)]
        title: Option<String>,

        /// Model to use, optionally prefixed with a provider (`openai/gpt-4o-mini`)
        #[arg(short, long, env = "MOCKTRIAL_MODEL")]
        model: Option<String>,

        /// Sampling temperature (0.0 – 2.0)
        #[arg(long)]
        temperature: Option<f32>,

        /// Sampling seed forwarded to the provider
        #[arg(long)]
        seed: Option<u64>,

        /// How strictly the jury applies the burden of proof (0.0 – 1.0)
        #[arg(long)]
        strictness: Option<f32>,

        /// Upper bound on cross-examination turns
        #[arg(long)]
        max_turns: Option<u32>,

        /// Also write the transcript to this file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List knowledge-base principles
    Kb,

    /// Show system status
    Status,

    /// Diagnose system health
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Simulate {
            file,
            title,
            model,
            temperature,
            seed,
            strictness,
            max_turns,
            export,
        } => {
            commands::simulate::run(commands::simulate::SimulateOptions {
                file,
                title,
                model,
                temperature,
                seed,
                strictness,
                max_turns,
                export,
            })
            .await?
        }
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Kb => commands::kb::run().await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
