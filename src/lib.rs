pub mod checksum;
pub mod config;
pub mod discover;
pub mod error;
pub mod fetch;
pub mod load_config;
pub mod mirror;
pub mod release;
pub mod retry;
pub mod transform;
pub mod verify;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::fetch::HttpTransport;
use crate::load_config::load_config;
use crate::mirror::{mirror, Outcome};
use crate::release::ReleaseClient;

#[derive(Parser)]
#[clap(
    name = "release-mirror",
    version,
    about = "Mirror the newest upstream CE release image into a versioned release store"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the mirror pipeline once using the given config file
    Mirror {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Mirror { config } => {
            let config = load_config(config)?;
            config.trace_loaded();
            let store = ReleaseClient::from_config(&config.release)
                .map_err(|e| anyhow::anyhow!("Failed to construct release client: {e}"))?;
            let transport = HttpTransport::new();
            println!("Mirror run starting...");
            match mirror(&config, &store, &transport).await {
                Ok(report) => {
                    match &report.outcome {
                        Outcome::Published { assets } => {
                            println!(
                                "Mirror run complete: published {} ({} assets).",
                                report.version,
                                assets.len()
                            );
                        }
                        Outcome::AlreadyReleased => {
                            println!(
                                "Mirror run complete: version {} already released, nothing to do.",
                                report.version
                            );
                        }
                    }
                    println!("Report:");
                    println!("{report:#?}");
                    Ok(())
                }
                Err(e) => {
                    eprintln!("[ERROR] Mirror run failed: {e}");
                    Err(e.into())
                }
            }
        }
    }
}
