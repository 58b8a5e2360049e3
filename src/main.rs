//! sbom-base-images: enrich container-image SBOMs with base image provenance
//!
//! A format-agnostic SBOM update tool for `CycloneDX` and SPDX documents.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use sbom_base_images::{cli, UpdateConfig};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sbom-base-images")]
#[command(version)]
#[command(about = "Enrich container-image SBOMs with base image provenance", long_about = None)]
#[command(after_help = "EXAMPLES:
    # Merge base image data into an SBOM produced by the build
    sbom-base-images update \\
        --sbom sbom.cdx.json \\
        --parsed-dockerfile parsed-dockerfile.json \\
        --base-images-digests base-images-digests.txt")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `update` subcommand
#[derive(Parser)]
struct UpdateArgs {
    /// Path to the SBOM file to update in place (CycloneDX or SPDX JSON)
    #[arg(long)]
    sbom: PathBuf,

    /// Path to the parsed Dockerfile in JSON format, as extracted by
    /// dockerfile-json during the buildah task
    #[arg(long)]
    parsed_dockerfile: PathBuf,

    /// Path to the base image digest mapping generated from the output of
    /// 'buildah images'
    #[arg(long)]
    base_images_digests: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Update an SBOM file with base image data
    Update(UpdateArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match cli.command {
        Commands::Update(args) => {
            let config = UpdateConfig {
                sbom: args.sbom,
                parsed_dockerfile: args.parsed_dockerfile,
                base_images_digests: args.base_images_digests,
            };
            cli::run_update(&config)
        }

        Commands::Completions { shell } => {
            generate(
                shell,
                &mut Cli::command(),
                "sbom-base-images",
                &mut io::stdout(),
            );
            Ok(())
        }
    }
}
