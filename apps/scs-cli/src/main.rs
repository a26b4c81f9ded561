//! scs - command-line client for SCS object storage.
//!
//! # Usage
//!
//! ```text
//! scs --config config.json buckets
//! scs -b photos put cat.jpg ./cat.jpg --meta color=black
//! scs -b photos get cat.jpg --range 0-1023 --out head.bin
//! scs -b isos upload centos.iso ./centos.iso --part-size 16
//! ```
//!
//! # Environment Variables
//!
//! | Variable | Description |
//! |----------|-------------|
//! | `SCS_ACCESS_KEY` / `SCS_SECRET_KEY` | Key pair |
//! | `SCS_ENDPOINT` | Endpoint template |
//! | `SCS_BUCKET` | Bucket for object commands |
//! | `SCS_CONFIG` | JSON config file |
//! | `LOG_LEVEL` | Log level filter |
//! | `RUST_LOG` | Fine-grained tracing filter (overrides `LOG_LEVEL`) |

mod cli;
mod commands;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use scs_client::{ClientConfig, Scs};
use serde::Deserialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

/// Config file format: a flat JSON object.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    accesskey: Option<String>,
    secretkey: Option<String>,
    endpoint: Option<String>,
    bucket: Option<String>,
}

/// Initialize the tracing subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to the `LOG_LEVEL` config value.
fn init_tracing(log_level: &str) -> Result<()> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level)
            .with_context(|| format!("invalid log level filter: {log_level}"))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    Ok(())
}

fn load_file_config(path: &Path) -> Result<FileConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Merge environment, config file and flags, in increasing precedence.
fn resolve_config(cli: &Cli) -> Result<(ClientConfig, Option<String>)> {
    let mut config = ClientConfig::from_env();
    let file = match &cli.config {
        Some(path) => load_file_config(path)?,
        None => FileConfig::default(),
    };

    if let Some(v) = file.accesskey {
        config.access_key = v;
    }
    if let Some(v) = file.secretkey {
        config.secret_key = v;
    }
    if let Some(v) = file.endpoint {
        config.endpoint = v;
    }
    if let Some(v) = &cli.endpoint {
        config.endpoint.clone_from(v);
    }
    if cli.debug {
        config.log_level = String::from("debug");
    }

    let bucket = cli.bucket.clone().or(file.bucket);
    Ok((config, bucket))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (config, bucket) = resolve_config(&cli)?;

    init_tracing(&config.log_level)?;
    debug!(endpoint = %config.endpoint, bucket = ?bucket, "resolved configuration");

    let scs = Scs::new(&config).context("failed to create client")?;
    commands::run(&scs, bucket.as_deref(), cli.command).await
}
