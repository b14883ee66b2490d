//! `trovectl`: manage marketplace listings and their photos from a terminal.

use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, info};
use trove_config::loader::CONFIG_PATH_VAR;
use trove_config::{ClientConfig, ConfigLoad, load_env_file};
use trove_core::services::ClientServices;
use trove_core::telemetry::init_tracing;

mod cli;
mod commands;
mod prompt;

use cli::{Cli, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let load = load_config(cli.config.as_deref())?;
    // A second subscriber (tests, embedding) is not an error worth failing on.
    let _ = init_tracing(&load.config.logging.filter);
    if load.env_file_loaded {
        info!("loaded .env file");
    }
    debug!(source = ?load.source, base_url = %load.config.api.base_url, "configuration ready");

    let services = ClientServices::from_config(&load.config)
        .context("could not set up the marketplace client")?;

    match cli.command {
        Command::Listings { owner, json } => commands::listings(&services, owner, json).await,
        Command::Create(args) => commands::create(&services, args).await,
        Command::Update { id, listing } => commands::update(&services, id, listing).await,
        Command::Delete { id, owner, yes } => commands::delete(&services, id, &owner, yes).await,
        Command::Photo { id, out } => commands::photo(&services, id, &out).await,
    }
}

/// Environment-driven load, with `--config` standing in for the path variable.
fn load_config(config_path: Option<&Path>) -> Result<ConfigLoad> {
    let Some(path) = config_path else {
        return ClientConfig::load_from_env().context("loading configuration");
    };

    let path = path.display().to_string();
    let env_file_loaded =
        load_env_file().with_context(|| format!("loading configuration from {path}"))?;
    let mut load = ClientConfig::load_with(
        |name| {
            if name == CONFIG_PATH_VAR {
                Some(path.clone())
            } else {
                std::env::var(name).ok()
            }
        },
        Path::new("."),
    )
    .with_context(|| format!("loading configuration from {path}"))?;
    load.env_file_loaded = env_file_loaded;
    Ok(load)
}
