// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! `tether`: drive a reference ballistic world through the sync layer.
//!
//! Configs live as `<profile>.json` under `--config-dir` (default: the user
//! config directory). Missing fields fall back to defaults.

mod ballistic;
mod simulate;
mod store;

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tether_core::config::{ConfigService, SimConfigFile};
use tether_core::SimConfig;
use tracing_subscriber::EnvFilter;

use crate::simulate::SimulateArgs;
use crate::store::FsConfigStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Tether developer CLI")]
struct Cli {
    /// Directory holding `<profile>.json` config files
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Config profile to load
    #[arg(long, global = true, default_value = "world")]
    profile: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Drop balls onto the ground and report interpolated poses and events
    Simulate(SimulateArgs),
    /// Inspect or write the world config
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective config as JSON
    Show,
    /// Write the default config for the profile
    Init {
        /// Overwrite an existing profile
        #[arg(long)]
        force: bool,
    },
}

fn open_store(cli: &Cli) -> Result<FsConfigStore> {
    let store = match &cli.config_dir {
        Some(dir) => FsConfigStore::in_dir(dir),
        None => FsConfigStore::user(),
    };
    store.context("open config store")
}

fn load_config(service: &ConfigService<FsConfigStore>, profile: &str) -> Result<SimConfig> {
    service
        .load_sim_config(profile)
        .with_context(|| format!("load config profile `{profile}`"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("warn".parse()?))
        .with_writer(io::stderr)
        .init();

    let service = ConfigService::new(open_store(&cli)?);
    let mut out = io::stdout().lock();
    match &cli.command {
        Command::Simulate(args) => {
            let config = load_config(&service, &cli.profile)?;
            simulate::run(args, config, &mut out)?;
        }
        Command::Config(ConfigCommand::Show) => {
            let config = load_config(&service, &cli.profile)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&config)?)?;
        }
        Command::Config(ConfigCommand::Init { force }) => {
            let store = service.into_inner();
            let path = store.path_for(&cli.profile);
            if store.contains(&cli.profile) && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            ConfigService::new(store)
                .save(&cli.profile, &SimConfigFile::default())
                .context("write default config")?;
            writeln!(out, "wrote {}", path.display())?;
        }
    }
    out.flush()?;
    Ok(())
}
