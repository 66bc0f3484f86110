//! CrewPilot library root.
//! Exposes the CLI parser, the high-level run() function and the internal
//! modules (storage, auth, prediction, views).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod ml;
pub mod models;
pub mod store;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => commands::init::handle(cli),
        Commands::Config { .. } => commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => commands::db::handle(&cli.command, cfg),
        Commands::Signup { .. } | Commands::Login => commands::auth::handle(cli, cfg),
        Commands::Dashboard { .. } => commands::dashboard::handle(cli, cfg),
        Commands::Worker { .. } => commands::worker::handle(cli, cfg),
        Commands::Task { .. } => commands::task::handle(cli, cfg),
        Commands::Predict { .. } | Commands::History { .. } => commands::predict::handle(cli, cfg),
        Commands::Model { .. } => commands::model::handle(cli, cfg),
        Commands::Analytics { .. } => commands::analytics::handle(cli, cfg),
        Commands::Activity { .. } => commands::activity::handle(cli, cfg),
        Commands::Settings { .. } => commands::settings::handle(cli, cfg),
        Commands::Shell => commands::shell::handle(cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    // `init` builds its own configuration; a broken file must not block it.
    let mut cfg = if matches!(cli.command, Commands::Init) {
        Config::default()
    } else {
        Config::load()?
    };

    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    dispatch(&cli, &cfg)
}
