//! Subcommand handlers. Each `handle` receives the parsed command and the
//! loaded configuration; gated commands authenticate first.

pub mod activity;
pub mod analytics;
pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod init;
pub mod model;
pub mod predict;
pub mod settings;
pub mod shell;
pub mod task;
pub mod worker;

use crate::cli::parser::Cli;
use crate::core::auth::AuthLogic;
use crate::errors::{AppError, AppResult};
use crate::models::user::User;
use crate::store::Store;
use serde::Serialize;

/// Sign in with the global `--user`/`--password` (or their env vars).
pub fn authenticate(cli: &Cli, store: &mut dyn Store) -> AppResult<User> {
    match (&cli.user, &cli.password) {
        (Some(u), Some(p)) => AuthLogic::login(store, u, p),
        _ => Err(AppError::NotAuthenticated),
    }
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> AppResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
