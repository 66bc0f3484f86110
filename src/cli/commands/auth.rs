use crate::cli::commands::authenticate;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::auth::AuthLogic;
use crate::errors::{AppError, AppResult};
use crate::store::open_store;
use crate::ui::messages::{info, success};
use crate::utils::formatting::format_date;

/// `signup` and `login`.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;

    match &cli.command {
        Commands::Signup {
            username,
            email,
            confirm,
        } => {
            let password = cli
                .password
                .as_deref()
                .ok_or_else(|| AppError::validation("All fields are required"))?;
            let user = AuthLogic::register(store.as_mut(), username, email, password, confirm)?;
            success(format!("Account '{}' created. You can now log in.", user.username));
        }
        Commands::Login => {
            let user = authenticate(cli, store.as_mut())?;
            success(format!("Welcome, {}", user.username));
            if let Some(at) = user.last_login {
                info(format!("Login recorded at {}", format_date(&at)));
            }
        }
        _ => {}
    }
    Ok(())
}
