use crate::cli::commands::authenticate;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::auth::{AuthLogic, Session};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{header, success};
use crate::ui::views::render_settings;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Settings { username, email } = &cli.command {
        let mut store = open_store(cfg)?;
        let mut session = Session::new();
        session.sign_in(authenticate(cli, store.as_mut())?);

        if username.is_some() || email.is_some() {
            let current = session.require()?.clone();
            let user = AuthLogic::update_identity(
                store.as_mut(),
                &mut session,
                username.as_deref().unwrap_or(&current.username),
                email.as_deref().unwrap_or(&current.email),
            )?;
            success(format!("Account updated: {} <{}>", user.username, user.email));
        }

        header("Settings");
        print!("{}", render_settings(session.require()?, cfg));
    }
    Ok(())
}
