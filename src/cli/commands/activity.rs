use crate::cli::commands::authenticate;
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::header;
use crate::ui::views::render_activities;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Activity { limit } = &cli.command {
        let mut store = open_store(cfg)?;
        authenticate(cli, store.as_mut())?;

        let rows = store.recent_activities(limit.unwrap_or(cfg.recent_activity_limit))?;
        header("Recent activity");
        print!("{}", render_activities(&rows));
    }
    Ok(())
}
