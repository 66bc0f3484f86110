use crate::config::Config;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::shell::Shell;
use std::io;

/// Start the interactive shell on stdin/stdout.
pub fn handle(cfg: &Config) -> AppResult<()> {
    let store = open_store(cfg)?;
    let mut shell = Shell::new(store, cfg.clone(), io::stdout());
    shell.run(io::stdin().lock())
}
