use crate::cli::parser::Cli;
use crate::config::{Backend, Config};
use crate::errors::AppResult;
use crate::ml::Predictor;
use crate::models::activity::NewActivity;
use crate::store::open_store;
use crate::ui::messages::{info, success, warning};

/// Handle the `init` command
///
/// This initializes:
///  - the config directory and file (left alone in test mode)
///  - the SQLite database with all pending migrations
///  - the model artifact, when none exists yet
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.clone(), cli.test)?;

    println!("⚙️  Initializing CrewPilot…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", cfg.database_path().display());

    let mut store = open_store(&cfg)?;
    if cfg.backend == Backend::Memory {
        warning("Backend is 'memory': data lives only for the current process.");
    }

    let predictor = Predictor::load_or_init(&cfg)?;
    info(format!("Model       : {}", predictor.info().path));

    // non-blocking
    if let Err(e) = store.log_activity(&NewActivity::system(format!(
        "Database initialized at {}",
        cfg.database_path().display()
    ))) {
        warning(format!("Failed to record the init activity: {}", e));
    }

    success("CrewPilot initialization completed!");
    Ok(())
}
