use crate::cli::commands::{authenticate, print_json};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::header;
use crate::ui::views::render_dashboard;
use serde_json::json;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Dashboard { json } = &cli.command {
        let mut store = open_store(cfg)?;
        authenticate(cli, store.as_mut())?;

        let limit = cfg.recent_activity_limit;
        let stats = store.dashboard_stats(cfg.high_performance_threshold)?;
        let activities = store.recent_activities(limit)?;
        let predictions = store.recent_predictions(limit)?;

        if *json {
            return print_json(&json!({
                "stats": stats,
                "recent_activities": activities,
                "recent_predictions": predictions,
            }));
        }

        header("Dashboard");
        print!("{}", render_dashboard(&stats, &activities, &predictions));
    }
    Ok(())
}
