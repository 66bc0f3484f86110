use crate::cli::commands::{authenticate, print_json};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::analytics::AnalyticsLogic;
use crate::errors::{AppError, AppResult};
use crate::store::open_store;
use crate::ui::messages::header;
use crate::ui::views::render_analytics;
use crate::utils::date;
use chrono::Duration;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Analytics {
        metric,
        from,
        to,
        worker_id,
        json,
    } = &cli.command
    {
        let parse = |s: &String| {
            date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
        };
        let to = match to {
            Some(s) => parse(s)?,
            None => date::today(),
        };
        let from = match from {
            Some(s) => parse(s)?,
            None => to - Duration::days(cfg.prediction_window_days),
        };

        let mut store = open_store(cfg)?;
        authenticate(cli, store.as_mut())?;

        let summary = AnalyticsLogic::summarize(store.as_mut(), *metric, from, to, *worker_id)?;
        if *json {
            return print_json(&summary);
        }
        header("Analytics");
        print!("{}", render_analytics(&summary));
    }
    Ok(())
}
