use crate::cli::commands::{authenticate, print_json};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::workers::WorkerLogic;
use crate::errors::AppResult;
use crate::ml::Predictor;
use crate::store::open_store;
use crate::ui::views::{render_history, render_prediction};

/// `predict` and `history`.
pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let mut store = open_store(cfg)?;
    authenticate(cli, store.as_mut())?;

    match &cli.command {
        Commands::Predict { worker_id, json } => {
            let worker = WorkerLogic::get(store.as_mut(), *worker_id)?;
            let prediction = Predictor::open(cfg).predict(store.as_mut(), worker.id)?;
            if *json {
                return print_json(&prediction);
            }
            print!("{}", render_prediction(&prediction, &worker.name));
        }
        Commands::History {
            worker_id,
            limit,
            json,
        } => {
            let rows = Predictor::open(cfg).history(store.as_mut(), *worker_id, (*limit).max(1))?;
            if *json {
                return print_json(&rows);
            }
            print!("{}", render_history(&rows));
        }
        _ => {}
    }
    Ok(())
}
