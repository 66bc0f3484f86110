use crate::cli::commands::{authenticate, print_json};
use crate::cli::parser::{Cli, Commands, ModelAction};
use crate::config::Config;
use crate::errors::AppResult;
use crate::ml::Predictor;
use crate::ml::predictor::load_training_csv;
use crate::store::open_store;
use crate::ui::messages::{header, success};
use crate::ui::views::{render_model_info, render_training};
use std::path::Path;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Model { action } = &cli.command else {
        return Ok(());
    };
    let mut store = open_store(cfg)?;
    authenticate(cli, store.as_mut())?;

    match action {
        ModelAction::Train { file } => {
            let (x, y) = load_training_csv(Path::new(file))?;
            let mut predictor = Predictor::load_or_init(cfg)?;
            let report = predictor.train(&x, &y)?;
            success(format!("Model trained and saved to {}", cfg.model_path().display()));
            print!("{}", render_training(&report));
        }
        ModelAction::Info { json } => {
            let info = Predictor::load_or_init(cfg)?.info();
            if *json {
                return print_json(&info);
            }
            header("Model");
            print!("{}", render_model_info(&info));
        }
    }
    Ok(())
}
