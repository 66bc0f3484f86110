use crate::cli::commands::{authenticate, print_json};
use crate::cli::parser::{Cli, Commands, WorkerAction};
use crate::config::Config;
use crate::core::workers::{WorkerLogic, form_from};
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::{info, success, warning};
use crate::ui::views::{render_worker_cards, render_worker_detail, render_worker_table};
use crate::utils::validation::WorkerForm;
use serde_json::json;
use std::io::{self, Write};

/// Ask a yes/no confirmation from the user
fn ask_confirmation(prompt: &str) -> bool {
    warning(prompt);
    print!("Confirm [y/N]: ");
    let _ = io::stdout().flush();

    let mut s = String::new();
    if io::stdin().read_line(&mut s).is_ok() {
        matches!(s.trim().to_lowercase().as_str(), "y" | "yes")
    } else {
        false
    }
}

fn overwrite(slot: &mut String, value: &Option<String>) {
    if let Some(v) = value {
        *slot = v.clone();
    }
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Worker { action } = &cli.command else {
        return Ok(());
    };
    let mut store = open_store(cfg)?;
    authenticate(cli, store.as_mut())?;

    match action {
        WorkerAction::Add {
            name,
            position,
            salary,
            status,
            score,
        } => {
            let form = WorkerForm {
                name: name.clone(),
                position: position.clone(),
                salary: salary.clone(),
                status: status.clone(),
                performance_score: score.clone(),
            };
            let w = WorkerLogic::create(store.as_mut(), &form)?;
            success(format!("Worker '{}' added with id {}", w.name, w.id));
        }

        WorkerAction::List { cards, json } => {
            if *cards {
                let overviews = store.worker_overviews()?;
                if *json {
                    return print_json(&overviews);
                }
                print!("{}", render_worker_cards(&overviews));
            } else {
                let workers = store.list_workers()?;
                if *json {
                    return print_json(&workers);
                }
                print!("{}", render_worker_table(&workers));
            }
        }

        WorkerAction::Show { id, json } => {
            let worker = WorkerLogic::get(store.as_mut(), *id)?;
            let tasks = store.list_tasks(Some(*id), false)?;
            if *json {
                return print_json(&json!({ "worker": worker, "tasks": tasks }));
            }
            print!("{}", render_worker_detail(&worker, &tasks));
        }

        WorkerAction::Update {
            id,
            name,
            position,
            salary,
            status,
            score,
        } => {
            let mut form = form_from(&WorkerLogic::get(store.as_mut(), *id)?);
            overwrite(&mut form.name, name);
            overwrite(&mut form.position, position);
            overwrite(&mut form.salary, salary);
            overwrite(&mut form.status, status);
            overwrite(&mut form.performance_score, score);

            let w = WorkerLogic::update(store.as_mut(), *id, &form)?;
            success(format!("Worker '{}' updated", w.name));
        }

        WorkerAction::Delete { id, yes } => {
            let worker = WorkerLogic::get(store.as_mut(), *id)?;
            let prompt = format!(
                "Delete worker #{} '{}' with all tasks and predictions? This action is irreversible.",
                worker.id, worker.name
            );
            if !*yes && !ask_confirmation(&prompt) {
                info("Operation cancelled.");
                return Ok(());
            }
            let w = WorkerLogic::delete(store.as_mut(), *id)?;
            success(format!("Worker '{}' has been deleted.", w.name));
        }
    }
    Ok(())
}
