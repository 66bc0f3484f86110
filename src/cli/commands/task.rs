use crate::cli::commands::authenticate;
use crate::cli::parser::{Cli, Commands, TaskAction};
use crate::config::Config;
use crate::core::tasks::TaskLogic;
use crate::errors::AppResult;
use crate::store::open_store;
use crate::ui::messages::success;
use crate::ui::views::render_tasks;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let Commands::Task { action } = &cli.command else {
        return Ok(());
    };
    let mut store = open_store(cfg)?;
    authenticate(cli, store.as_mut())?;

    match action {
        TaskAction::Add {
            worker_id,
            description,
        } => {
            let task = TaskLogic::add(store.as_mut(), *worker_id, &description.join(" "))?;
            success(format!("Task {} assigned to worker {}", task.id, task.worker_id));
        }
        TaskAction::Done { task_id } => {
            let task = TaskLogic::complete(store.as_mut(), *task_id)?;
            success(format!("Task {} completed", task.id));
        }
        TaskAction::List { worker_id, open } => {
            let tasks = store.list_tasks(*worker_id, *open)?;
            print!("{}", render_tasks(&tasks));
        }
    }
    Ok(())
}
