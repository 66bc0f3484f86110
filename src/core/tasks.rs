use crate::errors::AppResult;
use crate::models::task::{Task, WorkSample};
use crate::store::Store;
use crate::utils::validation::validate_task_description;
use rand::Rng;

/// Synthetic work figures recorded with each task event:
/// 4–8 hours, 70–95% efficiency, 80–95% confidence.
pub fn draw_sample<R: Rng + ?Sized>(rng: &mut R) -> WorkSample {
    WorkSample {
        hours_worked: rng.gen_range(4.0..=8.0),
        efficiency_rate: rng.gen_range(0.70..=0.95),
        confidence: rng.gen_range(0.80..=0.95),
    }
}

/// High-level business logic for the `task` commands.
pub struct TaskLogic;

impl TaskLogic {
    pub fn add(store: &mut dyn Store, worker_id: i64, description: &str) -> AppResult<Task> {
        let description = validate_task_description(description)?;
        let task = store.add_task(worker_id, description, draw_sample(&mut rand::thread_rng()))?;
        tracing::info!(task_id = task.id, worker_id, "task added");
        Ok(task)
    }

    pub fn complete(store: &mut dyn Store, task_id: i64) -> AppResult<Task> {
        let task = store.complete_task(task_id, draw_sample(&mut rand::thread_rng()))?;
        tracing::info!(task_id, worker_id = task.worker_id, "task completed");
        Ok(task)
    }
}
