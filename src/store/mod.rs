//! Storage seam: one trait, one implementation per backend.
//!
//! Compound operations (`insert_worker`, `update_worker`, `delete_worker`,
//! `add_task`, `complete_task`) are atomic in both backends: either every
//! statement of the unit lands or none does.

pub mod memory;
pub mod sqlite;

use crate::config::{Backend, Config};
use crate::errors::AppResult;
use crate::models::activity::{Activity, NewActivity};
use crate::models::analytics::{AnalyticsMetric, AnalyticsPoint};
use crate::models::prediction::{FeatureAggregates, NewPrediction, PredictionRecord};
use crate::models::task::{Task, WorkSample};
use crate::models::user::{NewUser, User};
use crate::models::worker::{DashboardStats, Worker, WorkerInput, WorkerOverview};
use chrono::{NaiveDate, NaiveDateTime};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

pub trait Store {
    fn backend(&self) -> Backend;

    // Workers
    fn list_workers(&mut self) -> AppResult<Vec<Worker>>;
    fn worker_overviews(&mut self) -> AppResult<Vec<WorkerOverview>>;
    fn get_worker(&mut self, id: i64) -> AppResult<Option<Worker>>;
    /// Insert the worker and its `worker_added` activity.
    fn insert_worker(&mut self, input: &WorkerInput) -> AppResult<Worker>;
    /// Update the worker and log `worker_updated`. `NotFound` when absent.
    fn update_worker(&mut self, id: i64, input: &WorkerInput) -> AppResult<Worker>;
    /// Delete predictions and tasks, detach activities, delete the worker,
    /// then log `worker_removed`. Returns the removed row.
    fn delete_worker(&mut self, id: i64) -> AppResult<Worker>;

    // Tasks
    fn add_task(&mut self, worker_id: i64, description: &str, sample: WorkSample)
    -> AppResult<Task>;
    fn complete_task(&mut self, task_id: i64, sample: WorkSample) -> AppResult<Task>;
    fn list_tasks(&mut self, worker_id: Option<i64>, open_only: bool) -> AppResult<Vec<Task>>;

    // Predictions
    fn insert_prediction(&mut self, prediction: &NewPrediction) -> AppResult<PredictionRecord>;
    fn prediction_history(&mut self, worker_id: i64, limit: usize)
    -> AppResult<Vec<PredictionRecord>>;
    fn recent_predictions(&mut self, limit: usize) -> AppResult<Vec<PredictionRecord>>;
    fn feature_aggregates(
        &mut self,
        worker_id: i64,
        since: &NaiveDateTime,
    ) -> AppResult<FeatureAggregates>;

    // Activities
    fn log_activity(&mut self, activity: &NewActivity) -> AppResult<i64>;
    fn recent_activities(&mut self, limit: usize) -> AppResult<Vec<Activity>>;

    // Users
    fn find_user_by_username(&mut self, username: &str) -> AppResult<Option<User>>;
    fn find_user_by_id(&mut self, id: i64) -> AppResult<Option<User>>;
    fn identity_taken(
        &mut self,
        username: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool>;
    fn insert_user(&mut self, user: &NewUser) -> AppResult<User>;
    fn touch_last_login(&mut self, id: i64) -> AppResult<User>;
    fn update_identity(&mut self, id: i64, username: &str, email: &str) -> AppResult<User>;

    // Dashboard & analytics
    fn dashboard_stats(&mut self, high_performance_threshold: f64) -> AppResult<DashboardStats>;
    fn analytics(
        &mut self,
        metric: AnalyticsMetric,
        from: NaiveDate,
        to: NaiveDate,
        worker_id: Option<i64>,
    ) -> AppResult<Vec<AnalyticsPoint>>;
}

/// Open the backend named by the configuration.
pub fn open_store(cfg: &Config) -> AppResult<Box<dyn Store>> {
    match cfg.backend {
        Backend::Sqlite => {
            let path = cfg.database_path();
            tracing::debug!(path = %path.display(), "opening sqlite store");
            Ok(Box::new(SqliteStore::open(&path)?))
        }
        Backend::Memory => {
            tracing::debug!(seeded = cfg.seed_demo_data, "opening in-memory store");
            let store = if cfg.seed_demo_data {
                MemoryStore::with_demo_data()
            } else {
                MemoryStore::new()
            };
            Ok(Box::new(store))
        }
    }
}

pub(crate) fn worker_label(id: i64) -> String {
    format!("Worker {}", id)
}

pub(crate) fn task_label(id: i64) -> String {
    format!("Task {}", id)
}

pub(crate) fn user_label(id: i64) -> String {
    format!("User {}", id)
}

/// Prediction row recorded next to a task event.
pub(crate) fn heuristic_prediction(
    worker: &Worker,
    tasks_completed: i64,
    sample: WorkSample,
) -> NewPrediction {
    NewPrediction {
        worker_id: worker.id,
        hours_worked: sample.hours_worked,
        tasks_completed,
        efficiency_rate: sample.efficiency_rate,
        predicted_score: sample.heuristic_score(worker.performance_score),
        confidence_score: sample.confidence,
    }
}
