use super::status::WorkerStatus;
use super::task::Task;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Worker {
    pub id: i64,
    pub name: String,
    pub role: String,           // ⇔ workers.role (the "position" field of the form)
    pub salary: f64,            // ⇔ workers.salary (REAL, >= 0)
    pub status: WorkerStatus,   // ⇔ workers.status ('active','inactive','on_leave')
    pub performance_score: f64, // ⇔ workers.performance_score (0..=10)
    pub tasks_completed: i64,
    pub tasks_to_complete: i64,
    pub created_at: NaiveDateTime,
}

/// Payload of the worker form, validated before it reaches storage.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerInput {
    pub name: String,
    pub role: String,
    pub salary: f64,
    pub status: WorkerStatus,
    pub performance_score: f64,
}

/// A worker row plus the task/efficiency aggregates shown on the Developers view.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerOverview {
    pub worker: Worker,
    pub total_tasks: i64,
    pub completed_tasks: i64,
    pub avg_efficiency: f64,
    pub open_tasks: Vec<Task>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
    pub on_leave: i64,
    pub high_performance: i64,
    pub predictions: i64,
    pub activities: i64,
}
