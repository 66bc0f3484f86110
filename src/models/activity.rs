use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    WorkerAdded,
    WorkerUpdated,
    WorkerRemoved,
    TaskAdded,
    TaskCompleted,
    PerformanceUpdated,
    System,
}

impl ActivityType {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ActivityType::WorkerAdded => "worker_added",
            ActivityType::WorkerUpdated => "worker_updated",
            ActivityType::WorkerRemoved => "worker_removed",
            ActivityType::TaskAdded => "task_added",
            ActivityType::TaskCompleted => "task_completed",
            ActivityType::PerformanceUpdated => "performance_updated",
            ActivityType::System => "system",
        }
    }

    /// Convert DB string → enum. Unknown types written by older builds
    /// are shown as system entries.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "worker_added" => ActivityType::WorkerAdded,
            "worker_updated" => ActivityType::WorkerUpdated,
            "worker_removed" => ActivityType::WorkerRemoved,
            "task_added" => ActivityType::TaskAdded,
            "task_completed" | "task_completion" => ActivityType::TaskCompleted,
            "performance_updated" => ActivityType::PerformanceUpdated,
            _ => ActivityType::System,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Activity {
    pub id: i64,
    pub worker_id: Option<i64>,
    pub task_id: Option<i64>,
    pub activity_type: ActivityType,
    pub description: String,
    pub created_at: NaiveDateTime,
    /// Filled when the worker still exists.
    pub worker_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub worker_id: Option<i64>,
    pub task_id: Option<i64>,
    pub activity_type: ActivityType,
    pub description: String,
}

impl NewActivity {
    pub fn for_worker(worker_id: i64, activity_type: ActivityType, description: String) -> Self {
        Self {
            worker_id: Some(worker_id),
            task_id: None,
            activity_type,
            description,
        }
    }

    pub fn system(description: String) -> Self {
        Self {
            worker_id: None,
            task_id: None,
            activity_type: ActivityType::System,
            description,
        }
    }
}
