use chrono::NaiveDateTime;
use serde::Serialize;

/// A stored `performance_predictions` row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PredictionRecord {
    pub id: i64,
    pub worker_id: i64,
    pub worker_name: Option<String>,
    pub hours_worked: f64,
    pub tasks_completed: i64,
    pub efficiency_rate: f64,
    pub predicted_score: f64,
    pub confidence_score: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPrediction {
    pub worker_id: i64,
    pub hours_worked: f64,
    pub tasks_completed: i64,
    pub efficiency_rate: f64,
    pub predicted_score: f64,
    pub confidence_score: f64,
}

/// Raw aggregates over a worker's trailing window. `None` fields had no rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeatureAggregates {
    pub total_hours: Option<f64>,
    pub tasks_completed: Option<i64>,
    pub avg_efficiency: Option<f64>,
    pub avg_completion: Option<f64>,
}

impl FeatureAggregates {
    pub fn is_empty(&self) -> bool {
        self.total_hours.is_none()
            && self.tasks_completed.is_none()
            && self.avg_efficiency.is_none()
            && self.avg_completion.is_none()
    }
}
