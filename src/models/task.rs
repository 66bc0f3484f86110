use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Task {
    pub id: i64,
    pub worker_id: i64,
    pub description: String,
    pub is_completed: bool,
    pub created_at: NaiveDateTime,
}

/// Synthetic work figures recorded alongside task creation and completion.
///
/// The values are drawn by the caller so storage stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorkSample {
    pub hours_worked: f64,
    /// Fraction in 0..=1.
    pub efficiency_rate: f64,
    pub confidence: f64,
}

impl WorkSample {
    /// Score recorded with the sample: mean of the efficiency (scaled to 0..10)
    /// and the worker's current performance score, clamped to 0..10.
    pub fn heuristic_score(&self, performance_score: f64) -> f64 {
        ((self.efficiency_rate * 10.0 + performance_score) / 2.0).clamp(0.0, 10.0)
    }
}
