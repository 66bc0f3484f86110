use chrono::NaiveDate;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsMetric {
    Performance,
    Efficiency,
    Tasks,
    Hours,
    Prediction,
}

impl AnalyticsMetric {
    /// Column averaged per day. Closed mapping: only these literals are ever
    /// spliced into the analytics statement.
    pub fn column(&self) -> &'static str {
        match self {
            AnalyticsMetric::Performance => "w.performance_score",
            AnalyticsMetric::Efficiency => "pp.efficiency_rate",
            AnalyticsMetric::Tasks => "w.tasks_completed",
            AnalyticsMetric::Hours => "pp.hours_worked",
            AnalyticsMetric::Prediction => "pp.predicted_score",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AnalyticsMetric::Performance => "Performance score",
            AnalyticsMetric::Efficiency => "Efficiency rate",
            AnalyticsMetric::Tasks => "Tasks completed",
            AnalyticsMetric::Hours => "Hours worked",
            AnalyticsMetric::Prediction => "Predicted score",
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnalyticsPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub confidence: f64,
    pub total_tasks: i64,
    pub completed_tasks: i64,
}
