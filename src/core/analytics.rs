use crate::errors::{AppError, AppResult};
use crate::models::analytics::{AnalyticsMetric, AnalyticsPoint};
use crate::store::Store;
use chrono::NaiveDate;
use serde::Serialize;

pub const WINDOW: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsSummary {
    pub metric: AnalyticsMetric,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub worker_id: Option<i64>,
    pub points: Vec<AnalyticsPoint>,
    /// Mean of the previous `WINDOW` values; `None` for the first ones.
    pub moving_average: Vec<Option<f64>>,
    /// Mean of the last `WINDOW` values, when there are that many.
    pub next_forecast: Option<f64>,
    pub avg_confidence: f64,
    /// Percentage of completed tasks over the range.
    pub completion_rate: f64,
}

impl AnalyticsSummary {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

pub fn moving_average(values: &[f64], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            (window > 0 && i >= window)
                .then(|| values[i - window..i].iter().sum::<f64>() / window as f64)
        })
        .collect()
}

pub struct AnalyticsLogic;

impl AnalyticsLogic {
    pub fn summarize(
        store: &mut dyn Store,
        metric: AnalyticsMetric,
        from: NaiveDate,
        to: NaiveDate,
        worker_id: Option<i64>,
    ) -> AppResult<AnalyticsSummary> {
        if from > to {
            return Err(AppError::validation(
                "Start date must not be after end date",
            ));
        }
        if let Some(id) = worker_id
            && store.get_worker(id)?.is_none()
        {
            return Err(AppError::not_found(format!("Worker {}", id)));
        }

        let points = store.analytics(metric, from, to, worker_id)?;
        let values: Vec<f64> = points.iter().map(|p| p.value).collect();

        let next_forecast = (values.len() >= WINDOW).then(|| {
            values[values.len() - WINDOW..].iter().sum::<f64>() / WINDOW as f64
        });
        let avg_confidence = if points.is_empty() {
            0.0
        } else {
            points.iter().map(|p| p.confidence).sum::<f64>() / points.len() as f64
        };
        let total: i64 = points.iter().map(|p| p.total_tasks).sum();
        let completed: i64 = points.iter().map(|p| p.completed_tasks).sum();
        let completion_rate = if total > 0 {
            completed as f64 / total as f64 * 100.0
        } else {
            0.0
        };

        Ok(AnalyticsSummary {
            metric,
            from,
            to,
            worker_id,
            moving_average: moving_average(&values, WINDOW),
            points,
            next_forecast,
            avg_confidence,
            completion_rate,
        })
    }
}
