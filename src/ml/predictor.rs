//! Worker score prediction: feature extraction, inference, persistence.
//!
//! A `Predictor` only exists once its model is loaded (or freshly
//! initialized and saved). Inference problems never reach the caller:
//! they are logged and answered with a fixed neutral result.

use super::pipeline::Pipeline;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::models::prediction::{FeatureAggregates, NewPrediction, PredictionRecord};
use crate::store::Store;
use crate::utils::date;
use crate::utils::validation::validate_prediction;
use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const MIN_TRAINING_SAMPLES: usize = 5;
const TEST_FRACTION: f64 = 0.2;

const FALLBACK_SCORE: f64 = 5.0;
const FALLBACK_CONFIDENCE: [f64; 2] = [0.5, 0.5];

/// Anything that maps a 4-feature row to a raw score.
pub trait ScoreModel {
    fn predict_row(&self, features: &[f64]) -> AppResult<f64>;

    fn feature_importances(&self) -> Vec<(String, f64)> {
        Vec::new()
    }
}

impl ScoreModel for Pipeline {
    fn predict_row(&self, features: &[f64]) -> AppResult<f64> {
        Pipeline::predict_row(self, features)
    }

    fn feature_importances(&self) -> Vec<(String, f64)> {
        Pipeline::feature_importances(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureVector {
    pub hours_worked: f64,
    pub tasks_completed: f64,
    pub efficiency_rate: f64,
    pub completion_rate: f64,
}

impl FeatureVector {
    /// Used when the window holds nothing for the worker.
    pub const EMPTY: FeatureVector = FeatureVector {
        hours_worked: 0.0,
        tasks_completed: 0.0,
        efficiency_rate: 0.5,
        completion_rate: 0.5,
    };

    pub fn from_aggregates(agg: &FeatureAggregates) -> Self {
        if agg.is_empty() {
            return Self::EMPTY;
        }
        Self {
            hours_worked: agg.total_hours.unwrap_or(0.0),
            tasks_completed: agg.tasks_completed.unwrap_or(0) as f64,
            efficiency_rate: agg.avg_efficiency.unwrap_or(0.5),
            completion_rate: agg.avg_completion.unwrap_or(0.5),
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [
            self.hours_worked,
            self.tasks_completed,
            self.efficiency_rate,
            self.completion_rate,
        ]
    }
}

/// `[completeness, stability]`:
/// share of features above zero, and `1 - std/10` clamped to 0..=1.
pub fn confidence_scores(features: &[f64]) -> [f64; 2] {
    if features.is_empty() {
        return [0.0, 0.0];
    }
    let n = features.len() as f64;
    let completeness = features.iter().filter(|v| **v > 0.0).count() as f64 / n;

    let mean = features.iter().sum::<f64>() / n;
    let std = (features.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
    let stability = (1.0 - std / 10.0).clamp(0.0, 1.0);

    [completeness, stability]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionSource {
    Model,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    pub worker_id: i64,
    pub predicted_score: f64,
    pub confidence_scores: [f64; 2],
    pub features_used: FeatureVector,
    pub feature_importances: Vec<(String, f64)>,
    pub source: PredictionSource,
    /// Id of the stored row; `None` for the fallback.
    pub record_id: Option<i64>,
}

impl Prediction {
    fn fallback(worker_id: i64) -> Self {
        Self {
            worker_id,
            predicted_score: FALLBACK_SCORE,
            confidence_scores: FALLBACK_CONFIDENCE,
            features_used: FeatureVector::EMPTY,
            feature_importances: Vec::new(),
            source: PredictionSource::Fallback,
            record_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub train_score: f64,
    pub test_score: f64,
    pub samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub trained_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub path: String,
    pub fitted: bool,
    pub trained_at: Option<NaiveDateTime>,
    /// Size of the training split the model was fitted on.
    pub train_samples: usize,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
    pub features: Vec<String>,
    pub feature_importances: Vec<(String, f64)>,
}

pub struct Predictor<M: ScoreModel = Pipeline> {
    model: M,
    path: PathBuf,
    window_days: i64,
}

impl Predictor<Pipeline> {
    /// Load the pipeline at `model.path`; build, save and use a fresh one
    /// when the file is missing or unreadable.
    pub fn load_or_init(cfg: &Config) -> AppResult<Self> {
        let path = cfg.model_path();

        let model = if path.exists() {
            match Pipeline::load(&path) {
                Ok(p) => {
                    tracing::debug!(path = %path.display(), fitted = p.is_fitted(), "model loaded");
                    p
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "model unreadable, re-initializing");
                    Self::init_at(cfg, &path)?
                }
            }
        } else {
            Self::init_at(cfg, &path)?
        };

        Ok(Self {
            model,
            path,
            window_days: cfg.prediction_window_days,
        })
    }

    /// Like `load_or_init`, but an unwritable model path leaves an unsaved,
    /// unfitted pipeline in place so every prediction takes the fallback.
    pub fn open(cfg: &Config) -> Self {
        Self::load_or_init(cfg).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "model unavailable, predictions will use the fallback");
            Self::with_model(
                Pipeline::new(&cfg.model),
                cfg.model_path(),
                cfg.prediction_window_days,
            )
        })
    }

    fn init_at(cfg: &Config, path: &Path) -> AppResult<Pipeline> {
        let p = Pipeline::new(&cfg.model);
        p.save(path)?;
        tracing::info!(path = %path.display(), "new model initialized");
        Ok(p)
    }

    /// Fit on a seeded shuffle, hold out 20% (rounded up), report R² on
    /// both parts and persist the result.
    pub fn train(&mut self, x: &[Vec<f64>], y: &[f64]) -> AppResult<TrainingReport> {
        if x.len() != y.len() {
            return Err(AppError::validation(format!(
                "Got {} feature rows but {} scores",
                x.len(),
                y.len()
            )));
        }
        if x.len() < MIN_TRAINING_SAMPLES {
            return Err(AppError::validation(format!(
                "At least {} training samples are required, got {}",
                MIN_TRAINING_SAMPLES,
                x.len()
            )));
        }
        if let Some(bad) = x.iter().position(|r| r.len() != 4) {
            return Err(AppError::validation(format!(
                "Row {} must have 4 features",
                bad + 1
            )));
        }

        let mut order: Vec<usize> = (0..x.len()).collect();
        order.shuffle(&mut StdRng::seed_from_u64(self.model.seed));

        let test_n = ((x.len() as f64) * TEST_FRACTION).ceil() as usize;
        let (test_idx, train_idx) = order.split_at(test_n);
        let pick = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<f64>) {
            (
                idx.iter().map(|&i| x[i].clone()).collect(),
                idx.iter().map(|&i| y[i]).collect(),
            )
        };
        let (x_train, y_train) = pick(train_idx);
        let (x_test, y_test) = pick(test_idx);

        let mut fitted = self.model.clone();
        fitted.fit(&x_train, &y_train)?;
        let train_score = fitted.score(&x_train, &y_train)?;
        let test_score = fitted.score(&x_test, &y_test)?;

        let trained_at = fitted.trained_at.unwrap_or_else(date::now);
        fitted.save(&self.path)?;
        self.model = fitted;

        tracing::info!(
            samples = x.len(),
            train_score,
            test_score,
            "model trained"
        );

        Ok(TrainingReport {
            train_score,
            test_score,
            samples: x.len(),
            train_samples: x_train.len(),
            test_samples: x_test.len(),
            trained_at,
        })
    }

    pub fn info(&self) -> ModelInfo {
        ModelInfo {
            path: self.path.display().to_string(),
            fitted: self.model.is_fitted(),
            trained_at: self.model.trained_at,
            train_samples: self.model.train_samples,
            n_estimators: self.model.n_estimators,
            max_depth: self.model.max_depth,
            seed: self.model.seed,
            features: self.model.features.clone(),
            feature_importances: self.model.feature_importances(),
        }
    }
}

impl<M: ScoreModel> Predictor<M> {
    /// Wrap an arbitrary model; nothing is read from or written to disk.
    pub fn with_model(model: M, path: PathBuf, window_days: i64) -> Self {
        Self {
            model,
            path,
            window_days,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Predict and store a score for `worker_id`.
    ///
    /// `NotFound` for an unknown worker and storage errors propagate;
    /// model errors yield the fallback result, which is not stored.
    pub fn predict(&self, store: &mut dyn Store, worker_id: i64) -> AppResult<Prediction> {
        if store.get_worker(worker_id)?.is_none() {
            return Err(AppError::not_found(format!("Worker {}", worker_id)));
        }

        let since = date::window_start(date::now(), self.window_days);
        let features = FeatureVector::from_aggregates(&store.feature_aggregates(worker_id, &since)?);
        let row = features.as_array();

        let raw = match self.model.predict_row(&row) {
            Ok(v) if v.is_finite() => v,
            Ok(v) => {
                tracing::warn!(worker_id, value = v, "model returned a non-finite score");
                return Ok(Prediction::fallback(worker_id));
            }
            Err(e) => {
                tracing::warn!(worker_id, error = %e, "prediction failed, using fallback");
                return Ok(Prediction::fallback(worker_id));
            }
        };

        let predicted_score = raw.clamp(0.0, 10.0);
        let confidence = confidence_scores(&row);
        validate_prediction(worker_id, predicted_score, &confidence)?;

        let record = store.insert_prediction(&NewPrediction {
            worker_id,
            hours_worked: features.hours_worked,
            tasks_completed: features.tasks_completed.round() as i64,
            efficiency_rate: features.efficiency_rate,
            predicted_score,
            confidence_score: confidence[0],
        })?;
        tracing::debug!(worker_id, predicted_score, "prediction stored");

        Ok(Prediction {
            worker_id,
            predicted_score,
            confidence_scores: confidence,
            features_used: features,
            feature_importances: self.model.feature_importances(),
            source: PredictionSource::Model,
            record_id: Some(record.id),
        })
    }

    /// Most recent stored predictions first.
    pub fn history(
        &self,
        store: &mut dyn Store,
        worker_id: i64,
        limit: usize,
    ) -> AppResult<Vec<PredictionRecord>> {
        if store.get_worker(worker_id)?.is_none() {
            return Err(AppError::not_found(format!("Worker {}", worker_id)));
        }
        store.prediction_history(worker_id, limit)
    }
}

#[derive(Debug, Deserialize)]
struct TrainingRow {
    hours_worked: f64,
    tasks_completed: f64,
    efficiency_rate: f64,
    completion_rate: f64,
    score: f64,
}

/// Read `hours_worked,tasks_completed,efficiency_rate,completion_rate,score` rows.
pub fn load_training_csv(path: &Path) -> AppResult<(Vec<Vec<f64>>, Vec<f64>)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (line, rec) in reader.deserialize::<TrainingRow>().enumerate() {
        let r = rec?;
        let values = [
            r.hours_worked,
            r.tasks_completed,
            r.efficiency_rate,
            r.completion_rate,
            r.score,
        ];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(AppError::validation(format!(
                "Row {} contains a non-numeric value",
                line + 2
            )));
        }
        x.push(values[..4].to_vec());
        y.push(r.score);
    }
    Ok((x, y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::WorkerStatus;
    use crate::models::worker::WorkerInput;
    use crate::store::MemoryStore;

    struct Fixed(f64);
    impl ScoreModel for Fixed {
        fn predict_row(&self, _: &[f64]) -> AppResult<f64> {
            Ok(self.0)
        }
    }

    struct Broken;
    impl ScoreModel for Broken {
        fn predict_row(&self, _: &[f64]) -> AppResult<f64> {
            Err(AppError::ModelUnavailable("boom".into()))
        }
    }

    fn store_with_worker() -> (MemoryStore, i64) {
        let mut store = MemoryStore::new();
        let w = store
            .insert_worker(&WorkerInput {
                name: "John Doe".into(),
                role: "Developer".into(),
                salary: 0.0,
                status: WorkerStatus::Active,
                performance_score: 8.5,
            })
            .unwrap();
        (store, w.id)
    }

    #[test]
    fn out_of_range_scores_are_clamped_and_stored() {
        let (mut store, id) = store_with_worker();
        let p = Predictor::with_model(Fixed(42.0), PathBuf::new(), 30);

        let res = p.predict(&mut store, id).unwrap();
        assert_eq!(res.predicted_score, 10.0);
        assert_eq!(res.source, PredictionSource::Model);
        assert_eq!(res.features_used, FeatureVector::EMPTY);

        let low = Predictor::with_model(Fixed(-3.0), PathBuf::new(), 30);
        assert_eq!(low.predict(&mut store, id).unwrap().predicted_score, 0.0);

        let rows = p.history(&mut store, id, 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].predicted_score, 0.0);
    }

    #[test]
    fn model_failure_yields_unsaved_fallback() {
        let (mut store, id) = store_with_worker();
        let p = Predictor::with_model(Broken, PathBuf::new(), 30);

        let res = p.predict(&mut store, id).unwrap();
        assert_eq!(res.predicted_score, 5.0);
        assert_eq!(res.confidence_scores, [0.5, 0.5]);
        assert_eq!(res.features_used.as_array(), [0.0, 0.0, 0.5, 0.5]);
        assert_eq!(res.source, PredictionSource::Fallback);
        assert!(res.record_id.is_none());
        assert!(store.prediction_history(id, 10).unwrap().is_empty());
    }

    #[test]
    fn unknown_worker_is_not_found() {
        let mut store = MemoryStore::new();
        let p = Predictor::with_model(Fixed(7.0), PathBuf::new(), 30);
        let err = p.predict(&mut store, 404).unwrap_err();
        assert_eq!(err.to_string(), "Worker 404 not found");
    }

    #[test]
    fn confidence_of_default_features() {
        let [completeness, stability] = confidence_scores(&FeatureVector::EMPTY.as_array());
        assert_eq!(completeness, 0.5);
        assert!((stability - (1.0 - 0.25 / 10.0)).abs() < 1e-12);

        let [_, wild] = confidence_scores(&[500.0, 0.0, 0.0, 0.0]);
        assert_eq!(wild, 0.0);
    }

    #[test]
    fn features_come_from_the_store_window() {
        let (mut store, id) = store_with_worker();
        let sample = crate::models::task::WorkSample {
            hours_worked: 6.0,
            efficiency_rate: 0.8,
            confidence: 0.9,
        };
        let t = store.add_task(id, "Ship", sample).unwrap();
        store.complete_task(t.id, sample).unwrap();

        let p = Predictor::with_model(Fixed(7.0), PathBuf::new(), 30);
        let res = p.predict(&mut store, id).unwrap();
        assert_eq!(res.features_used.hours_worked, 12.0);
        assert_eq!(res.features_used.tasks_completed, 1.0);
        assert!((res.features_used.efficiency_rate - 0.8).abs() < 1e-9);
        assert_eq!(res.features_used.completion_rate, 1.0);
        assert_eq!(res.confidence_scores[0], 1.0);
    }

    #[test]
    fn load_or_init_persists_then_trains() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.model.path = dir.path().join("m.apr").display().to_string();
        cfg.model.n_estimators = 10;
        cfg.model.max_depth = 4;

        let mut p = Predictor::load_or_init(&cfg).unwrap();
        assert!(Path::new(&cfg.model.path).exists());
        assert!(!p.info().fitted);

        let x: Vec<Vec<f64>> = (0..10)
            .map(|i| {
                vec![
                    i as f64 * 4.0,
                    i as f64,
                    0.7 + i as f64 * 0.02,
                    0.4 + (i % 3) as f64 * 0.1,
                ]
            })
            .collect();
        let y: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let report = p.train(&x, &y).unwrap();
        assert_eq!(report.samples, 10);
        assert_eq!(report.test_samples, 2);
        assert_eq!(report.train_samples, 8);
        assert!(report.train_score > 0.5);

        let reloaded = Predictor::load_or_init(&cfg).unwrap();
        let info = reloaded.info();
        assert!(info.fitted);
        assert!(info.trained_at.is_some());
        assert_eq!(info.train_samples, report.train_samples);
        assert_eq!(info.seed, 42);
    }

    #[test]
    fn corrupt_artifact_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.apr");
        std::fs::write(&path, "not an artifact").unwrap();
        let mut cfg = Config::default();
        cfg.model.path = path.display().to_string();

        let p = Predictor::load_or_init(&cfg).unwrap();
        assert!(!p.info().fitted);
        assert!(Pipeline::load(&path).is_ok());
    }

    #[test]
    fn too_few_samples_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = Config::default();
        cfg.model.path = dir.path().join("m.apr").display().to_string();
        let mut p = Predictor::load_or_init(&cfg).unwrap();

        let err = p.train(&[vec![1.0, 1.0, 1.0, 1.0]], &[5.0]).unwrap_err();
        assert!(err.to_string().contains("At least 5 training samples"));
    }

    #[test]
    fn csv_rows_are_parsed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.csv");
        std::fs::write(
            &path,
            "hours_worked,tasks_completed,efficiency_rate,completion_rate,score\n\
             40, 5, 0.9, 0.8, 8.5\n\
             20,2,0.6,0.5,5\n",
        )
        .unwrap();
        let (x, y) = load_training_csv(&path).unwrap();
        assert_eq!(x, vec![vec![40.0, 5.0, 0.9, 0.8], vec![20.0, 2.0, 0.6, 0.5]]);
        assert_eq!(y, vec![8.5, 5.0]);
    }
}
