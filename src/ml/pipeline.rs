//! Scaler + random forest (aprender), persisted together as one `.apr` artifact.

use crate::config::ModelConfig;
use crate::errors::{AppError, AppResult};
use crate::utils::date;
use aprender::format::{self, ModelType, SaveOptions};
use aprender::metrics::r_squared;
use aprender::prelude::*;
use aprender::preprocessing::StandardScaler;
use aprender::primitives::{Matrix, Vector};
use aprender::tree::RandomForestRegressor;
use chrono::NaiveDateTime;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const FORMAT_VERSION: u32 = 2;
const ARTIFACT_NAME: &str = "crewpilot-worker-score";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pipeline {
    pub version: u32,
    pub features: Vec<String>,
    pub n_estimators: usize,
    pub max_depth: usize,
    pub seed: u64,
    scaler: StandardScaler,
    regressor: RandomForestRegressor,
    importances: Vec<f64>,
    #[serde(default)]
    pub trained_at: Option<NaiveDateTime>,
    /// Rows the forest was fitted on (the training split, not the whole file).
    #[serde(default)]
    pub train_samples: usize,
}

fn model_err(e: impl std::fmt::Display) -> AppError {
    AppError::ModelUnavailable(e.to_string())
}

fn to_matrix(rows: &[Vec<f64>], width: usize) -> AppResult<Matrix<f32>> {
    if let Some(bad) = rows.iter().position(|r| r.len() != width) {
        return Err(AppError::validation(format!(
            "Row {} must have {} features",
            bad + 1,
            width
        )));
    }
    let flat: Vec<f32> = rows.iter().flatten().map(|v| *v as f32).collect();
    Matrix::from_vec(rows.len(), width, flat).map_err(model_err)
}

fn to_vector(values: &[f64]) -> Vector<f32> {
    let v: Vec<f32> = values.iter().map(|v| *v as f32).collect();
    Vector::from_slice(&v)
}

impl Pipeline {
    /// Unfitted pipeline with the configured hyper-parameters.
    pub fn new(cfg: &ModelConfig) -> Self {
        Self {
            version: FORMAT_VERSION,
            features: cfg.features.clone(),
            n_estimators: cfg.n_estimators,
            max_depth: cfg.max_depth,
            seed: cfg.seed,
            scaler: StandardScaler::new(),
            regressor: Self::forest(cfg.n_estimators, cfg.max_depth, cfg.seed),
            importances: Vec::new(),
            trained_at: None,
            train_samples: 0,
        }
    }

    fn forest(n_estimators: usize, max_depth: usize, seed: u64) -> RandomForestRegressor {
        RandomForestRegressor::new(n_estimators)
            .with_max_depth(max_depth)
            .with_random_state(seed)
    }

    pub fn is_fitted(&self) -> bool {
        self.trained_at.is_some()
    }

    fn width(&self) -> usize {
        self.features.len()
    }

    /// Fit scaler and forest on `(x, y)` and stamp the training time.
    pub fn fit(&mut self, x: &[Vec<f64>], y: &[f64]) -> AppResult<()> {
        if x.is_empty() || x.len() != y.len() {
            return Err(AppError::validation(format!(
                "Got {} feature rows but {} scores",
                x.len(),
                y.len()
            )));
        }
        let matrix = to_matrix(x, self.width())?;
        let target = to_vector(y);

        let mut scaler = StandardScaler::new();
        scaler.fit(&matrix).map_err(model_err)?;
        let scaled = scaler.transform(&matrix).map_err(model_err)?;

        let mut regressor = Self::forest(self.n_estimators, self.max_depth, self.seed);
        regressor.fit(&scaled, &target).map_err(model_err)?;

        self.importances = permutation_importances(&scaler, &regressor, x, &target, self.seed)?;
        self.scaler = scaler;
        self.regressor = regressor;
        self.train_samples = x.len();
        self.trained_at = Some(date::now());
        Ok(())
    }

    fn predict_matrix(&self, x: &[Vec<f64>]) -> AppResult<Vector<f32>> {
        if !self.is_fitted() {
            return Err(AppError::ModelUnavailable("model is not trained yet".into()));
        }
        let scaled = self
            .scaler
            .transform(&to_matrix(x, self.width())?)
            .map_err(model_err)?;
        Ok(self.regressor.predict(&scaled))
    }

    pub fn predict_row(&self, row: &[f64]) -> AppResult<f64> {
        let out = self.predict_matrix(&[row.to_vec()])?;
        out.as_slice()
            .first()
            .map(|v| f64::from(*v))
            .ok_or_else(|| AppError::ModelUnavailable("empty prediction".into()))
    }

    /// Coefficient of determination on `(x, y)`.
    pub fn score(&self, x: &[Vec<f64>], y: &[f64]) -> AppResult<f64> {
        if y.is_empty() {
            return Err(AppError::validation("Cannot score an empty sample"));
        }
        let predicted = self.predict_matrix(x)?;
        Ok(f64::from(r_squared(&predicted, &to_vector(y))))
    }

    /// Feature labels paired with their importance (empty before fitting).
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        self.features
            .iter()
            .cloned()
            .zip(self.importances.iter().copied())
            .collect()
    }

    pub fn save(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let options = SaveOptions::default()
            .with_name(ARTIFACT_NAME)
            .with_description("StandardScaler + RandomForestRegressor over worker activity");
        format::save(self, ModelType::Custom, path, options).map_err(model_err)
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let pipeline: Pipeline = format::load(path, ModelType::Custom).map_err(model_err)?;
        if pipeline.version != FORMAT_VERSION {
            return Err(AppError::ModelUnavailable(format!(
                "unsupported model format version {}",
                pipeline.version
            )));
        }
        Ok(pipeline)
    }
}

/// Drop in training R² when one column is shuffled, normalized to sum to 1.
fn permutation_importances(
    scaler: &StandardScaler,
    regressor: &RandomForestRegressor,
    x: &[Vec<f64>],
    y: &Vector<f32>,
    seed: u64,
) -> AppResult<Vec<f64>> {
    let width = x.first().map(Vec::len).unwrap_or(0);
    let r2_of = |rows: &[Vec<f64>]| -> AppResult<f32> {
        let scaled = scaler
            .transform(&to_matrix(rows, width)?)
            .map_err(model_err)?;
        Ok(r_squared(&regressor.predict(&scaled), y))
    };

    let baseline = r2_of(x)?;
    let mut rng = StdRng::seed_from_u64(seed);
    let mut drops = Vec::with_capacity(width);
    for col in 0..width {
        let mut order: Vec<usize> = (0..x.len()).collect();
        order.shuffle(&mut rng);

        let mut permuted = x.to_vec();
        for (row, &src) in order.iter().enumerate() {
            permuted[row][col] = x[src][col];
        }
        drops.push(f64::from(baseline - r2_of(&permuted)?).max(0.0));
    }

    let total: f64 = drops.iter().sum();
    if total > 0.0 {
        drops.iter_mut().for_each(|d| *d /= total);
    }
    Ok(drops)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg() -> ModelConfig {
        ModelConfig {
            n_estimators: 10,
            max_depth: 4,
            ..ModelConfig::default()
        }
    }

    fn sample() -> (Vec<Vec<f64>>, Vec<f64>) {
        let x: Vec<Vec<f64>> = (0..12)
            .map(|i| {
                vec![
                    i as f64,
                    (i % 3) as f64,
                    0.5 + (i % 2) as f64 * 0.1,
                    0.4 + (i % 4) as f64 * 0.05,
                ]
            })
            .collect();
        let y: Vec<f64> = (0..12).map(|i| (i as f64 / 1.2).min(10.0)).collect();
        (x, y)
    }

    #[test]
    fn fresh_pipeline_is_unfitted() {
        let p = Pipeline::new(&ModelConfig::default());
        assert!(!p.is_fitted());
        assert_eq!(p.n_estimators, 100);
        assert_eq!(p.max_depth, 10);
        assert_eq!(p.seed, 42);
        assert_eq!(p.train_samples, 0);
        assert!(p.feature_importances().is_empty());
        assert!(p.predict_row(&[0.0, 0.0, 0.5, 0.5]).is_err());
    }

    #[test]
    fn saved_artifact_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("models").join("m.apr");

        let mut p = Pipeline::new(&small_cfg());
        let (x, y) = sample();
        p.fit(&x, &y).unwrap();
        p.save(&path).unwrap();

        let back = Pipeline::load(&path).unwrap();
        assert!(back.is_fitted());
        assert_eq!(back.train_samples, 12);
        let diff = back.predict_row(&x[3]).unwrap() - p.predict_row(&x[3]).unwrap();
        assert!(diff.abs() < 1e-6);
        assert_eq!(back.feature_importances().len(), 4);
    }

    #[test]
    fn importances_favor_the_informative_feature() {
        let mut p = Pipeline::new(&small_cfg());
        let (x, y) = sample();
        p.fit(&x, &y).unwrap();

        let imp = p.feature_importances();
        let total: f64 = imp.iter().map(|(_, v)| v).sum();
        assert!((total - 1.0).abs() < 1e-6);
        assert_eq!(imp[0].0, "hours_worked");
        assert!(imp[0].1 > imp[2].1);
        assert!(p.score(&x, &y).unwrap() > 0.5);
    }

    #[test]
    fn wrong_row_width_is_rejected() {
        let mut p = Pipeline::new(&small_cfg());
        let err = p.fit(&[vec![1.0, 2.0]], &[3.0]).unwrap_err();
        assert!(err.to_string().contains("must have 4 features"));
    }
}
