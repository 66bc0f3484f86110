//! Performance-score model: aprender's standard scaler feeding a random forest.

pub mod pipeline;
pub mod predictor;

pub use pipeline::Pipeline;
pub use predictor::{Prediction, PredictionSource, Predictor, ScoreModel};
