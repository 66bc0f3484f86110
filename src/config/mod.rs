use crate::errors::{AppError, AppResult};
use crate::utils::path::resolve_in;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

pub mod migrate; // use submodule at src/config/migrate.rs

/// Storage backend selected at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Sqlite,
    Memory,
}

impl Backend {
    pub fn from_name(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Some(Backend::Sqlite),
            "memory" | "mock" => Some(Backend::Memory),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelConfig {
    #[serde(default = "default_model_path")]
    pub path: String,
    #[serde(default = "default_features")]
    pub features: Vec<String>,
    #[serde(default = "default_n_estimators")]
    pub n_estimators: usize,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    #[serde(default = "default_database")]
    pub database: String,
    #[serde(default)]
    pub seed_demo_data: bool,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default = "default_window_days")]
    pub prediction_window_days: i64,
    #[serde(default = "default_high_performance")]
    pub high_performance_threshold: f64,
    #[serde(default = "default_activity_limit")]
    pub recent_activity_limit: usize,
}

fn default_database() -> String {
    Config::database_file().to_string_lossy().to_string()
}
fn default_model_path() -> String {
    "models/worker_model.apr".to_string()
}
pub fn default_features() -> Vec<String> {
    vec![
        "hours_worked".to_string(),
        "tasks_completed".to_string(),
        "efficiency_rate".to_string(),
        "completion_rate".to_string(),
    ]
}
fn default_n_estimators() -> usize {
    100
}
fn default_max_depth() -> usize {
    10
}
fn default_seed() -> u64 {
    42
}
fn default_window_days() -> i64 {
    30
}
fn default_high_performance() -> f64 {
    8.0
}
fn default_activity_limit() -> usize {
    5
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
            features: default_features(),
            n_estimators: default_n_estimators(),
            max_depth: default_max_depth(),
            seed: default_seed(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            database: default_database(),
            seed_demo_data: false,
            model: ModelConfig::default(),
            prediction_window_days: default_window_days(),
            high_performance_threshold: default_high_performance(),
            recent_activity_limit: default_activity_limit(),
        }
    }
}

impl Config {
    /// Return the configuration directory: `$CREWPILOT_HOME`, or a
    /// platform-specific directory under the user's home.
    pub fn config_dir() -> PathBuf {
        if let Ok(dir) = env::var("CREWPILOT_HOME")
            && !dir.trim().is_empty()
        {
            return PathBuf::from(dir);
        }

        if cfg!(target_os = "windows") {
            let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(appdata).join("crewpilot")
        } else {
            let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
            home.join(".crewpilot")
        }
    }

    /// Return the full path of the config file
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("crewpilot.conf")
    }

    /// Return the full path of the default SQLite database
    pub fn database_file() -> PathBuf {
        Self::config_dir().join("crewpilot.sqlite")
    }

    /// Load configuration from file (defaults when absent), then apply
    /// environment overrides and validate.
    pub fn load() -> AppResult<Self> {
        let path = Self::config_file();

        let mut cfg = if path.exists() {
            let content = fs::read_to_string(&path).map_err(|_| AppError::ConfigLoad)?;
            serde_yaml::from_str(&content)
                .map_err(|e| AppError::Config(format!("{}: {}", path.display(), e)))?
        } else {
            Config::default()
        };

        cfg.apply_overrides(|key| env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply `CREWPILOT_*` overrides. `lookup` is injected so tests do not
    /// have to touch the process environment.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(b) = lookup("CREWPILOT_BACKEND") {
            self.backend = Backend::from_name(&b)
                .ok_or_else(|| AppError::Config(format!("Unknown backend '{}'", b)))?;
        }
        if let Some(db) = lookup("CREWPILOT_DB") {
            self.database = db;
        }
        if let Some(model) = lookup("CREWPILOT_MODEL_PATH") {
            self.model.path = model;
        }
        if let Some(features) = lookup("CREWPILOT_FEATURES") {
            self.model.features = features
                .split(',')
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.model.features.len() != 4 {
            return Err(AppError::Config(format!(
                "model.features must list exactly 4 names, got {}",
                self.model.features.len()
            )));
        }
        if self.model.n_estimators == 0 || self.model.max_depth == 0 {
            return Err(AppError::Config(
                "model.n_estimators and model.max_depth must be positive".into(),
            ));
        }
        if self.prediction_window_days <= 0 {
            return Err(AppError::Config(
                "prediction_window_days must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Database path, relative entries resolved against the config directory.
    pub fn database_path(&self) -> PathBuf {
        resolve_in(&Self::config_dir(), &self.database)
    }

    /// Model artifact path, relative entries resolved against the config directory.
    pub fn model_path(&self) -> PathBuf {
        resolve_in(&Self::config_dir(), &self.model.path)
    }

    pub fn save(&self) -> AppResult<()> {
        let yaml = serde_yaml::to_string(self).map_err(|_| AppError::ConfigSave)?;
        let mut file = fs::File::create(Self::config_file())?;
        file.write_all(yaml.as_bytes())?;
        Ok(())
    }

    /// Initialize configuration directory, config file and database file.
    /// In test mode the config file is left untouched.
    pub fn init_all(custom_db: Option<String>, is_test: bool) -> AppResult<Config> {
        let dir = Self::config_dir();
        fs::create_dir_all(&dir)?;

        let mut config = if Self::config_file().exists() {
            Self::load()?
        } else {
            Config::default()
        };

        if let Some(name) = custom_db {
            config.database = resolve_in(&dir, &name).to_string_lossy().to_string();
        }

        if !is_test {
            config.save()?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        let db_path = config.database_path();
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg: Config = serde_yaml::from_str("backend: memory\n").unwrap();
        assert_eq!(cfg.backend, Backend::Memory);
        assert_eq!(cfg.model.n_estimators, 100);
        assert_eq!(cfg.model.max_depth, 10);
        assert_eq!(cfg.prediction_window_days, 30);
        assert_eq!(cfg.high_performance_threshold, 8.0);
        assert_eq!(cfg.model.features.len(), 4);
    }

    #[test]
    fn env_overrides_win_over_file() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("CREWPILOT_BACKEND", "mock"),
            ("CREWPILOT_DB", "/tmp/x.sqlite"),
            ("CREWPILOT_MODEL_PATH", "/tmp/m.apr"),
            ("CREWPILOT_FEATURES", "a, b,c,d"),
        ]);
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.backend, Backend::Memory);
        assert_eq!(cfg.database, "/tmp/x.sqlite");
        assert_eq!(cfg.model_path(), PathBuf::from("/tmp/m.apr"));
        assert_eq!(cfg.model.features, vec!["a", "b", "c", "d"]);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn wrong_feature_count_is_rejected() {
        let mut cfg = Config::default();
        cfg.apply_overrides(|k| (k == "CREWPILOT_FEATURES").then(|| "age,skills".to_string()))
            .unwrap();
        assert!(matches!(cfg.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn unknown_backend_is_a_config_error() {
        let mut cfg = Config::default();
        let err = cfg
            .apply_overrides(|k| (k == "CREWPILOT_BACKEND").then(|| "mysql".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown backend 'mysql'"));
    }
}
