//! Unified application error type.
//! All modules (store, auth, ml, cli, ui) return AppError so every caller can
//! tell "bad input" from "no such row" from "storage is down".

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Storage
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    // ---------------------------
    // Input / lookups
    // ---------------------------
    #[error("{0}")]
    ValidationFailed(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    // ---------------------------
    // Authentication
    // ---------------------------
    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Authentication required: please log in first")]
    NotAuthenticated,

    // ---------------------------
    // Prediction model
    // ---------------------------
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

/// Coarse classification surfaced to views and callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ValidationFailed,
    NotFound,
    StorageUnavailable,
    ModelUnavailable,
    Unauthorized,
    Internal,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::ValidationFailed => "validation failed",
            ErrorKind::NotFound => "not found",
            ErrorKind::StorageUnavailable => "storage unavailable",
            ErrorKind::ModelUnavailable => "model unavailable",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::ValidationFailed(_) | AppError::InvalidDate(_) => ErrorKind::ValidationFailed,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Io(_)
            | AppError::Db(_)
            | AppError::Migration(_)
            | AppError::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
            AppError::ModelUnavailable(_) | AppError::Serialization(_) => {
                ErrorKind::ModelUnavailable
            }
            AppError::InvalidCredentials | AppError::NotAuthenticated => ErrorKind::Unauthorized,
            AppError::Csv(_)
            | AppError::Config(_)
            | AppError::ConfigLoad
            | AppError::ConfigSave
            | AppError::Other(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show in a view. Storage and internal failures are
    /// collapsed into a generic line; their detail goes to the log.
    /// Configuration and input-file problems are shown as they are.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Config(_) | AppError::ConfigLoad | AppError::ConfigSave | AppError::Csv(_) => {
                self.to_string()
            }
            _ => match self.kind() {
                ErrorKind::StorageUnavailable | ErrorKind::Internal => {
                    format!("An error occurred ({})", self.kind().label())
                }
                _ => self.to_string(),
            },
        }
    }

    pub fn validation<S: Into<String>>(msg: S) -> Self {
        AppError::ValidationFailed(msg.into())
    }

    pub fn not_found<S: Into<String>>(what: S) -> Self {
        AppError::NotFound(what.into())
    }
}

pub type AppResult<T> = Result<T, AppError>;
