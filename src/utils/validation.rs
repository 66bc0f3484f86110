//! Field checks run before anything reaches storage.
//!
//! Every function returns the first violated rule as
//! `AppError::ValidationFailed` with the message shown next to the form.

use crate::errors::{AppError, AppResult};
use crate::models::status::WorkerStatus;
use crate::models::worker::WorkerInput;
use regex::Regex;
use std::sync::OnceLock;

fn email_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email regex")
    })
}

fn username_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("username regex"))
}

/// Raw text of the worker form, before any parsing.
#[derive(Debug, Clone, Default)]
pub struct WorkerForm {
    pub name: String,
    pub position: String,
    pub salary: String,
    pub status: String,
    pub performance_score: String,
}

/// Validate the worker form and turn it into a typed payload.
pub fn validate_worker(form: &WorkerForm) -> AppResult<WorkerInput> {
    let name = form.name.trim();
    if name.chars().count() < 2 {
        return Err(AppError::validation(
            "Name must be a string with at least 2 characters",
        ));
    }

    let position = form.position.trim();
    if position.chars().count() < 2 {
        return Err(AppError::validation(
            "Position must be a string with at least 2 characters",
        ));
    }

    let salary = crate::utils::formatting::parse_currency(&form.salary)
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::validation("Salary must be a valid number"))?;
    if salary < 0.0 {
        return Err(AppError::validation("Salary cannot be negative"));
    }

    let status = WorkerStatus::from_input(&form.status).ok_or_else(|| {
        AppError::validation(format!(
            "Status must be one of: {}",
            WorkerStatus::valid_values()
        ))
    })?;

    let score = form
        .performance_score
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AppError::validation("Performance score must be a valid number"))?;
    if !(0.0..=10.0).contains(&score) {
        return Err(AppError::validation(
            "Performance score must be between 0 and 10",
        ));
    }

    Ok(WorkerInput {
        name: name.to_string(),
        role: position.to_string(),
        salary,
        status,
        performance_score: score,
    })
}

pub fn validate_email(email: &str) -> bool {
    email_re().is_match(email)
}

pub fn validate_username(username: &str) -> AppResult<()> {
    if username.chars().count() < 3 {
        return Err(AppError::validation(
            "Username must be at least 3 characters long",
        ));
    }
    if !username_re().is_match(username) {
        return Err(AppError::validation(
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 8 {
        return Err(AppError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(AppError::validation(
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(AppError::validation(
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(AppError::validation(
            "Password must contain at least one number",
        ));
    }
    Ok(())
}

/// Checks a prediction before it is written.
pub fn validate_prediction(worker_id: i64, score: f64, confidences: &[f64]) -> AppResult<()> {
    if worker_id <= 0 {
        return Err(AppError::validation("Worker ID must be a positive integer"));
    }
    if !score.is_finite() || !(0.0..=10.0).contains(&score) {
        return Err(AppError::validation(
            "Predicted score must be between 0 and 10",
        ));
    }
    if confidences.len() != 2 {
        return Err(AppError::validation(
            "Confidence scores must be a list of 2 values",
        ));
    }
    Ok(())
}

pub fn validate_task_description(description: &str) -> AppResult<&str> {
    let d = description.trim();
    if d.is_empty() {
        return Err(AppError::validation("Please enter a task description"));
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> WorkerForm {
        WorkerForm {
            name: "John Doe".into(),
            position: "Developer".into(),
            salary: "4200".into(),
            status: "active".into(),
            performance_score: "8.5".into(),
        }
    }

    fn rejection(form: WorkerForm) -> String {
        validate_worker(&form).unwrap_err().to_string()
    }

    #[test]
    fn accepts_valid_payloads() {
        let input = validate_worker(&valid_form()).unwrap();
        assert_eq!(input.name, "John Doe");
        assert_eq!(input.status, WorkerStatus::Active);

        for status in ["active", "inactive", "on_leave"] {
            for score in ["0", "10", "5.5"] {
                let form = WorkerForm {
                    status: status.into(),
                    performance_score: score.into(),
                    salary: "0".into(),
                    name: "Al".into(),
                    position: "QA".into(),
                };
                assert!(validate_worker(&form).is_ok(), "{status} {score}");
            }
        }
    }

    #[test]
    fn each_violation_has_its_own_message() {
        let mut f = valid_form();
        f.name = " J ".into();
        assert_eq!(rejection(f), "Name must be a string with at least 2 characters");

        let mut f = valid_form();
        f.position = "X".into();
        assert_eq!(rejection(f), "Position must be a string with at least 2 characters");

        let mut f = valid_form();
        f.salary = "-1".into();
        assert_eq!(rejection(f), "Salary cannot be negative");

        let mut f = valid_form();
        f.salary = "lots".into();
        assert_eq!(rejection(f), "Salary must be a valid number");

        let mut f = valid_form();
        f.status = "retired".into();
        assert_eq!(
            rejection(f),
            "Status must be one of: active, inactive, on_leave"
        );

        let mut f = valid_form();
        f.performance_score = "10.5".into();
        assert_eq!(rejection(f), "Performance score must be between 0 and 10");

        let mut f = valid_form();
        f.performance_score = "high".into();
        assert_eq!(rejection(f), "Performance score must be a valid number");
    }

    #[test]
    fn email_shape() {
        assert!(validate_email("alice@example.com"));
        assert!(!validate_email("alice@example"));
        assert!(!validate_email("alice example.com"));
    }

    #[test]
    fn username_rules() {
        assert!(validate_username("alice_01").is_ok());
        assert!(validate_username("al").is_err());
        assert!(validate_username("al ice").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Secret123").is_ok());
        assert!(validate_password("Sec1").is_err());
        assert!(validate_password("secret123").is_err());
        assert!(validate_password("SECRET123").is_err());
        assert!(validate_password("SecretABC").is_err());
    }

    #[test]
    fn prediction_rules() {
        assert!(validate_prediction(1, 7.0, &[0.5, 0.5]).is_ok());
        assert!(validate_prediction(0, 7.0, &[0.5, 0.5]).is_err());
        assert!(validate_prediction(1, 11.0, &[0.5, 0.5]).is_err());
        assert!(validate_prediction(1, 7.0, &[0.5]).is_err());
    }
}
