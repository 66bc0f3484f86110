/// ANSI color helper utilities for terminal output.
use crate::models::activity::ActivityType;
use crate::models::status::WorkerStatus;
use ansi_term::Colour;

pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Score color:
/// \>= 8 → green
/// \>= 6 → yellow
/// otherwise → red
pub fn color_for_score(score: f64) -> &'static str {
    if score >= 8.0 {
        GREEN
    } else if score >= 6.0 {
        YELLOW
    } else {
        RED
    }
}

pub fn colorize_score(score: f64) -> String {
    format!("{}{:.1}{}", color_for_score(score), score, RESET)
}

pub fn colorize_status(status: WorkerStatus) -> String {
    let colour = match status {
        WorkerStatus::Active => Colour::Green,
        WorkerStatus::Inactive => Colour::Red,
        WorkerStatus::OnLeave => Colour::Yellow,
    };
    colour.paint(status.to_db_str()).to_string()
}

/// Icon and colour used for a row of the activity feed.
pub fn style_for_activity(kind: ActivityType) -> (&'static str, Colour) {
    match kind {
        ActivityType::WorkerAdded => ("＋", Colour::Green),
        ActivityType::WorkerUpdated => ("✎", Colour::Blue),
        ActivityType::WorkerRemoved => ("✕", Colour::Red),
        ActivityType::TaskAdded => ("•", Colour::Cyan),
        ActivityType::TaskCompleted => ("✔", Colour::Green),
        ActivityType::PerformanceUpdated => ("↗", Colour::Yellow),
        ActivityType::System => ("⚙", Colour::White),
    }
}

/// Returns GREY text for empty values ("" or "--").
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_bands() {
        assert_eq!(color_for_score(9.1), GREEN);
        assert_eq!(color_for_score(8.0), GREEN);
        assert_eq!(color_for_score(6.0), YELLOW);
        assert_eq!(color_for_score(5.99), RED);
    }
}
