//! Text renderers. Each returns the block to print so the shell, the
//! one-shot commands and the tests share one rendering.

use crate::config::Config;
use crate::core::analytics::AnalyticsSummary;
use crate::ml::predictor::{ModelInfo, Prediction, PredictionSource, TrainingReport};
use crate::models::activity::Activity;
use crate::models::prediction::PredictionRecord;
use crate::models::task::Task;
use crate::models::user::User;
use crate::models::worker::{DashboardStats, Worker, WorkerOverview};
use crate::utils::colors::{colorize_optional, colorize_score, colorize_status, style_for_activity};
use crate::utils::formatting::{
    bold, format_currency, format_date, format_percentage, truncate_text,
};
use crate::utils::table::Table;
use std::fmt::Write;

const DESCRIPTION_WIDTH: usize = 48;
const CARD_WIDTH: usize = 64;
const CARD_INDENT: &str = "        ";

pub fn render_dashboard(
    stats: &DashboardStats,
    activities: &[Activity],
    predictions: &[PredictionRecord],
) -> String {
    let mut out = String::new();

    let cards = [
        ("Total workers", stats.total.to_string()),
        ("Active", stats.active.to_string()),
        ("Inactive", stats.inactive.to_string()),
        ("On leave", stats.on_leave.to_string()),
        ("High performers", stats.high_performance.to_string()),
        ("Predictions", stats.predictions.to_string()),
        ("Activities", stats.activities.to_string()),
    ];
    for (label, value) in cards {
        let _ = writeln!(out, "  {:<16} {}", label, bold(&value));
    }

    out.push('\n');
    out.push_str(&bold("Recent activity"));
    out.push('\n');
    out.push_str(&render_activities(activities));

    out.push('\n');
    out.push_str(&bold("Recent predictions"));
    out.push('\n');
    out.push_str(&render_history(predictions));
    out
}

pub fn render_activities(activities: &[Activity]) -> String {
    if activities.is_empty() {
        return "  No activity yet\n".to_string();
    }
    let mut out = String::new();
    for a in activities {
        let (icon, colour) = style_for_activity(a.activity_type);
        let who = a.worker_name.as_deref().unwrap_or("System");
        let _ = writeln!(
            out,
            "  {} {}  {}  {}",
            colour.paint(icon),
            format_date(&a.created_at),
            who,
            truncate_text(&a.description, DESCRIPTION_WIDTH)
        );
    }
    out
}

pub fn render_worker_table(workers: &[Worker]) -> String {
    if workers.is_empty() {
        return "No workers found.\n".to_string();
    }
    let mut t = Table::with_headers(&[
        "ID", "Name", "Position", "Salary", "Status", "Score", "Done", "To do",
    ])
    .align_right(&[3, 5, 6, 7]);
    for w in workers {
        t.add_row(vec![
            w.id.to_string(),
            w.name.clone(),
            w.role.clone(),
            format_currency(w.salary),
            colorize_status(w.status),
            colorize_score(w.performance_score),
            w.tasks_completed.to_string(),
            w.tasks_to_complete.to_string(),
        ]);
    }
    t.render()
}

/// Developers section: one card per worker with its open tasks.
pub fn render_worker_cards(overviews: &[WorkerOverview]) -> String {
    if overviews.is_empty() {
        return "No workers found.\n".to_string();
    }
    let mut out = String::new();
    for o in overviews {
        let w = &o.worker;
        let _ = writeln!(
            out,
            "{} #{}  {}  [{}]",
            bold(&w.name),
            w.id,
            w.role,
            colorize_status(w.status)
        );
        let _ = writeln!(out, "  Score:       {}", colorize_score(w.performance_score));
        let _ = writeln!(
            out,
            "  Tasks:       {}/{} completed",
            o.completed_tasks, o.total_tasks
        );
        let _ = writeln!(
            out,
            "  Efficiency:  {}",
            format_percentage(o.avg_efficiency * 100.0)
        );
        if o.open_tasks.is_empty() {
            let _ = writeln!(out, "  {}", colorize_optional("--"));
        } else {
            for t in &o.open_tasks {
                let bullet = format!("  • [{}] ", t.id);
                let opts = textwrap::Options::new(CARD_WIDTH)
                    .initial_indent(&bullet)
                    .subsequent_indent(CARD_INDENT);
                let _ = writeln!(out, "{}", textwrap::fill(&t.description, opts));
            }
        }
        out.push('\n');
    }
    out
}

pub fn render_worker_detail(worker: &Worker, tasks: &[Task]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} (#{})", bold(&worker.name), worker.id);
    let _ = writeln!(out, "  Position:  {}", worker.role);
    let _ = writeln!(out, "  Salary:    {}", format_currency(worker.salary));
    let _ = writeln!(out, "  Status:    {}", colorize_status(worker.status));
    let _ = writeln!(out, "  Score:     {}", colorize_score(worker.performance_score));
    let _ = writeln!(
        out,
        "  Tasks:     {} completed, {} assigned",
        worker.tasks_completed, worker.tasks_to_complete
    );
    let _ = writeln!(out, "  Since:     {}", format_date(&worker.created_at));
    out.push('\n');
    out.push_str(&render_tasks(tasks));
    out
}

pub fn render_tasks(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks found.\n".to_string();
    }
    let mut t = Table::with_headers(&["ID", "Worker", "Description", "Done", "Created"]);
    for task in tasks {
        t.add_row(vec![
            task.id.to_string(),
            task.worker_id.to_string(),
            truncate_text(&task.description, DESCRIPTION_WIDTH),
            if task.is_completed { "yes" } else { "no" }.to_string(),
            format_date(&task.created_at),
        ]);
    }
    t.render()
}

pub fn render_prediction(p: &Prediction, worker_name: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Prediction for {} (#{})", bold(worker_name), p.worker_id);
    let _ = writeln!(out, "  Predicted score:  {}", colorize_score(p.predicted_score));
    let _ = writeln!(
        out,
        "  Confidence:       {} completeness, {} stability",
        format_percentage(p.confidence_scores[0] * 100.0),
        format_percentage(p.confidence_scores[1] * 100.0)
    );
    let f = &p.features_used;
    let _ = writeln!(
        out,
        "  Features:         hours {:.1}, tasks {:.0}, efficiency {:.2}, completion {:.2}",
        f.hours_worked, f.tasks_completed, f.efficiency_rate, f.completion_rate
    );
    if !p.feature_importances.is_empty() {
        let _ = writeln!(out, "  Importances:");
        for (name, v) in &p.feature_importances {
            let _ = writeln!(out, "    {:<18} {}", name, format_percentage(v * 100.0));
        }
    }
    if p.source == PredictionSource::Fallback {
        let _ = writeln!(
            out,
            "  {}",
            colorize_optional("(model unavailable: default estimate, not saved)")
        );
    }
    out
}

pub fn render_history(rows: &[PredictionRecord]) -> String {
    if rows.is_empty() {
        return "  No predictions yet\n".to_string();
    }
    let mut t = Table::with_headers(&[
        "Date", "Worker", "Hours", "Tasks", "Efficiency", "Score", "Confidence",
    ]);
    for r in rows {
        t.add_row(vec![
            format_date(&r.created_at),
            r.worker_name.clone().unwrap_or_else(|| format!("#{}", r.worker_id)),
            format!("{:.1}", r.hours_worked),
            r.tasks_completed.to_string(),
            format_percentage(r.efficiency_rate * 100.0),
            colorize_score(r.predicted_score),
            format_percentage(r.confidence_score * 100.0),
        ]);
    }
    t.render()
}

pub fn render_analytics(s: &AnalyticsSummary) -> String {
    if s.is_empty() {
        return "No data available for the selected date range\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} from {} to {}",
        bold(s.metric.label()),
        s.from,
        s.to
    );

    let mut t = Table::with_headers(&["Date", "Value", "Moving avg", "Confidence", "Tasks"]);
    for (p, ma) in s.points.iter().zip(&s.moving_average) {
        t.add_row(vec![
            p.date.to_string(),
            format!("{:.2}", p.value),
            ma.map(|v| format!("{:.2}", v))
                .unwrap_or_else(|| colorize_optional("--")),
            format_percentage(p.confidence * 100.0),
            format!("{}/{}", p.completed_tasks, p.total_tasks),
        ]);
    }
    out.push_str(&t.render());

    out.push('\n');
    let _ = writeln!(
        out,
        "  Average confidence:  {}",
        format_percentage(s.avg_confidence * 100.0)
    );
    let _ = writeln!(
        out,
        "  Completion rate:     {}",
        format_percentage(s.completion_rate)
    );
    match s.next_forecast {
        Some(v) => {
            let _ = writeln!(out, "  Next-day forecast:   {:.2}", v);
        }
        None => {
            let _ = writeln!(
                out,
                "  Next-day forecast:   {}",
                colorize_optional("-- (needs 3 days of data)")
            );
        }
    }
    out
}

pub fn render_settings(user: &User, cfg: &Config) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", bold("Account"));
    let _ = writeln!(out, "  Username:    {}", user.username);
    let _ = writeln!(out, "  Email:       {}", user.email);
    let _ = writeln!(out, "  Role:        {}", user.role);
    let _ = writeln!(
        out,
        "  Last login:  {}",
        user.last_login
            .map(|t| format_date(&t))
            .unwrap_or_else(|| colorize_optional("--"))
    );
    out.push('\n');
    let _ = writeln!(out, "{}", bold("Application"));
    let _ = writeln!(out, "  Backend:     {:?}", cfg.backend);
    let _ = writeln!(out, "  Database:    {}", cfg.database_path().display());
    let _ = writeln!(out, "  Model:       {}", cfg.model_path().display());
    let _ = writeln!(out, "  Window:      {} days", cfg.prediction_window_days);
    out
}

pub fn render_chatbot() -> String {
    "The assistant is not available in this build.\n".to_string()
}

pub fn render_model_info(info: &ModelInfo) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  Path:        {}", info.path);
    let _ = writeln!(
        out,
        "  Trained:     {}",
        match (info.fitted, info.trained_at) {
            (true, Some(t)) => format!(
                "yes ({}, {} training samples)",
                format_date(&t),
                info.train_samples
            ),
            (true, None) => format!("yes ({} training samples)", info.train_samples),
            _ => colorize_optional("no"),
        }
    );
    let _ = writeln!(
        out,
        "  Forest:      {} trees, max depth {}, seed {}",
        info.n_estimators, info.max_depth, info.seed
    );
    let _ = writeln!(out, "  Features:    {}", info.features.join(", "));
    for (name, v) in &info.feature_importances {
        let _ = writeln!(out, "    {:<18} {}", name, format_percentage(v * 100.0));
    }
    out
}

pub fn render_training(r: &TrainingReport) -> String {
    format!(
        "  Samples:     {} ({} train / {} test)\n  Train R²:    {:.3}\n  Test R²:     {:.3}\n",
        r.samples, r.train_samples, r.test_samples, r.train_score, r.test_score
    )
}
