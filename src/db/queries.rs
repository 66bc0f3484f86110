//! Parameterized statements for every table, plus row mappers.
//!
//! Functions take a plain `&Connection` so they run unchanged inside a
//! `rusqlite::Transaction` (which derefs to `Connection`).

use crate::errors::AppError;
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::analytics::{AnalyticsMetric, AnalyticsPoint};
use crate::models::prediction::{FeatureAggregates, NewPrediction, PredictionRecord};
use crate::models::status::WorkerStatus;
use crate::models::task::Task;
use crate::models::user::{NewUser, User};
use crate::models::worker::{DashboardStats, Worker, WorkerInput};
use crate::utils::date;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

const WORKER_COLS: &str = "id, name, role, salary, status, performance_score, \
                           tasks_completed, tasks_to_complete, created_at";

fn conversion_err(e: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
}

fn ts_col(row: &Row, name: &str) -> Result<NaiveDateTime> {
    let raw: String = row.get(name)?;
    date::parse_ts(&raw).ok_or_else(|| conversion_err(AppError::InvalidDate(raw.clone())))
}

fn opt_ts_col(row: &Row, name: &str) -> Result<Option<NaiveDateTime>> {
    match row.get::<_, Option<String>>(name)? {
        Some(raw) => date::parse_ts(&raw)
            .map(Some)
            .ok_or_else(|| conversion_err(AppError::InvalidDate(raw.clone()))),
        None => Ok(None),
    }
}

// ---------------------------------------------------------------------------
// Workers
// ---------------------------------------------------------------------------

pub fn map_worker(row: &Row) -> Result<Worker> {
    let status_str: String = row.get("status")?;
    let status = WorkerStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_err(AppError::validation(format!(
            "Invalid worker status: {}",
            status_str
        )))
    })?;

    Ok(Worker {
        id: row.get("id")?,
        name: row.get("name")?,
        role: row.get("role")?,
        salary: row.get("salary")?,
        status,
        performance_score: row.get("performance_score")?,
        tasks_completed: row.get("tasks_completed")?,
        tasks_to_complete: row.get("tasks_to_complete")?,
        created_at: ts_col(row, "created_at")?,
    })
}

pub fn list_workers(conn: &Connection) -> Result<Vec<Worker>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {WORKER_COLS} FROM workers ORDER BY created_at DESC, id DESC"
    ))?;
    let rows = stmt.query_map([], map_worker)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn get_worker(conn: &Connection, id: i64) -> Result<Option<Worker>> {
    conn.query_row(
        &format!("SELECT {WORKER_COLS} FROM workers WHERE id = ?1"),
        [id],
        map_worker,
    )
    .optional()
}

pub fn insert_worker(conn: &Connection, input: &WorkerInput, now: &NaiveDateTime) -> Result<i64> {
    conn.execute(
        "INSERT INTO workers (name, role, salary, status, performance_score, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            input.name,
            input.role,
            input.salary,
            input.status.to_db_str(),
            input.performance_score,
            date::format_ts(now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Returns the number of rows touched (0 when the worker does not exist).
pub fn update_worker(conn: &Connection, id: i64, input: &WorkerInput) -> Result<usize> {
    conn.execute(
        "UPDATE workers
         SET name = ?1, role = ?2, salary = ?3, status = ?4, performance_score = ?5
         WHERE id = ?6",
        params![
            input.name,
            input.role,
            input.salary,
            input.status.to_db_str(),
            input.performance_score,
            id,
        ],
    )
}

/// Pre-delete statements followed by the worker row itself.
/// Activities are detached, not deleted: the audit log keeps its history.
pub fn delete_worker_cascade(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE activities SET worker_id = NULL, task_id = NULL
         WHERE worker_id = ?1
            OR task_id IN (SELECT id FROM tasks WHERE worker_id = ?1)",
        [id],
    )?;
    conn.execute(
        "DELETE FROM performance_predictions WHERE worker_id = ?1",
        [id],
    )?;
    conn.execute("DELETE FROM tasks WHERE worker_id = ?1", [id])?;
    conn.execute("DELETE FROM workers WHERE id = ?1", [id])
}

pub fn increment_tasks_completed(conn: &Connection, worker_id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE workers SET tasks_completed = tasks_completed + 1 WHERE id = ?1",
        [worker_id],
    )
}

pub fn increment_tasks_to_complete(conn: &Connection, worker_id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE workers SET tasks_to_complete = tasks_to_complete + 1 WHERE id = ?1",
        [worker_id],
    )
}

/// (total tasks, completed tasks, average efficiency) for one worker.
pub fn worker_task_totals(conn: &Connection, worker_id: i64) -> Result<(i64, i64, f64)> {
    conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM tasks WHERE worker_id = ?1),
            (SELECT COALESCE(SUM(is_completed), 0) FROM tasks WHERE worker_id = ?1),
            (SELECT COALESCE(AVG(efficiency_rate), 0.0)
               FROM performance_predictions WHERE worker_id = ?1)",
        [worker_id],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
    )
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

pub fn map_task(row: &Row) -> Result<Task> {
    Ok(Task {
        id: row.get("id")?,
        worker_id: row.get("worker_id")?,
        description: row.get("description")?,
        is_completed: row.get::<_, i64>("is_completed")? == 1,
        created_at: ts_col(row, "created_at")?,
    })
}

pub fn insert_task(
    conn: &Connection,
    worker_id: i64,
    description: &str,
    now: &NaiveDateTime,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO tasks (worker_id, description, is_completed, created_at)
         VALUES (?1, ?2, 0, ?3)",
        params![worker_id, description, date::format_ts(now)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_task(conn: &Connection, id: i64) -> Result<Option<Task>> {
    conn.query_row(
        "SELECT id, worker_id, description, is_completed, created_at FROM tasks WHERE id = ?1",
        [id],
        map_task,
    )
    .optional()
}

pub fn mark_task_completed(conn: &Connection, id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE tasks SET is_completed = 1 WHERE id = ?1 AND is_completed = 0",
        [id],
    )
}

pub fn list_tasks(conn: &Connection, worker_id: Option<i64>, open_only: bool) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, worker_id, description, is_completed, created_at
         FROM tasks
         WHERE (?1 IS NULL OR worker_id = ?1)
           AND (?2 = 0 OR is_completed = 0)
         ORDER BY created_at DESC, id DESC",
    )?;
    let rows = stmt.query_map(params![worker_id, open_only as i64], map_task)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Predictions
// ---------------------------------------------------------------------------

pub fn map_prediction(row: &Row) -> Result<PredictionRecord> {
    Ok(PredictionRecord {
        id: row.get("id")?,
        worker_id: row.get("worker_id")?,
        worker_name: row.get("worker_name")?,
        hours_worked: row.get("hours_worked")?,
        tasks_completed: row.get("tasks_completed")?,
        efficiency_rate: row.get("efficiency_rate")?,
        predicted_score: row.get("predicted_score")?,
        confidence_score: row.get("confidence_score")?,
        created_at: ts_col(row, "created_at")?,
    })
}

pub fn insert_prediction(conn: &Connection, p: &NewPrediction, now: &NaiveDateTime) -> Result<i64> {
    conn.execute(
        "INSERT INTO performance_predictions
            (worker_id, hours_worked, tasks_completed, efficiency_rate,
             predicted_score, confidence_score, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            p.worker_id,
            p.hours_worked,
            p.tasks_completed,
            p.efficiency_rate,
            p.predicted_score,
            p.confidence_score,
            date::format_ts(now),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

const PREDICTION_SELECT: &str = "SELECT pp.id, pp.worker_id, w.name AS worker_name,
            pp.hours_worked, pp.tasks_completed, pp.efficiency_rate,
            pp.predicted_score, pp.confidence_score, pp.created_at
     FROM performance_predictions pp
     LEFT JOIN workers w ON w.id = pp.worker_id";

pub fn get_prediction(conn: &Connection, id: i64) -> Result<Option<PredictionRecord>> {
    conn.query_row(
        &format!("{PREDICTION_SELECT} WHERE pp.id = ?1"),
        [id],
        map_prediction,
    )
    .optional()
}

pub fn prediction_history(
    conn: &Connection,
    worker_id: i64,
    limit: usize,
) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{PREDICTION_SELECT}
         WHERE pp.worker_id = ?1
         ORDER BY pp.created_at DESC, pp.id DESC
         LIMIT ?2"
    ))?;
    let rows = stmt.query_map(params![worker_id, limit as i64], map_prediction)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn recent_predictions(conn: &Connection, limit: usize) -> Result<Vec<PredictionRecord>> {
    let mut stmt = conn.prepare(&format!(
        "{PREDICTION_SELECT}
         ORDER BY pp.created_at DESC, pp.id DESC
         LIMIT ?1"
    ))?;
    let rows = stmt.query_map([limit as i64], map_prediction)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Aggregates feeding the predictor, over rows created at or after `since`.
/// Each field is NULL (→ `None`) when the window holds no rows for it.
pub fn feature_aggregates(
    conn: &Connection,
    worker_id: i64,
    since: &NaiveDateTime,
) -> Result<FeatureAggregates> {
    conn.query_row(
        "SELECT
            (SELECT SUM(hours_worked) FROM performance_predictions
              WHERE worker_id = ?1 AND created_at >= ?2),
            (SELECT SUM(is_completed) FROM tasks
              WHERE worker_id = ?1 AND created_at >= ?2),
            (SELECT AVG(efficiency_rate) FROM performance_predictions
              WHERE worker_id = ?1 AND created_at >= ?2),
            (SELECT AVG(CASE WHEN is_completed = 1 THEN 1.0 ELSE 0.0 END) FROM tasks
              WHERE worker_id = ?1 AND created_at >= ?2)",
        params![worker_id, date::format_ts(since)],
        |row| {
            Ok(FeatureAggregates {
                total_hours: row.get(0)?,
                tasks_completed: row.get(1)?,
                avg_efficiency: row.get(2)?,
                avg_completion: row.get(3)?,
            })
        },
    )
}

// ---------------------------------------------------------------------------
// Activities
// ---------------------------------------------------------------------------

pub fn map_activity(row: &Row) -> Result<Activity> {
    let kind: String = row.get("activity_type")?;
    Ok(Activity {
        id: row.get("id")?,
        worker_id: row.get("worker_id")?,
        task_id: row.get("task_id")?,
        activity_type: ActivityType::from_db_str(&kind),
        description: row.get("description")?,
        created_at: ts_col(row, "created_at")?,
        worker_name: row.get("worker_name")?,
    })
}

pub fn insert_activity(conn: &Connection, a: &NewActivity, now: &NaiveDateTime) -> Result<i64> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO activities (worker_id, task_id, activity_type, description, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    stmt.execute(params![
        a.worker_id,
        a.task_id,
        a.activity_type.to_db_str(),
        a.description,
        date::format_ts(now),
    ])?;
    Ok(conn.last_insert_rowid())
}

pub fn recent_activities(conn: &Connection, limit: usize) -> Result<Vec<Activity>> {
    let mut stmt = conn.prepare(
        "SELECT a.id, a.worker_id, a.task_id, a.activity_type, a.description,
                a.created_at, w.name AS worker_name
         FROM activities a
         LEFT JOIN workers w ON w.id = a.worker_id
         ORDER BY a.created_at DESC, a.id DESC
         LIMIT ?1",
    )?;
    let rows = stmt.query_map([limit as i64], map_activity)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

const USER_COLS: &str = "id, username, email, password_hash, role, created_at, last_login";

pub fn map_user(row: &Row) -> Result<User> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        email: row.get("email")?,
        password_hash: row.get("password_hash")?,
        role: row.get("role")?,
        created_at: ts_col(row, "created_at")?,
        last_login: opt_ts_col(row, "last_login")?,
    })
}

pub fn find_user_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLS} FROM users WHERE username = ?1"),
        [username],
        map_user,
    )
    .optional()
}

pub fn find_user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLS} FROM users WHERE id = ?1"),
        [id],
        map_user,
    )
    .optional()
}

/// True when another user already owns `username` or `email`.
pub fn identity_taken(
    conn: &Connection,
    username: &str,
    email: &str,
    exclude_id: Option<i64>,
) -> Result<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM users
         WHERE (username = ?1 OR email = ?2) AND (?3 IS NULL OR id != ?3)
         LIMIT 1",
    )?;
    stmt.exists(params![username, email, exclude_id])
}

pub fn insert_user(conn: &Connection, u: &NewUser, now: &NaiveDateTime) -> Result<i64> {
    conn.execute(
        "INSERT INTO users (username, email, password_hash, role, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![u.username, u.email, u.password_hash, u.role, date::format_ts(now)],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn touch_last_login(conn: &Connection, id: i64, now: &NaiveDateTime) -> Result<usize> {
    conn.execute(
        "UPDATE users SET last_login = ?1 WHERE id = ?2",
        params![date::format_ts(now), id],
    )
}

pub fn update_identity(conn: &Connection, id: i64, username: &str, email: &str) -> Result<usize> {
    conn.execute(
        "UPDATE users SET username = ?1, email = ?2 WHERE id = ?3",
        params![username, email, id],
    )
}

// ---------------------------------------------------------------------------
// Dashboard & analytics
// ---------------------------------------------------------------------------

pub fn dashboard_stats(conn: &Connection, high_threshold: f64) -> Result<DashboardStats> {
    conn.query_row(
        "SELECT
            (SELECT COUNT(*) FROM workers),
            (SELECT COUNT(*) FROM workers WHERE status = 'active'),
            (SELECT COUNT(*) FROM workers WHERE status = 'inactive'),
            (SELECT COUNT(*) FROM workers WHERE status = 'on_leave'),
            (SELECT COUNT(*) FROM workers WHERE performance_score >= ?1),
            (SELECT COUNT(*) FROM performance_predictions),
            (SELECT COUNT(*) FROM activities)",
        [high_threshold],
        |row| {
            Ok(DashboardStats {
                total: row.get(0)?,
                active: row.get(1)?,
                inactive: row.get(2)?,
                on_leave: row.get(3)?,
                high_performance: row.get(4)?,
                predictions: row.get(5)?,
                activities: row.get(6)?,
            })
        },
    )
}

/// Per-day series for `metric` between `from` and `to` (inclusive).
///
/// The metric column comes from a closed enum; the worker filter is bound.
pub fn analytics(
    conn: &Connection,
    metric: AnalyticsMetric,
    from: &NaiveDate,
    to: &NaiveDate,
    worker_id: Option<i64>,
) -> Result<Vec<AnalyticsPoint>> {
    let sql = format!(
        "SELECT substr(pp.created_at, 1, 10) AS day,
                AVG({col}) AS value,
                AVG(pp.confidence_score) AS confidence,
                (SELECT COUNT(*) FROM tasks t
                  WHERE substr(t.created_at, 1, 10) = substr(pp.created_at, 1, 10)
                    AND (?3 IS NULL OR t.worker_id = ?3)) AS total_tasks,
                (SELECT COALESCE(SUM(t.is_completed), 0) FROM tasks t
                  WHERE substr(t.created_at, 1, 10) = substr(pp.created_at, 1, 10)
                    AND (?3 IS NULL OR t.worker_id = ?3)) AS completed_tasks
         FROM performance_predictions pp
         JOIN workers w ON w.id = pp.worker_id
         WHERE substr(pp.created_at, 1, 10) BETWEEN ?1 AND ?2
           AND (?3 IS NULL OR w.id = ?3)
         GROUP BY day
         ORDER BY day",
        col = metric.column()
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        params![
            from.format("%Y-%m-%d").to_string(),
            to.format("%Y-%m-%d").to_string(),
            worker_id
        ],
        |row| {
            let day: String = row.get("day")?;
            let date = date::parse_date(&day)
                .ok_or_else(|| conversion_err(AppError::InvalidDate(day.clone())))?;
            Ok(AnalyticsPoint {
                date,
                value: row.get::<_, Option<f64>>("value")?.unwrap_or(0.0),
                confidence: row.get::<_, Option<f64>>("confidence")?.unwrap_or(0.0),
                total_tasks: row.get("total_tasks")?,
                completed_tasks: row.get("completed_tasks")?,
            })
        },
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;
    use crate::db::pool::DbPool;

    fn pool() -> DbPool {
        let mut pool = DbPool::in_memory().unwrap();
        run_pending_migrations(&mut pool.conn).unwrap();
        pool
    }

    fn input(name: &str, score: f64) -> WorkerInput {
        WorkerInput {
            name: name.into(),
            role: "Developer".into(),
            salary: 3000.0,
            status: WorkerStatus::Active,
            performance_score: score,
        }
    }

    #[test]
    fn feature_window_excludes_old_rows() {
        let pool = pool();
        let now = date::parse_ts("2025-07-01 09:00:00").unwrap();
        let id = insert_worker(&pool.conn, &input("Ada", 8.0), &now).unwrap();

        let recent = NewPrediction {
            worker_id: id,
            hours_worked: 6.0,
            tasks_completed: 1,
            efficiency_rate: 0.8,
            predicted_score: 8.0,
            confidence_score: 0.9,
        };
        insert_prediction(&pool.conn, &recent, &now).unwrap();
        let old = date::parse_ts("2025-03-01 09:00:00").unwrap();
        insert_prediction(
            &pool.conn,
            &NewPrediction {
                hours_worked: 100.0,
                ..recent.clone()
            },
            &old,
        )
        .unwrap();
        let t = insert_task(&pool.conn, id, "Ship it", &now).unwrap();
        mark_task_completed(&pool.conn, t).unwrap();
        insert_task(&pool.conn, id, "Review", &now).unwrap();

        let since = date::window_start(now, 30);
        let agg = feature_aggregates(&pool.conn, id, &since).unwrap();
        assert_eq!(agg.total_hours, Some(6.0));
        assert_eq!(agg.tasks_completed, Some(1));
        assert_eq!(agg.avg_efficiency, Some(0.8));
        assert_eq!(agg.avg_completion, Some(0.5));
    }

    #[test]
    fn empty_window_yields_nulls() {
        let pool = pool();
        let now = date::now();
        let id = insert_worker(&pool.conn, &input("Bo", 5.0), &now).unwrap();
        let agg = feature_aggregates(&pool.conn, id, &date::window_start(now, 30)).unwrap();
        assert!(agg.is_empty());
    }

    #[test]
    fn identity_check_can_exclude_self() {
        let pool = pool();
        let now = date::now();
        let u = NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "x".into(),
            role: "user".into(),
        };
        let id = insert_user(&pool.conn, &u, &now).unwrap();
        assert!(identity_taken(&pool.conn, "alice", "other@example.com", None).unwrap());
        assert!(!identity_taken(&pool.conn, "alice", "alice@example.com", Some(id)).unwrap());
    }

    #[test]
    fn analytics_filters_by_bound_worker_id() {
        let pool = pool();
        let day = date::parse_ts("2025-06-09 10:00:00").unwrap();
        let a = insert_worker(&pool.conn, &input("Ann", 8.0), &day).unwrap();
        let b = insert_worker(&pool.conn, &input("Ben", 4.0), &day).unwrap();
        for (w, score) in [(a, 8.0), (b, 4.0)] {
            insert_prediction(
                &pool.conn,
                &NewPrediction {
                    worker_id: w,
                    hours_worked: 8.0,
                    tasks_completed: 1,
                    efficiency_rate: 0.9,
                    predicted_score: score,
                    confidence_score: 0.8,
                },
                &day,
            )
            .unwrap();
        }

        let from = date::parse_date("2025-06-01").unwrap();
        let to = date::parse_date("2025-06-30").unwrap();
        let all = analytics(&pool.conn, AnalyticsMetric::Prediction, &from, &to, None).unwrap();
        assert_eq!(all.len(), 1);
        assert!((all[0].value - 6.0).abs() < 1e-9);

        let only_b =
            analytics(&pool.conn, AnalyticsMetric::Prediction, &from, &to, Some(b)).unwrap();
        assert!((only_b[0].value - 4.0).abs() < 1e-9);
    }
}
