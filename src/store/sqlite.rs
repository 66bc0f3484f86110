use super::{Store, heuristic_prediction, task_label, user_label, worker_label};
use crate::config::Backend;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::db::queries;
use crate::errors::{AppError, AppResult, ErrorKind};
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::analytics::{AnalyticsMetric, AnalyticsPoint};
use crate::models::prediction::{FeatureAggregates, NewPrediction, PredictionRecord};
use crate::models::task::{Task, WorkSample};
use crate::models::user::{NewUser, User};
use crate::models::worker::{DashboardStats, Worker, WorkerInput, WorkerOverview};
use crate::utils::date;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, ErrorCode, TransactionBehavior};
use std::fs;
use std::path::Path;

pub struct SqliteStore {
    pool: DbPool,
}

/// Log storage failures where they happen; other kinds are the caller's business.
fn traced<T, E: Into<AppError>>(op: &'static str, res: Result<T, E>) -> AppResult<T> {
    res.map_err(Into::into).inspect_err(|e| {
        if e.kind() == ErrorKind::StorageUnavailable {
            tracing::error!(op, error = %e, "sqlite operation failed");
        } else {
            tracing::debug!(op, error = %e, "sqlite operation rejected");
        }
    })
}

fn identity_conflict(e: rusqlite::Error) -> AppError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            AppError::validation("Username or email already exists")
        }
        _ => AppError::Db(e),
    }
}

impl SqliteStore {
    /// Open (creating when needed) the database file and bring the schema up to date.
    pub fn open(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut pool = DbPool::new(path).map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "cannot open database");
            AppError::StorageUnavailable(format!("{}: {}", path.display(), e))
        })?;
        init_db(&mut pool.conn)?;
        Ok(Self { pool })
    }

    /// Private in-memory database with the full schema.
    pub fn in_memory() -> AppResult<Self> {
        let mut pool = DbPool::in_memory()?;
        init_db(&mut pool.conn)?;
        Ok(Self { pool })
    }

    pub fn connection(&self) -> &Connection {
        &self.pool.conn
    }

    fn insert_worker_tx(&mut self, input: &WorkerInput) -> AppResult<Worker> {
        let now = date::now();
        let tx = self.pool.conn.transaction()?;

        let id = queries::insert_worker(&tx, input, &now)?;
        queries::insert_activity(
            &tx,
            &NewActivity::for_worker(
                id,
                ActivityType::WorkerAdded,
                format!("Added new worker: {}", input.name),
            ),
            &now,
        )?;
        let worker =
            queries::get_worker(&tx, id)?.ok_or_else(|| AppError::not_found(worker_label(id)))?;

        tx.commit()?;
        Ok(worker)
    }

    fn update_worker_tx(&mut self, id: i64, input: &WorkerInput) -> AppResult<Worker> {
        let now = date::now();
        let tx = self.pool.conn.transaction()?;

        if queries::update_worker(&tx, id, input)? == 0 {
            return Err(AppError::not_found(worker_label(id)));
        }
        queries::insert_activity(
            &tx,
            &NewActivity::for_worker(
                id,
                ActivityType::WorkerUpdated,
                format!("Updated worker: {}", input.name),
            ),
            &now,
        )?;
        let worker =
            queries::get_worker(&tx, id)?.ok_or_else(|| AppError::not_found(worker_label(id)))?;

        tx.commit()?;
        Ok(worker)
    }

    fn delete_worker_tx(&mut self, id: i64) -> AppResult<Worker> {
        let now = date::now();
        let tx = self
            .pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let worker =
            queries::get_worker(&tx, id)?.ok_or_else(|| AppError::not_found(worker_label(id)))?;
        queries::delete_worker_cascade(&tx, id)?;
        queries::insert_activity(
            &tx,
            &NewActivity {
                worker_id: None,
                task_id: None,
                activity_type: ActivityType::WorkerRemoved,
                description: format!("Removed worker: {}", worker.name),
            },
            &now,
        )?;

        tx.commit()?;
        Ok(worker)
    }

    fn add_task_tx(
        &mut self,
        worker_id: i64,
        description: &str,
        sample: WorkSample,
    ) -> AppResult<Task> {
        let now = date::now();
        // IMMEDIATE takes the write lock before the worker is read.
        let tx = self
            .pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let worker = queries::get_worker(&tx, worker_id)?
            .ok_or_else(|| AppError::not_found(worker_label(worker_id)))?;

        let task_id = queries::insert_task(&tx, worker_id, description, &now)?;
        queries::insert_prediction(
            &tx,
            &heuristic_prediction(&worker, worker.tasks_completed, sample),
            &now,
        )?;
        queries::increment_tasks_to_complete(&tx, worker_id)?;
        queries::insert_activity(
            &tx,
            &NewActivity {
                worker_id: Some(worker_id),
                task_id: Some(task_id),
                activity_type: ActivityType::TaskAdded,
                description: format!("Assigned task: {}", description),
            },
            &now,
        )?;
        let task = queries::get_task(&tx, task_id)?
            .ok_or_else(|| AppError::not_found(task_label(task_id)))?;

        tx.commit()?;
        Ok(task)
    }

    fn complete_task_tx(&mut self, task_id: i64, sample: WorkSample) -> AppResult<Task> {
        let now = date::now();
        let tx = self
            .pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let task = queries::get_task(&tx, task_id)?
            .ok_or_else(|| AppError::not_found(task_label(task_id)))?;
        if task.is_completed {
            return Err(AppError::validation("Task is already completed"));
        }

        queries::mark_task_completed(&tx, task_id)?;
        queries::increment_tasks_completed(&tx, task.worker_id)?;

        // Re-read: tasks_completed now includes this task.
        let worker = queries::get_worker(&tx, task.worker_id)?
            .ok_or_else(|| AppError::not_found(worker_label(task.worker_id)))?;
        queries::insert_prediction(
            &tx,
            &heuristic_prediction(&worker, worker.tasks_completed, sample),
            &now,
        )?;
        queries::insert_activity(
            &tx,
            &NewActivity {
                worker_id: Some(worker.id),
                task_id: Some(task_id),
                activity_type: ActivityType::TaskCompleted,
                description: format!("Completed task: {}", task.description),
            },
            &now,
        )?;
        let done = queries::get_task(&tx, task_id)?
            .ok_or_else(|| AppError::not_found(task_label(task_id)))?;

        tx.commit()?;
        Ok(done)
    }

    fn worker_overviews_inner(&mut self) -> AppResult<Vec<WorkerOverview>> {
        let conn = &self.pool.conn;
        let mut out = Vec::new();
        for worker in queries::list_workers(conn)? {
            let (total_tasks, completed_tasks, avg_efficiency) =
                queries::worker_task_totals(conn, worker.id)?;
            let open_tasks = queries::list_tasks(conn, Some(worker.id), true)?;
            out.push(WorkerOverview {
                worker,
                total_tasks,
                completed_tasks,
                avg_efficiency,
                open_tasks,
            });
        }
        Ok(out)
    }

    fn user_by_id(&self, id: i64) -> AppResult<User> {
        queries::find_user_by_id(&self.pool.conn, id)?
            .ok_or_else(|| AppError::not_found(user_label(id)))
    }
}

impl Store for SqliteStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    fn list_workers(&mut self) -> AppResult<Vec<Worker>> {
        traced("list_workers", queries::list_workers(&self.pool.conn))
    }

    fn worker_overviews(&mut self) -> AppResult<Vec<WorkerOverview>> {
        let res = self.worker_overviews_inner();
        traced("worker_overviews", res)
    }

    fn get_worker(&mut self, id: i64) -> AppResult<Option<Worker>> {
        traced("get_worker", queries::get_worker(&self.pool.conn, id))
    }

    fn insert_worker(&mut self, input: &WorkerInput) -> AppResult<Worker> {
        let res = self.insert_worker_tx(input);
        if let Ok(w) = &res {
            tracing::info!(worker_id = w.id, "worker added");
        }
        traced("insert_worker", res)
    }

    fn update_worker(&mut self, id: i64, input: &WorkerInput) -> AppResult<Worker> {
        let res = self.update_worker_tx(id, input);
        traced("update_worker", res)
    }

    fn delete_worker(&mut self, id: i64) -> AppResult<Worker> {
        let res = self.delete_worker_tx(id);
        if res.is_ok() {
            tracing::info!(worker_id = id, "worker removed");
        }
        traced("delete_worker", res)
    }

    fn add_task(
        &mut self,
        worker_id: i64,
        description: &str,
        sample: WorkSample,
    ) -> AppResult<Task> {
        let res = self.add_task_tx(worker_id, description, sample);
        traced("add_task", res)
    }

    fn complete_task(&mut self, task_id: i64, sample: WorkSample) -> AppResult<Task> {
        let res = self.complete_task_tx(task_id, sample);
        traced("complete_task", res)
    }

    fn list_tasks(&mut self, worker_id: Option<i64>, open_only: bool) -> AppResult<Vec<Task>> {
        traced(
            "list_tasks",
            queries::list_tasks(&self.pool.conn, worker_id, open_only),
        )
    }

    fn insert_prediction(&mut self, prediction: &NewPrediction) -> AppResult<PredictionRecord> {
        let now = date::now();
        let conn = &self.pool.conn;
        let res = queries::insert_prediction(conn, prediction, &now)
            .and_then(|id| queries::get_prediction(conn, id));
        traced("insert_prediction", res)?
            .ok_or_else(|| AppError::Other("inserted prediction row vanished".into()))
    }

    fn prediction_history(
        &mut self,
        worker_id: i64,
        limit: usize,
    ) -> AppResult<Vec<PredictionRecord>> {
        traced(
            "prediction_history",
            queries::prediction_history(&self.pool.conn, worker_id, limit),
        )
    }

    fn recent_predictions(&mut self, limit: usize) -> AppResult<Vec<PredictionRecord>> {
        traced(
            "recent_predictions",
            queries::recent_predictions(&self.pool.conn, limit),
        )
    }

    fn feature_aggregates(
        &mut self,
        worker_id: i64,
        since: &NaiveDateTime,
    ) -> AppResult<FeatureAggregates> {
        traced(
            "feature_aggregates",
            queries::feature_aggregates(&self.pool.conn, worker_id, since),
        )
    }

    fn log_activity(&mut self, activity: &NewActivity) -> AppResult<i64> {
        traced(
            "log_activity",
            queries::insert_activity(&self.pool.conn, activity, &date::now()),
        )
    }

    fn recent_activities(&mut self, limit: usize) -> AppResult<Vec<Activity>> {
        traced(
            "recent_activities",
            queries::recent_activities(&self.pool.conn, limit),
        )
    }

    fn find_user_by_username(&mut self, username: &str) -> AppResult<Option<User>> {
        traced(
            "find_user_by_username",
            queries::find_user_by_username(&self.pool.conn, username),
        )
    }

    fn find_user_by_id(&mut self, id: i64) -> AppResult<Option<User>> {
        traced("find_user_by_id", queries::find_user_by_id(&self.pool.conn, id))
    }

    fn identity_taken(
        &mut self,
        username: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        traced(
            "identity_taken",
            queries::identity_taken(&self.pool.conn, username, email, exclude_id),
        )
    }

    fn insert_user(&mut self, user: &NewUser) -> AppResult<User> {
        let res = queries::insert_user(&self.pool.conn, user, &date::now())
            .map_err(identity_conflict)
            .and_then(|id| self.user_by_id(id));
        traced("insert_user", res)
    }

    fn touch_last_login(&mut self, id: i64) -> AppResult<User> {
        let res = queries::touch_last_login(&self.pool.conn, id, &date::now())
            .map_err(AppError::from)
            .and_then(|_| self.user_by_id(id));
        traced("touch_last_login", res)
    }

    fn update_identity(&mut self, id: i64, username: &str, email: &str) -> AppResult<User> {
        let res = queries::update_identity(&self.pool.conn, id, username, email)
            .map_err(identity_conflict)
            .and_then(|n| {
                if n == 0 {
                    Err(AppError::not_found(user_label(id)))
                } else {
                    self.user_by_id(id)
                }
            });
        traced("update_identity", res)
    }

    fn dashboard_stats(&mut self, high_performance_threshold: f64) -> AppResult<DashboardStats> {
        traced(
            "dashboard_stats",
            queries::dashboard_stats(&self.pool.conn, high_performance_threshold),
        )
    }

    fn analytics(
        &mut self,
        metric: AnalyticsMetric,
        from: NaiveDate,
        to: NaiveDate,
        worker_id: Option<i64>,
    ) -> AppResult<Vec<AnalyticsPoint>> {
        traced(
            "analytics",
            queries::analytics(&self.pool.conn, metric, &from, &to, worker_id),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::status::WorkerStatus;

    fn sample() -> WorkSample {
        WorkSample {
            hours_worked: 6.0,
            efficiency_rate: 0.8,
            confidence: 0.9,
        }
    }

    fn input(name: &str) -> WorkerInput {
        WorkerInput {
            name: name.into(),
            role: "Developer".into(),
            salary: 4200.0,
            status: WorkerStatus::Active,
            performance_score: 9.0,
        }
    }

    #[test]
    fn add_and_complete_task_update_counters() {
        let mut store = SqliteStore::in_memory().unwrap();
        let w = store.insert_worker(&input("John Doe")).unwrap();

        let task = store.add_task(w.id, "Build login", sample()).unwrap();
        assert!(!task.is_completed);
        let w1 = store.get_worker(w.id).unwrap().unwrap();
        assert_eq!(w1.tasks_to_complete, 1);

        let done = store.complete_task(task.id, sample()).unwrap();
        assert!(done.is_completed);
        let w2 = store.get_worker(w.id).unwrap().unwrap();
        assert_eq!(w2.tasks_completed, 1);

        let history = store.prediction_history(w.id, 10).unwrap();
        assert_eq!(history.len(), 2);
        // newest first: the completion row carries the bumped counter
        assert_eq!(history[0].tasks_completed, 1);
        assert!((history[0].predicted_score - 8.5).abs() < 1e-9);

        let again = store.complete_task(task.id, sample()).unwrap_err();
        assert_eq!(again.kind(), ErrorKind::ValidationFailed);
    }

    #[test]
    fn failed_prediction_insert_rolls_back_completion() {
        let mut store = SqliteStore::in_memory().unwrap();
        let w = store.insert_worker(&input("Jane Smith")).unwrap();
        let task = store.add_task(w.id, "Fix bug", sample()).unwrap();

        store
            .connection()
            .execute_batch(
                "CREATE TRIGGER reject_predictions BEFORE INSERT ON performance_predictions
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .unwrap();

        let err = store.complete_task(task.id, sample()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StorageUnavailable);

        let after = store.list_tasks(Some(w.id), false).unwrap();
        assert!(!after[0].is_completed);
        assert_eq!(store.get_worker(w.id).unwrap().unwrap().tasks_completed, 0);
    }

    #[test]
    fn delete_worker_keeps_detached_activity_log() {
        let mut store = SqliteStore::in_memory().unwrap();
        let w = store.insert_worker(&input("John Doe")).unwrap();
        store.add_task(w.id, "Review", sample()).unwrap();

        let removed = store.delete_worker(w.id).unwrap();
        assert_eq!(removed.name, "John Doe");
        assert!(store.get_worker(w.id).unwrap().is_none());
        assert!(store.list_tasks(Some(w.id), false).unwrap().is_empty());
        assert!(store.prediction_history(w.id, 10).unwrap().is_empty());

        let log = store.recent_activities(10).unwrap();
        assert_eq!(log[0].activity_type, ActivityType::WorkerRemoved);
        assert!(log.iter().all(|a| a.worker_id.is_none()));
        assert_eq!(log.len(), 3);

        let missing = store.delete_worker(w.id).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn duplicate_identity_maps_to_validation() {
        let mut store = SqliteStore::in_memory().unwrap();
        let u = NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "h".into(),
            role: "user".into(),
        };
        store.insert_user(&u).unwrap();
        let err = store.insert_user(&u).unwrap_err();
        assert_eq!(err.to_string(), "Username or email already exists");
    }
}
