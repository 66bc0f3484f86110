//! In-memory backend for offline development and tests.
//!
//! Same contract as the SQLite store. Compound operations run against a
//! snapshot of the state which is put back when any step fails.

use super::{Store, heuristic_prediction, task_label, user_label, worker_label};
use crate::config::Backend;
use crate::errors::{AppError, AppResult};
use crate::models::activity::{Activity, ActivityType, NewActivity};
use crate::models::analytics::{AnalyticsMetric, AnalyticsPoint};
use crate::models::prediction::{FeatureAggregates, NewPrediction, PredictionRecord};
use crate::models::status::WorkerStatus;
use crate::models::task::{Task, WorkSample};
use crate::models::user::{NewUser, User};
use crate::models::worker::{DashboardStats, Worker, WorkerInput, WorkerOverview};
use crate::utils::date;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default)]
struct State {
    workers: Vec<Worker>,
    tasks: Vec<Task>,
    predictions: Vec<NewPredictionRow>,
    activities: Vec<ActivityRow>,
    users: Vec<User>,
    next_id: NextIds,
    #[cfg(test)]
    reject_predictions: bool,
}

#[derive(Debug, Clone, Default)]
struct NextIds {
    worker: i64,
    task: i64,
    prediction: i64,
    activity: i64,
    user: i64,
}

fn bump(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[derive(Debug, Clone)]
struct NewPredictionRow {
    id: i64,
    row: NewPrediction,
    created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
struct ActivityRow {
    id: i64,
    row: NewActivity,
    created_at: NaiveDateTime,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    state: State,
}

impl State {
    fn worker(&self, id: i64) -> AppResult<&Worker> {
        self.workers
            .iter()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::not_found(worker_label(id)))
    }

    fn worker_mut(&mut self, id: i64) -> AppResult<&mut Worker> {
        self.workers
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| AppError::not_found(worker_label(id)))
    }

    fn worker_name(&self, id: Option<i64>) -> Option<String> {
        id.and_then(|id| self.workers.iter().find(|w| w.id == id))
            .map(|w| w.name.clone())
    }

    fn push_activity(&mut self, row: NewActivity, at: NaiveDateTime) -> i64 {
        let id = bump(&mut self.next_id.activity);
        self.activities.push(ActivityRow {
            id,
            row,
            created_at: at,
        });
        id
    }

    fn push_prediction(&mut self, row: NewPrediction, at: NaiveDateTime) -> AppResult<i64> {
        #[cfg(test)]
        if self.reject_predictions {
            return Err(AppError::StorageUnavailable("prediction insert rejected".into()));
        }
        if !(0.0..=10.0).contains(&row.predicted_score) {
            return Err(AppError::validation(
                "Predicted score must be between 0 and 10",
            ));
        }
        self.worker(row.worker_id)?;

        let id = bump(&mut self.next_id.prediction);
        self.predictions.push(NewPredictionRow {
            id,
            row,
            created_at: at,
        });
        Ok(id)
    }

    fn record(&self, p: &NewPredictionRow) -> PredictionRecord {
        PredictionRecord {
            id: p.id,
            worker_id: p.row.worker_id,
            worker_name: self.worker_name(Some(p.row.worker_id)),
            hours_worked: p.row.hours_worked,
            tasks_completed: p.row.tasks_completed,
            efficiency_rate: p.row.efficiency_rate,
            predicted_score: p.row.predicted_score,
            confidence_score: p.row.confidence_score,
            created_at: p.created_at,
        }
    }

    fn activity(&self, a: &ActivityRow) -> Activity {
        Activity {
            id: a.id,
            worker_id: a.row.worker_id,
            task_id: a.row.task_id,
            activity_type: a.row.activity_type,
            description: a.row.description.clone(),
            created_at: a.created_at,
            worker_name: self.worker_name(a.row.worker_id),
        }
    }

    fn user(&self, id: i64) -> AppResult<User> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found(user_label(id)))
    }

    fn identity_taken(&self, username: &str, email: &str, exclude_id: Option<i64>) -> bool {
        self.users.iter().any(|u| {
            Some(u.id) != exclude_id && (u.username == username || u.email == email)
        })
    }
}

/// Newest first, ties broken by id.
fn newest_first<T>(items: &mut [T], key: impl Fn(&T) -> (NaiveDateTime, i64)) {
    items.sort_by(|a, b| key(b).cmp(&key(a)));
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Two workers, two activities and four predictions dated 2025-06-09.
    pub fn with_demo_data() -> Self {
        let mut store = Self::new();
        let st = &mut store.state;
        let at = |s: &str| date::parse_ts(s).unwrap_or_default();

        for (name, role, score, created) in [
            ("John Doe", "Developer", 8.5, "2025-06-09 10:00:00"),
            ("Jane Smith", "Designer", 9.0, "2025-06-09 11:00:00"),
        ] {
            let id = bump(&mut st.next_id.worker);
            st.workers.push(Worker {
                id,
                name: name.to_string(),
                role: role.to_string(),
                salary: 0.0,
                status: WorkerStatus::Active,
                performance_score: score,
                tasks_completed: 0,
                tasks_to_complete: 0,
                created_at: at(created),
            });
        }

        for (worker_id, kind, desc, created) in [
            (
                1,
                ActivityType::TaskCompleted,
                "Completed project milestone",
                "2025-06-09 10:30:00",
            ),
            (
                2,
                ActivityType::System,
                "Fixed critical bug",
                "2025-06-09 11:30:00",
            ),
        ] {
            st.push_activity(
                NewActivity::for_worker(worker_id, kind, desc.to_string()),
                at(created),
            );
        }

        for (worker_id, hours, tasks, eff, score, conf, created) in [
            (1, 8.0, 5, 0.85, 8.5, 0.80, "2025-06-09 10:00:00"),
            (2, 7.5, 4, 0.90, 9.0, 0.85, "2025-06-09 11:00:00"),
            (1, 8.5, 6, 0.88, 8.8, 0.82, "2025-06-09 12:00:00"),
            (2, 8.2, 5, 0.92, 9.2, 0.88, "2025-06-09 13:00:00"),
        ] {
            let id = bump(&mut st.next_id.prediction);
            st.predictions.push(NewPredictionRow {
                id,
                row: NewPrediction {
                    worker_id,
                    hours_worked: hours,
                    tasks_completed: tasks,
                    efficiency_rate: eff,
                    predicted_score: score,
                    confidence_score: conf,
                },
                created_at: at(created),
            });
        }

        store
    }

    /// Run `f` against the live state; on error the pre-call snapshot is restored.
    fn atomically<T>(&mut self, f: impl FnOnce(&mut State) -> AppResult<T>) -> AppResult<T> {
        let snapshot = self.state.clone();
        match f(&mut self.state) {
            Ok(v) => Ok(v),
            Err(e) => {
                tracing::debug!(error = %e, "memory store rolled back");
                self.state = snapshot;
                Err(e)
            }
        }
    }

    #[cfg(test)]
    fn reject_predictions(&mut self, on: bool) {
        self.state.reject_predictions = on;
    }
}

impl Store for MemoryStore {
    fn backend(&self) -> Backend {
        Backend::Memory
    }

    fn list_workers(&mut self) -> AppResult<Vec<Worker>> {
        let mut out = self.state.workers.clone();
        newest_first(&mut out, |w| (w.created_at, w.id));
        Ok(out)
    }

    fn worker_overviews(&mut self) -> AppResult<Vec<WorkerOverview>> {
        let workers = self.list_workers()?;
        let st = &self.state;

        Ok(workers
            .into_iter()
            .map(|worker| {
                let tasks: Vec<&Task> = st.tasks.iter().filter(|t| t.worker_id == worker.id).collect();
                let effs: Vec<f64> = st
                    .predictions
                    .iter()
                    .filter(|p| p.row.worker_id == worker.id)
                    .map(|p| p.row.efficiency_rate)
                    .collect();
                let mut open_tasks: Vec<Task> =
                    tasks.iter().filter(|t| !t.is_completed).map(|t| (*t).clone()).collect();
                newest_first(&mut open_tasks, |t| (t.created_at, t.id));

                WorkerOverview {
                    total_tasks: tasks.len() as i64,
                    completed_tasks: tasks.iter().filter(|t| t.is_completed).count() as i64,
                    avg_efficiency: mean(&effs).unwrap_or(0.0),
                    open_tasks,
                    worker,
                }
            })
            .collect())
    }

    fn get_worker(&mut self, id: i64) -> AppResult<Option<Worker>> {
        Ok(self.state.workers.iter().find(|w| w.id == id).cloned())
    }

    fn insert_worker(&mut self, input: &WorkerInput) -> AppResult<Worker> {
        let now = date::now();
        self.atomically(|st| {
            let id = bump(&mut st.next_id.worker);
            let worker = Worker {
                id,
                name: input.name.clone(),
                role: input.role.clone(),
                salary: input.salary,
                status: input.status,
                performance_score: input.performance_score,
                tasks_completed: 0,
                tasks_to_complete: 0,
                created_at: now,
            };
            st.workers.push(worker.clone());
            st.push_activity(
                NewActivity::for_worker(
                    id,
                    ActivityType::WorkerAdded,
                    format!("Added new worker: {}", input.name),
                ),
                now,
            );
            Ok(worker)
        })
    }

    fn update_worker(&mut self, id: i64, input: &WorkerInput) -> AppResult<Worker> {
        let now = date::now();
        self.atomically(|st| {
            let w = st.worker_mut(id)?;
            w.name = input.name.clone();
            w.role = input.role.clone();
            w.salary = input.salary;
            w.status = input.status;
            w.performance_score = input.performance_score;
            let updated = w.clone();

            st.push_activity(
                NewActivity::for_worker(
                    id,
                    ActivityType::WorkerUpdated,
                    format!("Updated worker: {}", input.name),
                ),
                now,
            );
            Ok(updated)
        })
    }

    fn delete_worker(&mut self, id: i64) -> AppResult<Worker> {
        let now = date::now();
        self.atomically(|st| {
            let worker = st.worker(id)?.clone();
            let task_ids: Vec<i64> = st
                .tasks
                .iter()
                .filter(|t| t.worker_id == id)
                .map(|t| t.id)
                .collect();

            for a in st.activities.iter_mut() {
                let by_task = a.row.task_id.is_some_and(|t| task_ids.contains(&t));
                if a.row.worker_id == Some(id) || by_task {
                    a.row.worker_id = None;
                    a.row.task_id = None;
                }
            }
            st.predictions.retain(|p| p.row.worker_id != id);
            st.tasks.retain(|t| t.worker_id != id);
            st.workers.retain(|w| w.id != id);

            st.push_activity(
                NewActivity {
                    worker_id: None,
                    task_id: None,
                    activity_type: ActivityType::WorkerRemoved,
                    description: format!("Removed worker: {}", worker.name),
                },
                now,
            );
            Ok(worker)
        })
    }

    fn add_task(
        &mut self,
        worker_id: i64,
        description: &str,
        sample: WorkSample,
    ) -> AppResult<Task> {
        let now = date::now();
        self.atomically(|st| {
            let worker = st.worker(worker_id)?.clone();

            let task = Task {
                id: bump(&mut st.next_id.task),
                worker_id,
                description: description.to_string(),
                is_completed: false,
                created_at: now,
            };
            st.tasks.push(task.clone());
            st.push_prediction(
                heuristic_prediction(&worker, worker.tasks_completed, sample),
                now,
            )?;
            st.worker_mut(worker_id)?.tasks_to_complete += 1;
            st.push_activity(
                NewActivity {
                    worker_id: Some(worker_id),
                    task_id: Some(task.id),
                    activity_type: ActivityType::TaskAdded,
                    description: format!("Assigned task: {}", description),
                },
                now,
            );
            Ok(task)
        })
    }

    fn complete_task(&mut self, task_id: i64, sample: WorkSample) -> AppResult<Task> {
        let now = date::now();
        self.atomically(|st| {
            let task = st
                .tasks
                .iter_mut()
                .find(|t| t.id == task_id)
                .ok_or_else(|| AppError::not_found(task_label(task_id)))?;
            if task.is_completed {
                return Err(AppError::validation("Task is already completed"));
            }
            task.is_completed = true;
            let task = task.clone();

            let worker = st.worker_mut(task.worker_id)?;
            worker.tasks_completed += 1;
            let worker = worker.clone();

            st.push_prediction(
                heuristic_prediction(&worker, worker.tasks_completed, sample),
                now,
            )?;
            st.push_activity(
                NewActivity {
                    worker_id: Some(worker.id),
                    task_id: Some(task_id),
                    activity_type: ActivityType::TaskCompleted,
                    description: format!("Completed task: {}", task.description),
                },
                now,
            );
            Ok(task)
        })
    }

    fn list_tasks(&mut self, worker_id: Option<i64>, open_only: bool) -> AppResult<Vec<Task>> {
        let mut out: Vec<Task> = self
            .state
            .tasks
            .iter()
            .filter(|t| worker_id.is_none_or(|w| t.worker_id == w))
            .filter(|t| !open_only || !t.is_completed)
            .cloned()
            .collect();
        newest_first(&mut out, |t| (t.created_at, t.id));
        Ok(out)
    }

    fn insert_prediction(&mut self, prediction: &NewPrediction) -> AppResult<PredictionRecord> {
        let now = date::now();
        let row = prediction.clone();
        self.atomically(|st| {
            let id = st.push_prediction(row, now)?;
            st.predictions
                .iter()
                .find(|p| p.id == id)
                .map(|p| st.record(p))
                .ok_or_else(|| AppError::Other("inserted prediction row vanished".into()))
        })
    }

    fn prediction_history(
        &mut self,
        worker_id: i64,
        limit: usize,
    ) -> AppResult<Vec<PredictionRecord>> {
        let st = &self.state;
        let mut out: Vec<PredictionRecord> = st
            .predictions
            .iter()
            .filter(|p| p.row.worker_id == worker_id)
            .map(|p| st.record(p))
            .collect();
        newest_first(&mut out, |p| (p.created_at, p.id));
        out.truncate(limit);
        Ok(out)
    }

    fn recent_predictions(&mut self, limit: usize) -> AppResult<Vec<PredictionRecord>> {
        let st = &self.state;
        let mut out: Vec<PredictionRecord> = st.predictions.iter().map(|p| st.record(p)).collect();
        newest_first(&mut out, |p| (p.created_at, p.id));
        out.truncate(limit);
        Ok(out)
    }

    fn feature_aggregates(
        &mut self,
        worker_id: i64,
        since: &NaiveDateTime,
    ) -> AppResult<FeatureAggregates> {
        let st = &self.state;
        let preds: Vec<&NewPrediction> = st
            .predictions
            .iter()
            .filter(|p| p.row.worker_id == worker_id && p.created_at >= *since)
            .map(|p| &p.row)
            .collect();
        let tasks: Vec<&Task> = st
            .tasks
            .iter()
            .filter(|t| t.worker_id == worker_id && t.created_at >= *since)
            .collect();

        let completion: Vec<f64> = tasks
            .iter()
            .map(|t| if t.is_completed { 1.0 } else { 0.0 })
            .collect();
        let efficiency: Vec<f64> = preds.iter().map(|p| p.efficiency_rate).collect();

        Ok(FeatureAggregates {
            total_hours: (!preds.is_empty()).then(|| preds.iter().map(|p| p.hours_worked).sum()),
            tasks_completed: (!tasks.is_empty())
                .then(|| tasks.iter().filter(|t| t.is_completed).count() as i64),
            avg_efficiency: mean(&efficiency),
            avg_completion: mean(&completion),
        })
    }

    fn log_activity(&mut self, activity: &NewActivity) -> AppResult<i64> {
        if let Some(id) = activity.worker_id {
            self.state.worker(id)?;
        }
        Ok(self.state.push_activity(activity.clone(), date::now()))
    }

    fn recent_activities(&mut self, limit: usize) -> AppResult<Vec<Activity>> {
        let st = &self.state;
        let mut out: Vec<Activity> = st.activities.iter().map(|a| st.activity(a)).collect();
        newest_first(&mut out, |a| (a.created_at, a.id));
        out.truncate(limit);
        Ok(out)
    }

    fn find_user_by_username(&mut self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .state
            .users
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    fn find_user_by_id(&mut self, id: i64) -> AppResult<Option<User>> {
        Ok(self.state.users.iter().find(|u| u.id == id).cloned())
    }

    fn identity_taken(
        &mut self,
        username: &str,
        email: &str,
        exclude_id: Option<i64>,
    ) -> AppResult<bool> {
        Ok(self.state.identity_taken(username, email, exclude_id))
    }

    fn insert_user(&mut self, user: &NewUser) -> AppResult<User> {
        if self.state.identity_taken(&user.username, &user.email, None) {
            return Err(AppError::validation("Username or email already exists"));
        }
        let st = &mut self.state;
        let created = User {
            id: bump(&mut st.next_id.user),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role.clone(),
            created_at: date::now(),
            last_login: None,
        };
        st.users.push(created.clone());
        Ok(created)
    }

    fn touch_last_login(&mut self, id: i64) -> AppResult<User> {
        let user = self
            .state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(user_label(id)))?;
        user.last_login = Some(date::now());
        Ok(user.clone())
    }

    fn update_identity(&mut self, id: i64, username: &str, email: &str) -> AppResult<User> {
        if self.state.identity_taken(username, email, Some(id)) {
            return Err(AppError::validation("Username or email already exists"));
        }
        let user = self
            .state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::not_found(user_label(id)))?;
        user.username = username.to_string();
        user.email = email.to_string();
        self.state.user(id)
    }

    fn dashboard_stats(&mut self, high_performance_threshold: f64) -> AppResult<DashboardStats> {
        let st = &self.state;
        let count = |status: WorkerStatus| st.workers.iter().filter(|w| w.status == status).count() as i64;

        Ok(DashboardStats {
            total: st.workers.len() as i64,
            active: count(WorkerStatus::Active),
            inactive: count(WorkerStatus::Inactive),
            on_leave: count(WorkerStatus::OnLeave),
            high_performance: st
                .workers
                .iter()
                .filter(|w| w.performance_score >= high_performance_threshold)
                .count() as i64,
            predictions: st.predictions.len() as i64,
            activities: st.activities.len() as i64,
        })
    }

    fn analytics(
        &mut self,
        metric: AnalyticsMetric,
        from: NaiveDate,
        to: NaiveDate,
        worker_id: Option<i64>,
    ) -> AppResult<Vec<AnalyticsPoint>> {
        let st = &self.state;
        let mut days: BTreeMap<NaiveDate, (Vec<f64>, Vec<f64>)> = BTreeMap::new();

        for p in &st.predictions {
            let day = p.created_at.date();
            if day < from || day > to || worker_id.is_some_and(|w| w != p.row.worker_id) {
                continue;
            }
            // Predictions of deleted workers drop out, as with the SQL join.
            let Ok(worker) = st.worker(p.row.worker_id) else {
                continue;
            };
            let value = match metric {
                AnalyticsMetric::Performance => worker.performance_score,
                AnalyticsMetric::Efficiency => p.row.efficiency_rate,
                AnalyticsMetric::Tasks => worker.tasks_completed as f64,
                AnalyticsMetric::Hours => p.row.hours_worked,
                AnalyticsMetric::Prediction => p.row.predicted_score,
            };
            let entry = days.entry(day).or_default();
            entry.0.push(value);
            entry.1.push(p.row.confidence_score);
        }

        Ok(days
            .into_iter()
            .map(|(day, (values, confidences))| {
                let tasks: Vec<&Task> = st
                    .tasks
                    .iter()
                    .filter(|t| t.created_at.date() == day)
                    .filter(|t| worker_id.is_none_or(|w| t.worker_id == w))
                    .collect();
                AnalyticsPoint {
                    date: day,
                    value: mean(&values).unwrap_or(0.0),
                    confidence: mean(&confidences).unwrap_or(0.0),
                    total_tasks: tasks.len() as i64,
                    completed_tasks: tasks.iter().filter(|t| t.is_completed).count() as i64,
                }
            })
            .collect())
    }
}
