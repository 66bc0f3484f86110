use crate::errors::{AppError, AppResult};
use crate::models::worker::Worker;
use crate::store::Store;
use crate::utils::validation::{WorkerForm, validate_worker};

/// Form pre-filled with a stored worker, for partial edits.
pub fn form_from(worker: &Worker) -> WorkerForm {
    WorkerForm {
        name: worker.name.clone(),
        position: worker.role.clone(),
        salary: worker.salary.to_string(),
        status: worker.status.to_db_str().to_string(),
        performance_score: worker.performance_score.to_string(),
    }
}

/// High-level business logic for the `worker` commands.
pub struct WorkerLogic;

impl WorkerLogic {
    pub fn create(store: &mut dyn Store, form: &WorkerForm) -> AppResult<Worker> {
        let input = validate_worker(form)?;
        store.insert_worker(&input)
    }

    pub fn update(store: &mut dyn Store, id: i64, form: &WorkerForm) -> AppResult<Worker> {
        let input = validate_worker(form)?;
        store.update_worker(id, &input)
    }

    pub fn get(store: &mut dyn Store, id: i64) -> AppResult<Worker> {
        store
            .get_worker(id)?
            .ok_or_else(|| AppError::not_found(format!("Worker {}", id)))
    }

    pub fn delete(store: &mut dyn Store, id: i64) -> AppResult<Worker> {
        store.delete_worker(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::store::MemoryStore;

    fn form() -> WorkerForm {
        WorkerForm {
            name: "Jane Smith".into(),
            position: "Designer".into(),
            salary: "$3,500.00".into(),
            status: "on-leave".into(),
            performance_score: "9".into(),
        }
    }

    #[test]
    fn invalid_form_is_not_stored() {
        let mut store = MemoryStore::new();
        let bad = WorkerForm {
            performance_score: "11".into(),
            ..form()
        };
        let err = WorkerLogic::create(&mut store, &bad).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationFailed);
        assert!(store.list_workers().unwrap().is_empty());
    }

    #[test]
    fn partial_edit_keeps_other_fields() {
        let mut store = MemoryStore::new();
        let w = WorkerLogic::create(&mut store, &form()).unwrap();
        assert_eq!(w.salary, 3500.0);

        let mut edit = form_from(&w);
        edit.position = "Lead Designer".into();
        let updated = WorkerLogic::update(&mut store, w.id, &edit).unwrap();
        assert_eq!(updated.role, "Lead Designer");
        assert_eq!(updated.salary, 3500.0);
        assert_eq!(updated.status, w.status);

        let missing = WorkerLogic::update(&mut store, 999, &edit).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);
    }
}
