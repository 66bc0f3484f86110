//! Library-level checks against a scratch SQLite file.

use crewpilot::errors::ErrorKind;
use crewpilot::models::status::WorkerStatus;
use crewpilot::models::task::WorkSample;
use crewpilot::models::worker::WorkerInput;
use crewpilot::store::{SqliteStore, Store};

fn sample() -> WorkSample {
    WorkSample {
        hours_worked: 6.0,
        efficiency_rate: 0.8,
        confidence: 0.9,
    }
}

fn input(name: &str) -> WorkerInput {
    WorkerInput {
        name: name.to_string(),
        role: "Developer".to_string(),
        salary: 3000.0,
        status: WorkerStatus::Active,
        performance_score: 7.0,
    }
}

#[test]
fn failed_prediction_insert_leaves_the_task_open() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = SqliteStore::open(&dir.path().join("crew.sqlite")).unwrap();

    let w = store.insert_worker(&input("Ada Lovelace")).unwrap();
    let task = store.add_task(w.id, "Analytical engine", sample()).unwrap();

    store
        .connection()
        .execute_batch(
            "CREATE TRIGGER block_predictions BEFORE INSERT ON performance_predictions
             BEGIN SELECT RAISE(ABORT, 'blocked'); END;",
        )
        .unwrap();

    let err = store.complete_task(task.id, sample()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);

    let open = store.list_tasks(Some(w.id), true).unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(store.get_worker(w.id).unwrap().unwrap().tasks_completed, 0);
}

#[test]
fn data_survives_reopening() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("crew.sqlite");

    {
        let mut store = SqliteStore::open(&path).unwrap();
        store.insert_worker(&input("Grace Hopper")).unwrap();
    }

    let mut store = SqliteStore::open(&path).unwrap();
    let workers = store.list_workers().unwrap();
    assert_eq!(workers.len(), 1);
    assert_eq!(workers[0].name, "Grace Hopper");
}
