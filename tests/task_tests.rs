use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::Sandbox;

#[test]
fn assign_and_complete_a_task() {
    let sb = Sandbox::new().with_worker();

    sb.as_alice()
        .args(["task", "add", "1", "Write", "the", "release", "notes"])
        .assert()
        .success()
        .stdout(contains("Task 1 assigned to worker 1"));

    sb.as_alice()
        .args(["task", "list", "--open"])
        .assert()
        .success()
        .stdout(contains("Write the release notes"));

    sb.as_alice()
        .args(["task", "done", "1"])
        .assert()
        .success()
        .stdout(contains("Task 1 completed"));

    sb.as_alice()
        .args(["task", "done", "1"])
        .assert()
        .failure()
        .stderr(contains("Task is already completed"));

    sb.as_alice()
        .args(["task", "list", "--open"])
        .assert()
        .success()
        .stdout(contains("No tasks found."));

    sb.as_alice()
        .args(["worker", "show", "1", "--json"])
        .assert()
        .success()
        .stdout(contains("\"tasks_completed\": 1").and(contains("\"tasks_to_complete\": 1")));

    sb.as_alice()
        .args(["history", "1"])
        .assert()
        .success()
        .stdout(contains("John Doe"));
}

#[test]
fn unknown_worker_or_task() {
    let sb = Sandbox::new().ready();

    sb.as_alice()
        .args(["task", "add", "42", "Anything"])
        .assert()
        .failure()
        .stderr(contains("Worker 42 not found"));

    sb.as_alice()
        .args(["task", "done", "42"])
        .assert()
        .failure()
        .stderr(contains("Task 42 not found"));
}
