use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::Sandbox;

#[test]
fn add_list_show_update_delete() {
    let sb = Sandbox::new().with_worker();

    sb.as_alice()
        .args(["worker", "list"])
        .assert()
        .success()
        .stdout(contains("John Doe").and(contains("$4,200.00")));

    sb.as_alice()
        .args(["worker", "update", "1", "--status", "on_leave", "--score", "9.5"])
        .assert()
        .success()
        .stdout(contains("Worker 'John Doe' updated"));

    sb.as_alice()
        .args(["worker", "show", "1", "--json"])
        .assert()
        .success()
        .stdout(contains("\"status\": \"on_leave\"").and(contains("\"performance_score\": 9.5")));

    sb.as_alice()
        .args(["worker", "delete", "1", "--yes"])
        .assert()
        .success()
        .stdout(contains("has been deleted"));

    sb.as_alice()
        .args(["worker", "show", "1"])
        .assert()
        .failure()
        .stderr(contains("Worker 1 not found"));

    sb.as_alice()
        .arg("activity")
        .assert()
        .success()
        .stdout(contains("Removed worker: John Doe"));
}

#[test]
fn invalid_payloads_are_rejected_with_their_message() {
    let sb = Sandbox::new().ready();

    let cases: [(&[&str], &str); 4] = [
        (
            &["X", "--position", "Developer", "--salary", "1", "--score", "5"],
            "Name must be a string with at least 2 characters",
        ),
        (
            &["John", "--position", "Developer", "--salary", "-5", "--score", "5"],
            "Salary cannot be negative",
        ),
        (
            &["John", "--position", "Developer", "--salary", "1", "--score", "11"],
            "Performance score must be between 0 and 10",
        ),
        (
            &["John", "--position", "Developer", "--salary", "1", "--score", "5", "--status", "retired"],
            "Status must be one of",
        ),
    ];

    for (args, message) in cases {
        sb.as_alice()
            .args(["worker", "add"])
            .args(args)
            .assert()
            .failure()
            .stderr(contains(message));
    }

    sb.as_alice()
        .args(["worker", "list", "--json"])
        .assert()
        .success()
        .stdout(contains("[]"));
}

#[test]
fn delete_can_be_cancelled() {
    let sb = Sandbox::new().with_worker();

    sb.as_alice()
        .args(["worker", "delete", "1"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(contains("Operation cancelled."));

    sb.as_alice()
        .args(["worker", "show", "1"])
        .assert()
        .success()
        .stdout(contains("John Doe"));
}
