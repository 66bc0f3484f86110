use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use std::fs;

mod common;
use common::Sandbox;

fn training_csv(sb: &Sandbox, rows: usize) -> String {
    let path = sb.home.path().join("training.csv");
    let mut body = String::from("hours_worked,tasks_completed,efficiency_rate,completion_rate,score\n");
    for i in 0..rows {
        let hours = 20.0 + i as f64 * 5.0;
        let tasks = i as f64;
        let eff = 0.6 + (i % 4) as f64 * 0.1;
        let score = (hours / 10.0 + eff * 2.0).min(10.0);
        let done = 0.5 + (i % 3) as f64 * 0.2;
        body.push_str(&format!("{hours},{tasks},{eff},{done},{score}\n"));
    }
    fs::write(&path, body).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn untrained_model_gives_the_unsaved_default() {
    let sb = Sandbox::new().with_worker();

    sb.as_alice()
        .args(["predict", "1", "--json"])
        .assert()
        .success()
        .stdout(contains("\"source\": \"fallback\""))
        .stdout(contains("\"predicted_score\": 5.0"))
        .stdout(contains("\"record_id\": null"));

    sb.as_alice()
        .args(["history", "1"])
        .assert()
        .success()
        .stdout(contains("No predictions yet"));
}

#[test]
fn trained_model_predictions_are_stored() {
    let sb = Sandbox::new().with_worker();
    let csv = training_csv(&sb, 12);

    sb.as_alice()
        .args(["model", "train", &csv])
        .assert()
        .success()
        .stdout(contains("Model trained and saved").and(contains("12 (9 train / 3 test)")));

    sb.as_alice()
        .args(["model", "info", "--json"])
        .assert()
        .success()
        .stdout(contains("\"fitted\": true").and(contains("\"train_samples\": 9")));

    sb.as_alice()
        .args(["task", "add", "1", "Ship it"])
        .assert()
        .success();

    sb.as_alice()
        .args(["predict", "1", "--json"])
        .assert()
        .success()
        .stdout(contains("\"source\": \"model\""))
        .stdout(contains("hours_worked"));

    sb.as_alice()
        .args(["predict", "42"])
        .assert()
        .failure()
        .stderr(contains("Worker 42 not found"));
}

#[test]
fn training_needs_enough_rows() {
    let sb = Sandbox::new().ready();
    let csv = training_csv(&sb, 3);

    sb.as_alice()
        .args(["model", "train", &csv])
        .assert()
        .failure()
        .stderr(contains("At least 5 training samples"));
}
