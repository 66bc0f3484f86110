use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::Sandbox;

#[test]
fn scripted_session_survives_errors() {
    let sb = Sandbox::new();
    sb.cmd().arg("init").assert().success();

    let script = "\
workers
go /
signup alice alice@example.com Secret123 Secret123
login alice Secret123
worker add \"Jane Roe\" Designer 4200 active 8.5
worker add J Designer 4200 active 8.5
task add 1 Sketch the onboarding flow
1
settings
logout
quit
";

    sb.cmd()
        .arg("shell")
        .write_stdin(script)
        .assert()
        .success()
        .stdout(contains("crewpilot:/login> "))
        .stdout(contains("Welcome, alice"))
        .stdout(contains("── Developers ──").and(contains("Sketch the onboarding flow")))
        .stdout(contains("Username:    alice"))
        .stdout(contains("please log in first"))
        .stdout(contains("Name must be a string with at least 2 characters"))
        .stderr(contains("please log in first").not());
}

#[test]
fn memory_backend_shell_is_self_contained() {
    let sb = Sandbox::new();

    sb.cmd()
        .env("CREWPILOT_BACKEND", "memory")
        .arg("shell")
        .write_stdin("signup bob bob@example.com Secret123 Secret123\nlogin bob Secret123\nanalytics performance 2025-06-01 2025-06-30\nexit\n")
        .assert()
        .success()
        .stdout(contains("Welcome, bob"))
        .stdout(contains("No data available for the selected date range"));
}
