use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{EMAIL, PASSWORD, Sandbox, USER};

#[test]
fn signup_then_login_records_the_login() {
    let sb = Sandbox::new().ready();

    sb.cmd()
        .args(["login", "--user", USER, "--password", PASSWORD])
        .assert()
        .success()
        .stdout(contains("Welcome, alice"))
        .stdout(contains("Login recorded at"));
}

#[test]
fn duplicate_username_is_rejected() {
    let sb = Sandbox::new().ready();

    sb.cmd()
        .args(["signup", USER, "other@example.com", "--password", PASSWORD, "--confirm", PASSWORD])
        .assert()
        .failure()
        .stderr(contains("Username or email already exists"));

    sb.cmd()
        .args(["signup", "bob", EMAIL, "--password", PASSWORD, "--confirm", PASSWORD])
        .assert()
        .failure()
        .stderr(contains("Username or email already exists"));
}

#[test]
fn signup_checks_email_and_confirmation() {
    let sb = Sandbox::new();
    sb.cmd().arg("init").assert().success();

    sb.cmd()
        .args(["signup", "bob", "not-an-email", "--password", PASSWORD, "--confirm", PASSWORD])
        .assert()
        .failure()
        .stderr(contains("Please enter a valid email address"));

    sb.cmd()
        .args(["signup", "bob", "bob@example.com", "--password", PASSWORD, "--confirm", "nope"])
        .assert()
        .failure()
        .stderr(contains("Passwords do not match"));
}

#[test]
fn wrong_password_and_missing_credentials_fail() {
    let sb = Sandbox::new().ready();

    sb.cmd()
        .args(["login", "--user", USER, "--password", "wrong"])
        .assert()
        .failure()
        .stderr(contains("Invalid username or password"));

    sb.cmd()
        .args(["worker", "list"])
        .assert()
        .failure()
        .stderr(contains("please log in first"));

    sb.as_alice()
        .arg("dashboard")
        .assert()
        .success()
        .stdout(contains("Total workers").and(contains("Recent activity")));
}

#[test]
fn settings_change_the_username() {
    let sb = Sandbox::new().ready();

    sb.as_alice()
        .args(["settings", "--username", "alice2"])
        .assert()
        .success()
        .stdout(contains("Account updated: alice2 <alice@example.com>"));

    sb.cmd()
        .args(["login", "--user", "alice2", "--password", PASSWORD])
        .assert()
        .success();
}
