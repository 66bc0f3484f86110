#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use tempfile::TempDir;

pub const USER: &str = "alice";
pub const EMAIL: &str = "alice@example.com";
pub const PASSWORD: &str = "Secret123";

/// A private CrewPilot home (config, database, model) per test.
pub struct Sandbox {
    pub home: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            home: tempfile::tempdir().expect("temp home"),
        }
    }

    /// The binary pointed at this sandbox, with no inherited overrides.
    pub fn cmd(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("crewpilot");
        cmd.env("CREWPILOT_HOME", self.home.path());
        for var in [
            "CREWPILOT_USER",
            "CREWPILOT_PASSWORD",
            "CREWPILOT_BACKEND",
            "CREWPILOT_DB",
            "CREWPILOT_MODEL_PATH",
            "CREWPILOT_FEATURES",
            "CREWPILOT_LOG",
        ] {
            cmd.env_remove(var);
        }
        cmd
    }

    /// Same as `cmd`, signed in as the default account.
    pub fn as_alice(&self) -> Command {
        let mut cmd = self.cmd();
        cmd.env("CREWPILOT_USER", USER)
            .env("CREWPILOT_PASSWORD", PASSWORD);
        cmd
    }

    /// `init` plus the default account.
    pub fn ready(self) -> Self {
        self.cmd().arg("init").assert().success();
        self.cmd()
            .args(["signup", USER, EMAIL, "--password", PASSWORD, "--confirm", PASSWORD])
            .assert()
            .success();
        self
    }

    /// `ready` plus one worker (id 1).
    pub fn with_worker(self) -> Self {
        let sb = self.ready();
        sb.as_alice()
            .args([
                "worker", "add", "John Doe", "--position", "Developer", "--salary", "4200",
                "--score", "8.5",
            ])
            .assert()
            .success();
        sb
    }
}
