//! Common test utilities for maintboard integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't read the
//! user's `~/.config/maintboard/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// CSV with one row per status/priority combination the commands care about.
pub const RECORDS_CSV: &str = "\
Date Added,Asset Tag,Location Description,Deck Level,Status,Priority,Percent Complete,Gallon Total,Value 1
2024-01-10,P-100,Engine Room,Level 1,Complete,Low,100%,12,2.0
2024-05-01,P-101,Bridge,Level 3,In Progress,High,40%,5,7.5
2024-05-20,P-102,Cargo Hold,Level 2,Not Started,Critical,0%,,9.0
,P-103,Galley,Level 2,Not Started,Medium,,3,
";

/// A test environment with isolated directories.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: The working directory (holds `maintboard.kdl` and sources)
/// - `config_dir`: The system config directory (via `MB_CONFIG_DIR`)
///
/// The `mb()` method returns a `Command` that sets both per-invocation,
/// making tests parallel-safe.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub config_dir: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            config_dir: TempDir::new().unwrap(),
        }
    }

    /// Create an environment whose default source (`demo.xlsx`) is absent
    /// and with `records.csv` written to the working directory.
    pub fn with_records() -> Self {
        let env = Self::new();
        env.write("records.csv", RECORDS_CSV);
        env
    }

    /// Get a Command for the mb binary with isolated config.
    pub fn mb(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_mb"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("MB_CONFIG_DIR", self.config_dir.path());
        cmd.env_remove("MB_SOURCE");
        cmd.env_remove("MB_REFRESH_INTERVAL");
        cmd.env_remove("MB_RECENT_LIMIT");
        cmd.env_remove("MB_LOG");
        cmd
    }

    /// Write a file into the working directory.
    pub fn write(&self, name: &str, content: &str) -> PathBuf {
        let path = self.work_dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Write the project config (`maintboard.kdl`).
    pub fn write_project_config(&self, content: &str) -> PathBuf {
        self.write("maintboard.kdl", content)
    }

    /// Write the system config (`$MB_CONFIG_DIR/config.kdl`).
    pub fn write_system_config(&self, content: &str) -> PathBuf {
        let path = self.config_dir.path().join("config.kdl");
        std::fs::write(&path, content).unwrap();
        path
    }

    pub fn path(&self) -> &Path {
        self.work_dir.path()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse stdout of a successful command as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).unwrap()
}
