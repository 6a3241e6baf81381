#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

pub const CMD_TIMEOUT: Duration = Duration::from_secs(30);

/// Path of the generator-produced fixture shared with docsi-core.
#[allow(dead_code)]
pub fn fixture_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../docsi-core/tests/fixtures/search_index.js")
}

#[allow(dead_code)]
pub fn fixture() -> String {
    std::fs::read_to_string(fixture_path()).expect("fixture readable")
}

/// Isolated data and config directories for one test.
pub struct TestEnv {
    pub data: TempDir,
    pub config: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            data: tempfile::tempdir().expect("data dir"),
            config: tempfile::tempdir().expect("config dir"),
        }
    }

    /// A `docsi` command pointed at this environment.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docsi"));
        cmd.timeout(CMD_TIMEOUT);
        cmd.env("DOCSI_DATA_DIR", self.data.path());
        cmd.env("DOCSI_CONFIG_DIR", self.config.path());
        cmd.env_remove("DOCSI_CONFIG");
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// Add the fixture as `alias`.
    #[allow(dead_code)]
    pub fn add_fixture(&self, alias: &str) {
        self.cmd()
            .arg("add")
            .arg(alias)
            .arg(fixture_path())
            .assert()
            .success();
    }

    /// Run a command and parse its stdout as JSON.
    #[allow(dead_code)]
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.cmd().args(args).output().expect("run docsi");
        assert!(
            output.status.success(),
            "docsi {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("stdout is JSON")
    }

    /// Write `content` into the temp area and return its path.
    #[allow(dead_code)]
    pub fn write_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.config.path().join(name);
        std::fs::write(&path, content).expect("write test file");
        path
    }
}
