#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// Isolated board directory: a tempdir with an `.opsboard.toml` pointing
/// the persisted snapshot at the same tempdir, so tests never touch the
/// real platform data dir.
pub struct TestBoard {
    dir: TempDir,
}

impl TestBoard {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let config = format!(
            "[board]\ndata_dir = \"{}\"\n",
            dir.path().display().to_string().replace('\\', "/")
        );
        fs::write(dir.path().join(".opsboard.toml"), config).expect("write config");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.path().join("board.snapshot.json")
    }

    pub fn read_snapshot(&self) -> serde_json::Value {
        let contents = fs::read_to_string(self.snapshot_path()).expect("read snapshot");
        serde_json::from_str(&contents).expect("parse snapshot")
    }
}

/// `opsboard` invocation pinned to the given test board.
pub fn opsboard(board: &TestBoard) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("opsboard").expect("binary");
    cmd.arg("--dir").arg(board.path());
    cmd.env_remove("OPSBOARD_DIR").env_remove("OPSBOARD_API_URL");
    cmd
}
