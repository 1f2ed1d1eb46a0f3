#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

pub struct TestEnv {
    _tmp: TempDir,
    pub drive: PathBuf,
    pub config: PathBuf,
}

impl TestEnv {
    /// A scratch "drive" directory plus an empty config file, so the host's
    /// /etc/hash/hash.toml never leaks into a test.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let drive = tmp.path().join("drive");
        fs::create_dir_all(&drive).expect("create drive dir");
        let config = tmp.path().join("hash.toml");
        fs::write(&config, "").expect("write config");

        Self {
            _tmp: tmp,
            drive,
            config,
        }
    }

    pub fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.drive.join(name);
        fs::write(&path, body).expect("write script");
        path
    }

    pub fn write_config(&self, content: &str) {
        fs::write(&self.config, content).expect("write config");
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("hash").expect("hash binary");
        cmd.env_remove("HASH_HOST")
            .env_remove("HASH_DECODER")
            .env_remove("HASH_ENCODER")
            .env("RUST_LOG", "warn")
            .arg("--config")
            .arg(&self.config);
        cmd
    }
}

/// Run directories created for `name` inside `dir`.
pub fn run_dirs(dir: &Path, name: &str) -> Vec<PathBuf> {
    let prefix = format!("{name}-run-");
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)
        .expect("read dir")
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| {
            p.is_dir()
                && p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect();
    dirs.sort();
    dirs
}
