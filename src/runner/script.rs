//! Script identity: suffix check, location, and display name.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Result, RunnerError};

pub const SCRIPT_SUFFIX: &str = ".ha.sh";
pub const MAX_SCRIPT_SIZE: u64 = 655_360;

#[derive(Debug, Clone)]
pub struct Script {
    path: PathBuf,
}

impl Script {
    /// Accept `path` as a script if it carries the script suffix and is a
    /// regular file. The stored path is canonical.
    pub fn from_file(path: &Path) -> Result<Self> {
        let has_suffix = path
            .to_str()
            .map(|p| p.ends_with(SCRIPT_SUFFIX))
            .unwrap_or(false);

        if !has_suffix {
            Err(RunnerError::UnsupportedScript(path.to_path_buf()))
        } else if !path.is_file() {
            Err(RunnerError::ScriptNotFound(path.to_path_buf()))
        } else {
            let path = path.canonicalize()?;
            Ok(Self { path })
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn parent(&self) -> Result<&Path> {
        self.path
            .parent()
            .ok_or_else(|| RunnerError::ScriptNotFound(self.path.clone()))
    }

    /// File name without the script suffix.
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .and_then(|p| p.to_str())
            .and_then(|p| p.strip_suffix(SCRIPT_SUFFIX))
            .map(String::from)
            .unwrap_or_default()
    }

    pub fn size(&self) -> Result<u64> {
        Ok(fs::metadata(&self.path)?.len())
    }
}
