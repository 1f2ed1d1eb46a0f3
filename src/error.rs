//! Error types for script evaluation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("IO: {0}")]
    Io(#[from] io::Error),

    #[error("Script not found: {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Unsupported script: {0:?}")]
    UnsupportedScript(PathBuf),

    #[error("Transform failed: {0}")]
    TransformFailed(String),

    #[error("Mount watcher: {0}")]
    Watch(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
