//! hash: headless autorun library
//!
//! Evaluates `*.ha.sh` scripts from a file, a directory, or a removable drive
//! as it gets mounted, and records each run's output next to the script.

pub mod config;
pub mod control;
pub mod error;
pub mod install;
pub mod runner;

#[cfg(target_os = "linux")]
pub mod watch;

pub use config::HashConfig;
pub use error::RunnerError;
pub use install::{InstallerBuilder, InstallerError};
pub use runner::{MAX_SCRIPT_SIZE, Runner, SCRIPT_SUFFIX, Script};
