//! Script evaluation
//!
//! A [`Runner`] evaluates `*.ha.sh` scripts with `sh -c`, each in a fresh run
//! directory created next to the script:
//!
//! ```text
//! <drive>/net.ha.sh
//! <drive>/net-run-2026-10-19-08-15-02/stdout.log
//! <drive>/net-run-2026-10-19-08-15-02/stderr.log
//! <drive>/net-run-2026-10-19-08-15-02/error.log   (only when the run failed)
//! ```
//!
//! Scripts may be stored encoded and are passed through the decoder command
//! before execution; captured output goes through the encoder command.

mod script;
mod transform;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};

use chrono::Utc;
use log::{debug, error, info, warn};

use crate::error::{Result, RunnerError};

pub use script::{MAX_SCRIPT_SIZE, SCRIPT_SUFFIX, Script};
pub use transform::transform;

const RUN_DIR_TIME_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

/// How a directory evaluation treats each script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Run scripts one after another and return when all are done.
    Wait,
    /// Hand each script to its own worker thread and return the handles.
    Detach,
}

#[derive(Debug, Clone)]
pub struct Runner {
    host_id: String,
    decoder: Option<String>,
    encoder: Option<String>,
    max_script_size: u64,
}

impl Runner {
    pub fn new(host_id: String, decoder: Option<String>, encoder: Option<String>) -> Self {
        Self {
            host_id,
            decoder,
            encoder,
            max_script_size: MAX_SCRIPT_SIZE,
        }
    }

    pub fn max_script_size(mut self, bytes: u64) -> Self {
        self.max_script_size = bytes;
        self
    }

    pub fn host_id(&self) -> &str {
        &self.host_id
    }

    /// Evaluate `path`: a single script, a directory of scripts, or (with
    /// `watch`) every filesystem mounted at `path` from now on.
    pub fn start(&self, path: &Path, watch: bool) -> Result<()> {
        if path.is_file() {
            return self.eval_script(path);
        }

        if !watch {
            return self.eval_dir(path, Completion::Wait).map(|_| ());
        }

        #[cfg(target_os = "linux")]
        {
            crate::watch::watch_mount_point(self, path)
        }

        #[cfg(not(target_os = "linux"))]
        {
            warn!("--watch is only supported on Linux, evaluating {} once", path.display());
            self.eval_dir(path, Completion::Wait).map(|_| ())
        }
    }

    /// Evaluate every non-hidden entry of `dir`. Failing entries are logged
    /// and skipped. With [`Completion::Detach`] the worker handles are
    /// returned so the caller can wait for runs still in flight.
    pub fn eval_dir(&self, dir: &Path, completion: Completion) -> Result<Vec<JoinHandle<()>>> {
        let mut files: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|path| {
                let hidden = path
                    .file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| name.starts_with('.'));
                if hidden {
                    debug!("Skipping hidden entry {}", path.display());
                }
                !hidden
            })
            .collect();
        files.sort();

        let mut workers = Vec::new();
        for file in files {
            match completion {
                Completion::Wait => {
                    if let Err(err) = self.eval_script(&file) {
                        log_eval_error(&file, &err);
                    }
                }
                Completion::Detach => {
                    let runner = self.clone();
                    let spawned = thread::Builder::new()
                        .name("hash-script".to_string())
                        .spawn(move || {
                            if let Err(err) = runner.eval_script(&file) {
                                log_eval_error(&file, &err);
                            }
                        });
                    match spawned {
                        Ok(handle) => workers.push(handle),
                        Err(e) => error!("Failed to spawn script worker: {e}"),
                    }
                }
            }
        }

        Ok(workers)
    }

    /// Evaluate one script in a new run directory. A failed run is recorded
    /// in the run directory's `error.log` and is not returned as an error.
    pub fn eval_script(&self, path: &Path) -> Result<()> {
        let script = Script::from_file(path)?;
        let run_dir = script.parent()?.join(format!(
            "{}-run-{}",
            script.name(),
            Utc::now().format(RUN_DIR_TIME_FORMAT)
        ));
        fs::create_dir(&run_dir)?;
        info!("Running {} in {}", script.path().display(), run_dir.display());

        if let Err(err) = self.run(&script, &run_dir) {
            warn!("{} failed: {err}", script.name());
            fs::write(run_dir.join("error.log"), err.to_string()).ok();
        }

        Ok(())
    }

    fn run(&self, script: &Script, run_dir: &Path) -> Result<()> {
        if script.size()? > self.max_script_size {
            return Err(RunnerError::UnsupportedScript(script.path().to_path_buf()));
        }

        let mut buf = Vec::new();
        let script_file = File::open(script.path())?;
        transform(script_file, &mut buf, self.decoder.as_deref())?;

        let script_text = String::from_utf8(buf)
            .map_err(|_| RunnerError::UnsupportedScript(script.path().to_path_buf()))?;

        let Output {
            status,
            stdout,
            stderr,
        } = Command::new("sh")
            .envs(self.script_env(script, run_dir))
            .args(["-c", &script_text])
            .current_dir(script.parent()?)
            .output()?;

        info!("{} finished with {status}", script.name());

        self.write_log(&stdout, &run_dir.join("stdout.log"))?;
        self.write_log(&stderr, &run_dir.join("stderr.log"))?;

        Ok(())
    }

    /// Variables handed to every script on top of the inherited environment.
    fn script_env(&self, script: &Script, run_dir: &Path) -> [(&'static str, String); 5] {
        [
            ("HASH_HOST", self.host_id.clone()),
            ("HASH_DECODER", self.decoder.clone().unwrap_or_default()),
            ("HASH_ENCODER", self.encoder.clone().unwrap_or_default()),
            ("HASH_SCRIPT", script.name()),
            ("HASH_RUN_DIR", run_dir.to_string_lossy().into_owned()),
        ]
    }

    fn write_log(&self, data: &[u8], path: &Path) -> Result<()> {
        if data.is_empty() {
            return Ok(());
        }
        let mut log = File::create(path)?;
        transform(data, &mut log, self.encoder.as_deref())?;
        log.flush()?;
        Ok(())
    }
}

fn log_eval_error(path: &Path, err: &RunnerError) {
    match err {
        RunnerError::UnsupportedScript(_) => debug!("Skipping {}: {err}", path.display()),
        _ => error!("Script evaluation error: {err}"),
    }
}
