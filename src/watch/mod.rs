//! Removable media watch mode (Linux)
//!
//! Waits for a filesystem to appear at a mount point and evaluates every
//! script on it. The installed udev rule mounts USB drives at that mount
//! point, so plugging in a stick runs its scripts.

mod signals;

use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, bounded, select, tick};
use log::{debug, info, warn};
use mount_watcher::{MountWatcher, WatchControl};
use nix::sys::signal::Signal;

use crate::error::{Result, RunnerError};
use crate::runner::{Completion, Runner};

pub use signals::{check_signals, install_signal_handlers};

/// Triggers closer together than this collapse into one.
const DEBOUNCE: Duration = Duration::from_secs(1);

/// Signal polling interval.
const SIGNAL_POLL: Duration = Duration::from_millis(200);

/// How long leaving watch mode waits for scripts still running.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// Queued mount events. The watcher thread blocks when the loop falls behind.
const EVENT_BOUND: usize = 16;

/// Mount points that appeared in one mount table change.
#[derive(Debug, Clone)]
pub struct MountEvent {
    pub at: Instant,
    pub mount_points: Vec<String>,
}

/// Suppresses repeated triggers for the same insertion (a drive can be
/// reported several times while automount settles).
#[derive(Debug, Default)]
pub struct Debounce {
    last: Option<Instant>,
}

impl Debounce {
    /// Whether a trigger at `now` should run. Accepted triggers reset the window.
    pub fn accept(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.saturating_duration_since(last) <= DEBOUNCE => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Evaluate `mount_point` whenever something is mounted there. Returns on
/// SIGINT/SIGTERM once running scripts have finished.
pub fn watch_mount_point(runner: &Runner, mount_point: &Path) -> Result<()> {
    install_signal_handlers().map_err(io::Error::from)?;

    let mount_point = resolve_mount_point(mount_point)?;
    let (tx, events) = bounded::<MountEvent>(EVENT_BOUND);

    // The first event lists everything already mounted.
    let _watcher = MountWatcher::new(move |ev| {
        let mount_points: Vec<String> = ev
            .mounted
            .iter()
            .map(|m| m.mount_point.clone())
            .collect();
        if mount_points.is_empty() {
            return WatchControl::Continue;
        }
        let event = MountEvent {
            at: Instant::now(),
            mount_points,
        };
        match tx.send(event) {
            Ok(()) => WatchControl::Continue,
            Err(_) => WatchControl::Stop,
        }
    })
    .map_err(|e| RunnerError::Watch(e.to_string()))?;

    info!("Watching for media mounted at {}", mount_point.display());
    watch_events(runner, &mount_point, &events, check_signals);
    Ok(())
}

/// Run the directory for every event naming `mount_point` until `signals`
/// reports one or `events` disconnects, then wait for the scripts started.
pub fn watch_events(
    runner: &Runner,
    mount_point: &Path,
    events: &Receiver<MountEvent>,
    signals: impl Fn() -> Option<Signal>,
) {
    let target = mount_point.to_string_lossy();
    let sig_tick = tick(SIGNAL_POLL);
    let mut debounce = Debounce::default();
    let mut workers: Vec<JoinHandle<()>> = Vec::new();

    loop {
        select! {
            recv(events) -> evt => {
                let Ok(evt) = evt else {
                    warn!("Mount watcher exited, leaving watch mode");
                    break;
                };
                if !evt.mount_points.iter().any(|m| *m == target) {
                    continue;
                }
                if !debounce.accept(evt.at) {
                    info!("Ignoring repeated mount of {target}");
                    continue;
                }
                info!("Media mounted at {target}, evaluating scripts");
                workers.retain(|w| !w.is_finished());
                match runner.eval_dir(mount_point, Completion::Detach) {
                    Ok(started) => workers.extend(started),
                    Err(e) => warn!("Failed to evaluate {target}: {e}"),
                }
            }
            recv(sig_tick) -> _ => {
                if let Some(sig) = signals() {
                    info!("signal {sig:?} – leaving watch mode");
                    break;
                }
            }
        }
    }

    join_workers(workers, SHUTDOWN_GRACE);
}

/// Join workers that finish within `grace`; the rest are abandoned.
fn join_workers(mut workers: Vec<JoinHandle<()>>, grace: Duration) {
    let deadline = Instant::now() + grace;
    while !workers.is_empty() {
        let (done, running): (Vec<_>, Vec<_>) =
            workers.into_iter().partition(|w| w.is_finished());
        for worker in done {
            if worker.join().is_err() {
                warn!("Script worker panicked");
            }
        }
        workers = running;
        if workers.is_empty() {
            break;
        }
        if Instant::now() >= deadline {
            warn!("{} script(s) still running, leaving them behind", workers.len());
            break;
        }
        debug!("Waiting for {} script(s) to finish", workers.len());
        thread::sleep(SIGNAL_POLL);
    }
}

/// Absolute form of `path` as it appears in the mount table: relative paths
/// are taken from the working directory and trailing slashes dropped.
fn resolve_mount_point(path: &Path) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;
    let text = absolute.to_string_lossy();
    Ok(match text.trim_end_matches('/') {
        "" => PathBuf::from("/"),
        trimmed => PathBuf::from(trimmed),
    })
}
