//! Polling-based SIGINT/SIGTERM handling for the watch loop.

use std::sync::atomic::{AtomicUsize, Ordering};

use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

static RECEIVED_SIGNAL: AtomicUsize = AtomicUsize::new(0);

extern "C" fn handler(sig: i32) {
    RECEIVED_SIGNAL.store(sig as usize, Ordering::SeqCst);
}

pub fn install_signal_handlers() -> nix::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(handler),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for sig in [Signal::SIGINT, Signal::SIGTERM] {
        // SAFETY: the handler only stores into an atomic.
        unsafe { signal::sigaction(sig, &action) }?;
    }
    Ok(())
}

/// Non‑blocking check – returns Some(signal) once per delivery.
pub fn check_signals() -> Option<Signal> {
    let val = RECEIVED_SIGNAL.swap(0, Ordering::AcqRel);
    if val == 0 {
        return None;
    }
    match Signal::try_from(val as i32) {
        Ok(sig) => Some(sig),
        Err(e) => {
            log::error!("Invalid signal number {val} from signal handler: {e}");
            None
        }
    }
}
