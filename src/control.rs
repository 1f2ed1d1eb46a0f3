//! Service control - delegates to the OS service manager (systemd on Linux)

use anyhow::Result;

cfg_if::cfg_if! {
    if #[cfg(target_os = "linux")] {
        mod linux_control;
        use linux_control as platform;
    } else {
        mod unsupported {
            use anyhow::{Result, bail};

            pub fn check_status() -> Result<bool> {
                bail!("Service control is only supported on Linux")
            }

            pub fn systemctl(action: &str) -> Result<()> {
                bail!("Cannot {action} service: only supported on Linux")
            }
        }
        use unsupported as platform;
    }
}

/// Check if the service is running
///
/// Returns: Ok(true) if running, Ok(false) if stopped
pub fn check_status() -> Result<bool> {
    platform::check_status()
}

/// Start the service
pub fn start_daemon() -> Result<()> {
    platform::systemctl("start")
}

/// Stop the service
pub fn stop_daemon() -> Result<()> {
    platform::systemctl("stop")
}

/// Restart the service
pub fn restart_daemon() -> Result<()> {
    platform::systemctl("restart")
}
