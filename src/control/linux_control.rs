//! Linux service control using systemd (systemctl)

use std::process::Command;

use anyhow::{Context, Result};

use crate::install::DEFAULT_LABEL;

/// Check if the service is running via systemctl is-active
///
/// Returns: Ok(true) if service is active, Ok(false) if inactive
pub fn check_status() -> Result<bool> {
    let service_name = format!("{}.service", DEFAULT_LABEL);

    let output = Command::new("systemctl")
        .args(["is-active", &service_name])
        .output()
        .context("Failed to execute systemctl is-active")?;

    // systemctl is-active returns:
    // - Exit 0 if active
    // - Exit 3 if inactive
    // - Other codes for other states
    Ok(output.status.success())
}

/// Run `systemctl <action>` on the service
pub fn systemctl(action: &str) -> Result<()> {
    let service_name = format!("{}.service", DEFAULT_LABEL);

    let output = Command::new("systemctl")
        .args([action, &service_name])
        .output()
        .with_context(|| format!("Failed to execute systemctl {action}"))?;

    if !output.status.success() {
        // Non-root callers are usually refused by polkit here.
        anyhow::bail!(
            "Failed to {} service: {}",
            action,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(())
}
