//! systemctl and udevadm invocations.

use std::process::Command;

use log::debug;

use super::InstallerError;

/// Run a system tool, mapping a non-zero exit to [`InstallerError::Command`]
/// carrying the tool's stderr.
pub(super) fn run_tool(program: &str, args: &[&str]) -> Result<(), InstallerError> {
    let resolved = which::which(program)
        .map_err(|e| InstallerError::System(format!("{program} not found: {e}")))?;
    debug!("Running {} {}", resolved.display(), args.join(" "));

    let output = Command::new(&resolved).args(args).output().map_err(|e| {
        InstallerError::System(format!("Failed to execute {program}: {e}"))
    })?;

    if !output.status.success() {
        return Err(InstallerError::Command {
            program: program.to_string(),
            args: args.join(" "),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(())
}

/// `systemctl <action> <label>.service`
pub(super) fn systemctl(action: &str, label: &str) -> Result<(), InstallerError> {
    run_tool("systemctl", &[action, &format!("{label}.service")])
}

/// Reload systemd daemon to pick up changes
pub(super) fn reload_systemd_daemon() -> Result<(), InstallerError> {
    run_tool("systemctl", &["daemon-reload"])
}

/// Make udev re-read its rule files
pub(super) fn reload_udev_rules() -> Result<(), InstallerError> {
    run_tool("udevadm", &["control", "--reload-rules"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_tool_reports_stderr() {
        let err = run_tool("sh", &["-c", "echo no such unit >&2; exit 5"]).unwrap_err();
        match err {
            InstallerError::Command { program, stderr, .. } => {
                assert_eq!(program, "sh");
                assert_eq!(stderr, "no such unit");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_tool_is_a_system_error() {
        assert!(matches!(
            run_tool("hash-definitely-not-installed", &[]),
            Err(InstallerError::System(_))
        ));
    }
}
