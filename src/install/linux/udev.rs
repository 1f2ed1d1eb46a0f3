//! udev rule that mounts removable USB filesystems at the watch mount point.

use std::fs;
use std::path::Path;

use super::InstallerError;
use super::file_ops::{remove_if_exists, write_file_atomic};

const SYSTEMD_MOUNT_FALLBACK: &str = "/usr/bin/systemd-mount";

/// Rule line for `mount_point`. `systemd-mount --no-block` hands the mount to
/// systemd instead of blocking udev; `--collect` cleans the unit up on removal.
pub(super) fn rule_line(mount_point: &Path) -> String {
    let systemd_mount = which::which("systemd-mount")
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_else(|_| SYSTEMD_MOUNT_FALLBACK.to_string());
    rule_line_with(&systemd_mount, mount_point)
}

fn rule_line_with(systemd_mount: &str, mount_point: &Path) -> String {
    format!(
        concat!(
            r#"ACTION=="add", SUBSYSTEMS=="usb", SUBSYSTEM=="block", "#,
            r#"ENV{{ID_FS_USAGE}}=="filesystem", "#,
            r#"RUN{{program}}+="{} --no-block --collect $devnode {}""#,
        ),
        run_arg(systemd_mount),
        run_arg(&mount_point.to_string_lossy())
    )
}

/// udev substitutes `%` and `$` and splits RUN on blanks unless single-quoted.
fn run_arg(arg: &str) -> String {
    let escaped = arg.replace('%', "%%").replace('$', "$$");
    if escaped.chars().any(char::is_whitespace) {
        format!("'{escaped}'")
    } else {
        escaped
    }
}

/// Append `line` unless the file already holds it. Returns whether it was added.
pub(super) fn append_rule(rules_file: &Path, line: &str) -> Result<bool, InstallerError> {
    let existing = read_rules(rules_file)?;
    if existing.lines().any(|l| l == line) {
        return Ok(false);
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(line);
    content.push('\n');

    write_file_atomic(rules_file, content.as_bytes(), 0o644)?;
    Ok(true)
}

/// The rules file belongs to hash, so uninstalling removes it whole: whatever
/// mount point or `systemd-mount` path earlier installs wrote into it.
pub(super) fn remove_rules(rules_file: &Path) -> Result<(), InstallerError> {
    remove_if_exists(rules_file)
}

fn read_rules(rules_file: &Path) -> Result<String, InstallerError> {
    match fs::read_to_string(rules_file) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(InstallerError::System(format!(
            "Failed to read {}: {}",
            rules_file.display(),
            e
        ))),
    }
}
