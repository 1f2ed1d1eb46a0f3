//! Atomic file operations for installed files.
//!
//! Everything is written to a sibling temp file, synced, and renamed into
//! place, so a crash never leaves a half-written unit, rule, or binary.

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;

use super::InstallerError;

/// Write file atomically with the given mode
pub(super) fn write_file_atomic(
    path: &Path,
    content: &[u8],
    mode: u32,
) -> Result<(), InstallerError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            InstallerError::System(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }

    let temp_path = temp_sibling(path);
    {
        let mut file = fs::File::create(&temp_path).map_err(|e| {
            InstallerError::System(format!("Failed to create temp file: {}", e))
        })?;

        file.write_all(content)
            .map_err(|e| InstallerError::System(format!("Failed to write temp file: {}", e)))?;

        file.set_permissions(fs::Permissions::from_mode(mode))
            .map_err(|e| InstallerError::System(format!("Failed to set permissions: {}", e)))?;

        file.sync_all()
            .map_err(|e| InstallerError::System(format!("Failed to sync temp file: {}", e)))?;
    }

    fs::rename(&temp_path, path)
        .map_err(|e| InstallerError::System(format!("Failed to rename temp file: {}", e)))?;

    Ok(())
}

/// Copy an executable into place with mode 0755
pub(super) fn install_executable(source: &Path, dest: &Path) -> Result<(), InstallerError> {
    let data = fs::read(source).map_err(|e| {
        InstallerError::System(format!("Failed to read {}: {}", source.display(), e))
    })?;
    write_file_atomic(dest, &data, 0o755)
}

/// Remove a file if it exists
pub(super) fn remove_if_exists(path: &Path) -> Result<(), InstallerError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(InstallerError::System(format!(
            "Failed to remove {}: {}",
            path.display(),
            e
        ))),
    }
}

/// `hash` -> `.hash.tmp` in the same directory (rename must not cross filesystems).
fn temp_sibling(path: &Path) -> std::path::PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.tmp"))
}
