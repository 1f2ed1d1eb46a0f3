//! Privilege checking for system installation.

use super::InstallerError;

/// Installing into /etc and /usr/local requires root
pub(super) fn check_privileges() -> Result<(), InstallerError> {
    if !is_root() {
        return Err(InstallerError::PermissionDenied);
    }
    Ok(())
}

#[inline]
pub(super) fn is_root() -> bool {
    nix::unistd::getuid().is_root()
}
