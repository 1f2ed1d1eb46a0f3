//! System integration: udev rule, installed binary, and systemd unit.
//!
//! Installing wires three pieces together:
//!
//! - a udev rule that mounts any USB filesystem at the watch mount point,
//! - the `hash` binary in a system bin directory,
//! - a systemd unit running `hash run --watch <mount point>`.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::InstallConfig;

#[cfg(target_os = "linux")]
mod linux;

pub const DEFAULT_LABEL: &str = "hash";
pub const DEFAULT_MOUNT_POINT: &str = "/media/hash";
pub const DEFAULT_BIN_DIR: &str = "/usr/local/bin";
pub const DEFAULT_UNIT_DIR: &str = "/etc/systemd/system";
pub const DEFAULT_UDEV_RULES_DIR: &str = "/etc/udev/rules.d";

#[derive(Debug, Error)]
pub enum InstallerError {
    #[error("Permission denied: run as root")]
    PermissionDenied,

    #[error("{program} {args} failed: {stderr}")]
    Command {
        program: String,
        args: String,
        stderr: String,
    },

    #[error("{0}")]
    System(String),

    #[error("Unsupported platform: {0}")]
    Unsupported(&'static str),
}

/// Everything an install or uninstall needs to know. Paths default to the
/// standard system locations and can be redirected (tests, packaging roots).
#[derive(Debug, Clone)]
pub struct InstallerBuilder {
    pub label: String,
    pub description: String,
    pub program: PathBuf,
    pub bin_dir: PathBuf,
    pub unit_dir: PathBuf,
    pub udev_rules_dir: PathBuf,
    pub mount_point: PathBuf,
    pub config_path: Option<PathBuf>,
    pub env: Vec<(String, String)>,
    pub auto_start: bool,
    pub dry_run: bool,
}

impl InstallerBuilder {
    pub fn new(program: PathBuf) -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            description: "Hash headless autorun".to_string(),
            program,
            bin_dir: PathBuf::from(DEFAULT_BIN_DIR),
            unit_dir: PathBuf::from(DEFAULT_UNIT_DIR),
            udev_rules_dir: PathBuf::from(DEFAULT_UDEV_RULES_DIR),
            mount_point: PathBuf::from(DEFAULT_MOUNT_POINT),
            config_path: None,
            env: Vec::new(),
            auto_start: true,
            dry_run: false,
        }
    }

    /// Apply the `[install]` section of the config file.
    pub fn with_config(mut self, cfg: &InstallConfig) -> Self {
        if let Some(dir) = &cfg.bin_dir {
            self.bin_dir = PathBuf::from(dir);
        }
        if let Some(dir) = &cfg.unit_dir {
            self.unit_dir = PathBuf::from(dir);
        }
        if let Some(dir) = &cfg.udev_rules_dir {
            self.udev_rules_dir = PathBuf::from(dir);
        }
        if let Some(mp) = &cfg.mount_point {
            self.mount_point = PathBuf::from(mp);
        }
        self
    }

    pub fn mount_point(mut self, path: impl Into<PathBuf>) -> Self {
        self.mount_point = path.into();
        self
    }

    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Add environment variable to the service
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.push((key.to_string(), value.to_string()));
        self
    }

    pub fn auto_start(mut self, start: bool) -> Self {
        self.auto_start = start;
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Where the binary lands.
    pub fn installed_binary(&self) -> PathBuf {
        self.bin_dir.join(&self.label)
    }

    pub fn unit_path(&self) -> PathBuf {
        self.unit_dir.join(format!("{}.service", self.label))
    }

    pub fn udev_rule_path(&self) -> PathBuf {
        self.udev_rules_dir.join(format!("99-{}.rules", self.label))
    }
}

/// Install udev rule, binary, and service; start the service unless
/// `auto_start` is off.
pub fn install(builder: &InstallerBuilder) -> Result<(), InstallerError> {
    #[cfg(target_os = "linux")]
    {
        linux::PlatformExecutor::install(builder)
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = builder;
        Err(InstallerError::Unsupported(std::env::consts::OS))
    }
}

/// Stop and remove everything [`install`] set up.
pub fn uninstall(builder: &InstallerBuilder) -> Result<(), InstallerError> {
    #[cfg(target_os = "linux")]
    {
        linux::PlatformExecutor::uninstall(builder)
    }

    #[cfg(not(target_os = "linux"))]
    {
        let _ = builder;
        Err(InstallerError::Unsupported(std::env::consts::OS))
    }
}
