//! Linux implementation using udev and systemd.
//!
//! # Module Structure
//!
//! - `privileges` - root check
//! - `file_ops` - atomic writes and executable installation
//! - `udev` - mount rule for removable media
//! - `unit` - systemd unit file generation
//! - `service_control` - systemctl / udevadm invocations

use log::{info, warn};

use super::{InstallerBuilder, InstallerError};

mod file_ops;
mod privileges;
mod service_control;
mod udev;
mod unit;

use unit::SystemdConfig;

pub(crate) struct PlatformExecutor;

impl PlatformExecutor {
    /// Install udev rule, binary and systemd unit, then enable and start the service
    pub fn install(b: &InstallerBuilder) -> Result<(), InstallerError> {
        if !b.dry_run {
            privileges::check_privileges()?;
        }

        let binary = b.installed_binary();
        let rule = udev::rule_line(&b.mount_point);
        let unit_content = unit::generate_unit_content(&Self::unit_config(b, &binary));

        if b.dry_run {
            println!("# {} (append)", b.udev_rule_path().display());
            println!("{rule}");
            println!("# udevadm control --reload-rules");
            println!("# install -m 0755 {} {}", b.program.display(), binary.display());
            println!("# {} (0644)", b.unit_path().display());
            print!("{unit_content}");
            println!("# systemctl daemon-reload");
            if b.auto_start {
                println!("# systemctl enable {}.service", b.label);
                println!("# systemctl start {}.service", b.label);
            }
            return Ok(());
        }

        if !b.program.is_file() {
            return Err(InstallerError::System(format!(
                "Binary not found: {}",
                b.program.display()
            )));
        }

        let rules_file = b.udev_rule_path();
        if udev::append_rule(&rules_file, &rule)? {
            info!("Added udev rule to {}", rules_file.display());
        } else {
            info!("udev rule already present in {}", rules_file.display());
        }
        service_control::reload_udev_rules()?;

        // Copying over ourselves would truncate the running binary's source.
        if b.program.canonicalize().ok() != binary.canonicalize().ok() {
            file_ops::install_executable(&b.program, &binary)?;
            info!("Installed {}", binary.display());
        }

        unit::create_systemd_unit(&Self::unit_config(b, &binary), &b.unit_path())?;
        info!("Wrote {}", b.unit_path().display());

        service_control::reload_systemd_daemon()?;

        if b.auto_start {
            service_control::systemctl("enable", &b.label)?;
            service_control::systemctl("start", &b.label)?;
            info!("Service {}.service enabled and started", b.label);
        }

        Ok(())
    }

    /// Stop the service and remove unit, udev rule and binary
    pub fn uninstall(b: &InstallerBuilder) -> Result<(), InstallerError> {
        if b.dry_run {
            println!("# systemctl stop {}.service", b.label);
            println!("# systemctl disable {}.service", b.label);
            println!("# rm {}", b.unit_path().display());
            println!("# rm {}", b.udev_rule_path().display());
            println!("# udevadm control --reload-rules");
            println!("# systemctl daemon-reload");
            println!("# rm {}", b.installed_binary().display());
            return Ok(());
        }

        privileges::check_privileges()?;

        // The service may already be stopped or was never enabled.
        if let Err(e) = service_control::systemctl("stop", &b.label) {
            warn!("{e}");
        }
        if let Err(e) = service_control::systemctl("disable", &b.label) {
            warn!("{e}");
        }

        file_ops::remove_if_exists(&b.unit_path())?;
        udev::remove_rules(&b.udev_rule_path())?;
        service_control::reload_udev_rules()?;
        service_control::reload_systemd_daemon()?;
        file_ops::remove_if_exists(&b.installed_binary())?;

        info!("Uninstalled {}", b.label);
        Ok(())
    }

    fn unit_config<'a>(b: &'a InstallerBuilder, binary: &'a std::path::Path) -> SystemdConfig<'a> {
        SystemdConfig {
            service_name: &b.label,
            description: &b.description,
            binary_path: binary,
            mount_point: &b.mount_point,
            config_path: b.config_path.as_deref(),
            env_vars: &b.env,
        }
    }
}
