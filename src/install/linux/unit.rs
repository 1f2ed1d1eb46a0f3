//! Systemd unit file generation.

use std::path::Path;

use super::InstallerError;
use super::file_ops::write_file_atomic;

/// Inputs for the generated `hash.service`
#[derive(Clone)]
pub(super) struct SystemdConfig<'a> {
    pub service_name: &'a str,
    pub description: &'a str,
    pub binary_path: &'a Path,
    pub mount_point: &'a Path,
    pub config_path: Option<&'a Path>,
    pub env_vars: &'a [(String, String)],
}

/// Write the unit file with mode 0644
pub(super) fn create_systemd_unit(
    config: &SystemdConfig,
    unit_path: &Path,
) -> Result<(), InstallerError> {
    let unit_content = generate_unit_content(config);
    write_file_atomic(unit_path, unit_content.as_bytes(), 0o644)
}

pub(super) fn generate_unit_content(config: &SystemdConfig) -> String {
    let mut content = String::with_capacity(1024);

    // [Unit] section
    content.push_str("[Unit]\n");
    content.push_str(&format!("Description={}\n", config.description));
    content.push_str("After=local-fs.target systemd-udevd.service\n");
    content.push('\n');

    // [Service] section
    content.push_str("[Service]\n");
    content.push_str("Type=simple\n");

    let mut exec_start = vec![quote(config.binary_path)];
    if let Some(cfg) = config.config_path {
        exec_start.push("--config".to_string());
        exec_start.push(quote(cfg));
    }
    exec_start.push("run".to_string());
    exec_start.push("--watch".to_string());
    exec_start.push(quote(config.mount_point));
    content.push_str(&format!("ExecStart={}\n", exec_start.join(" ")));

    content.push_str("Restart=on-failure\n");
    content.push_str("RestartSec=5s\n");

    for (key, value) in config.env_vars {
        content.push_str(&format!("Environment=\"{}={}\"\n", key, value));
    }

    // Logging
    content.push_str("StandardOutput=journal\n");
    content.push_str("StandardError=journal\n");
    content.push_str(&format!("SyslogIdentifier={}\n", config.service_name));
    content.push('\n');

    // [Install] section
    content.push_str("[Install]\n");
    content.push_str("WantedBy=multi-user.target\n");

    content
}

/// systemd splits ExecStart on whitespace unless the word is double-quoted,
/// and expands `%` specifiers and `$` variables.
fn quote(path: &Path) -> String {
    let s = path.to_string_lossy().replace('%', "%%").replace('$', "$$");
    if s.chars().any(char::is_whitespace) {
        format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config<'a>(
        env: &'a [(String, String)],
        config_path: Option<&'a Path>,
    ) -> SystemdConfig<'a> {
        SystemdConfig {
            service_name: "hash",
            description: "Hash headless autorun",
            binary_path: Path::new("/usr/local/bin/hash"),
            mount_point: Path::new("/media/hash"),
            config_path,
            env_vars: env,
        }
    }

    #[test]
    fn exec_start_watches_mount_point() {
        let unit = generate_unit_content(&config(&[], None));
        assert!(unit.contains("ExecStart=/usr/local/bin/hash run --watch /media/hash\n"));
        assert!(unit.contains("SyslogIdentifier=hash\n"));
        assert!(unit.ends_with("[Install]\nWantedBy=multi-user.target\n"));
    }

    #[test]
    fn config_and_env_are_forwarded() {
        let env = vec![("HASH_HOST".to_string(), "kiosk-7".to_string())];
        let unit = generate_unit_content(&config(&env, Some(Path::new("/etc/hash/hash.toml"))));
        assert!(unit.contains(
            "ExecStart=/usr/local/bin/hash --config /etc/hash/hash.toml run --watch /media/hash\n"
        ));
        assert!(unit.contains("Environment=\"HASH_HOST=kiosk-7\"\n"));
    }

    #[test]
    fn paths_with_spaces_are_quoted() {
        assert_eq!(quote(Path::new("/media/my stick")), "\"/media/my stick\"");
        assert_eq!(quote(Path::new("/media/hash")), "/media/hash");
    }

    #[test]
    fn specifiers_are_escaped() {
        assert_eq!(quote(Path::new("/media/50%")), "/media/50%%");
        assert_eq!(quote(Path::new("/media/$HOME")), "/media/$$HOME");
        assert_eq!(quote(Path::new("/media/a %n")), "\"/media/a %%n\"");
    }
}
