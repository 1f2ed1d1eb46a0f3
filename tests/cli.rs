mod common;

use std::fs;

use predicates::prelude::*;
use predicates::str::contains;

use common::{TestEnv, run_dirs};

#[test]
fn no_arguments_prints_usage() {
    let mut cmd = assert_cmd::Command::cargo_bin("hash").unwrap();
    cmd.assert().failure().stderr(contains("Usage"));
}

#[test]
fn run_directory_records_output() {
    let env = TestEnv::new();
    env.script("hello.ha.sh", "echo \"hello from $HASH_HOST as $HASH_SCRIPT\"");
    env.script("notes.txt", "not a script");

    env.cmd()
        .args(["run", "--id", "bench-1"])
        .arg(&env.drive)
        .assert()
        .success();

    let runs = run_dirs(&env.drive, "hello");
    assert_eq!(runs.len(), 1);
    let out = fs::read_to_string(runs[0].join("stdout.log")).unwrap();
    assert_eq!(out, "hello from bench-1 as hello\n");
    assert!(run_dirs(&env.drive, "notes.txt").is_empty());
}

#[test]
fn host_id_falls_back_to_config_then_default() {
    let env = TestEnv::new();
    env.script("id.ha.sh", "echo \"$HASH_HOST\"");

    env.write_config("[runner]\nhost_id = \"from-config\"\n");
    env.cmd().arg("run").arg(&env.drive).assert().success();
    let runs = run_dirs(&env.drive, "id");
    assert_eq!(fs::read_to_string(runs[0].join("stdout.log")).unwrap(), "from-config\n");

    fs::remove_dir_all(&runs[0]).unwrap();
    env.write_config("");
    env.cmd().arg("run").arg(&env.drive).assert().success();
    let runs = run_dirs(&env.drive, "id");
    let out = fs::read_to_string(runs[0].join("stdout.log")).unwrap();
    assert!(out.starts_with("Hash host v"), "got {out}");
}

#[test]
fn encoder_from_environment_wraps_output() {
    let env = TestEnv::new();
    env.script("loud.ha.sh", "echo quiet");

    env.cmd()
        .env("HASH_ENCODER", "tr a-z A-Z")
        .arg("run")
        .arg(&env.drive)
        .assert()
        .success();

    let runs = run_dirs(&env.drive, "loud");
    assert_eq!(fs::read_to_string(runs[0].join("stdout.log")).unwrap(), "QUIET\n");
}

#[test]
fn single_non_script_file_fails() {
    let env = TestEnv::new();
    let path = env.script("notes.txt", "echo nope");

    env.cmd()
        .arg("run")
        .arg(&path)
        .assert()
        .failure()
        .stderr(contains("Unsupported script"));
}

#[test]
fn missing_config_file_fails() {
    let env = TestEnv::new();
    let mut cmd = assert_cmd::Command::cargo_bin("hash").unwrap();
    cmd.args(["--config", "/nonexistent/hash.toml", "run"])
        .arg(&env.drive)
        .assert()
        .failure()
        .stderr(contains("Config file not found"));
}

#[cfg(target_os = "linux")]
#[test]
fn install_dry_run_prints_plan() {
    let env = TestEnv::new();
    let binary = env.script("hash-bin", "");

    env.cmd()
        .args(["install", "--dry-run", "--mount-point", "/media/usb0", "--id", "kiosk"])
        .arg("--binary")
        .arg(&binary)
        .assert()
        .success()
        .stdout(contains("/etc/udev/rules.d/99-hash.rules"))
        .stdout(contains("--no-block --collect $devnode /media/usb0"))
        .stdout(contains("run --watch /media/usb0"))
        .stdout(contains("Environment=\"HASH_HOST=kiosk\""))
        .stdout(contains("systemctl start hash.service"));
}

#[cfg(target_os = "linux")]
#[test]
fn install_dry_run_honours_config_and_no_start() {
    let env = TestEnv::new();
    env.write_config(
        "[install]\nunit_dir = \"/run/systemd/system\"\nmount_point = \"/srv/drop\"\n",
    );

    env.cmd()
        .args(["install", "--dry-run", "--no-start"])
        .assert()
        .success()
        .stdout(contains("/run/systemd/system/hash.service"))
        .stdout(contains("run --watch /srv/drop"))
        .stdout(contains("systemctl start").not());
}

#[cfg(target_os = "linux")]
#[test]
fn install_dry_run_resolves_relative_paths() {
    let env = TestEnv::new();
    let binary = env.script("hash-bin", "");
    let workdir = env.config.parent().unwrap();

    assert_cmd::Command::cargo_bin("hash")
        .unwrap()
        .current_dir(workdir)
        .env("RUST_LOG", "warn")
        .args(["--config", "hash.toml", "install", "--dry-run", "--mount-point", "usb/"])
        .arg("--binary")
        .arg(&binary)
        .assert()
        .success()
        .stdout(contains("--config hash.toml").not())
        .stdout(contains("--config /"))
        .stdout(contains("/hash.toml run --watch /"))
        .stdout(contains("--collect $devnode /"))
        .stdout(contains("--watch usb").not());
}

#[cfg(target_os = "linux")]
#[test]
fn uninstall_dry_run_lists_removals() {
    let env = TestEnv::new();

    env.cmd()
        .args(["uninstall", "--dry-run"])
        .assert()
        .success()
        .stdout(contains("systemctl stop hash.service"))
        .stdout(contains("rm /usr/local/bin/hash"));
}
