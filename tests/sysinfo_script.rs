//! Black-box checks of the shipped demos/sysinfo.ha.sh script.

mod common;

use std::fs;
use std::path::Path;
use std::process::Command;

use common::{TestEnv, run_dirs};

const SYSINFO: &str = include_str!("../demos/sysinfo.ha.sh");

fn tools_available() -> bool {
    ["ifconfig", "openssl", "whoami"]
        .iter()
        .all(|tool| which::which(tool).is_ok())
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).map(|s| s.lines().count()).unwrap_or(0)
}

#[test]
fn appends_three_lines_and_encrypts() {
    if !tools_available() {
        eprintln!("skipping: ifconfig/openssl not installed");
        return;
    }
    let env = TestEnv::new();
    env.script("sysinfo.ha.sh", SYSINFO);
    let key = env.drive.join("..").join("key");
    fs::write(&key, "correct horse battery staple").unwrap();

    env.cmd()
        .env("HASH_KEY_FILE", &key)
        .args(["run", "--id", "lab-3"])
        .arg(&env.drive)
        .assert()
        .success();

    let log = env.drive.join("hash.log");
    assert_eq!(line_count(&log), 3);
    let content = fs::read_to_string(&log).unwrap();
    assert!(content.starts_with("host: lab-3\nscript: sysinfo\nuser: "));

    let cipher = fs::read(env.drive.join("ifconfig.enc")).unwrap();
    assert!(!cipher.is_empty());
    assert!(cipher.starts_with(b"Salted__"));

    let runs = run_dirs(&env.drive, "sysinfo");
    assert_eq!(runs.len(), 1);
    assert!(!runs[0].join("error.log").exists());
}

#[test]
fn missing_key_leaves_ciphertext_untouched() {
    if !tools_available() {
        eprintln!("skipping: ifconfig/openssl not installed");
        return;
    }
    let env = TestEnv::new();
    env.script("sysinfo.ha.sh", SYSINFO);
    let cipher = env.drive.join("ifconfig.enc");
    fs::write(&cipher, "previous run").unwrap();

    env.cmd()
        .env("HASH_KEY_FILE", env.drive.join("no-such-key"))
        .arg("run")
        .arg(&env.drive)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(&cipher).unwrap(), "previous run");
    // the metadata lines are still written before the failing step
    assert_eq!(line_count(&env.drive.join("hash.log")), 3);

    let runs = run_dirs(&env.drive, "sysinfo");
    let stderr = fs::read_to_string(runs[0].join("stderr.log")).unwrap();
    assert!(!stderr.is_empty());

    // the script itself reports the failed encryption through its exit status
    let status = Command::new("sh")
        .arg("sysinfo.ha.sh")
        .current_dir(&env.drive)
        .env("HASH_KEY_FILE", env.drive.join("no-such-key"))
        .status()
        .unwrap();
    assert!(!status.success());
    assert_eq!(fs::read_to_string(&cipher).unwrap(), "previous run");
}
