use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hash", version, about = "Headless autorun")]
#[command(arg_required_else_help = true)]
pub struct Args {
    /// Configuration file (default: /etc/hash/hash.toml when present)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub sub: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Evaluate a script, a directory of scripts, or watch a mount point
    Run(RunArgs),
    /// Install udev rule, binary and systemd service
    Install(InstallArgs),
    /// Remove everything `install` set up
    Uninstall {
        /// Show what would be done without doing it
        #[arg(long)]
        dry_run: bool,
    },
    /// Check service status (Exit 0 = running, 1 = stopped)
    Status,
    /// Start the service (Exit 0 = success, 1 = failed)
    Start,
    /// Stop the service (Exit 0 = success, 1 = failed)
    Stop,
    /// Restart the service (Exit 0 = success, 1 = failed)
    Restart,
}

#[derive(ClapArgs, Debug)]
pub struct RunArgs {
    /// Host id
    #[arg(long = "id", short = 'i', env = "HASH_HOST")]
    pub host_id: Option<String>,

    /// Script decoder
    #[arg(long, short = 'd', env = "HASH_DECODER")]
    pub decoder: Option<String>,

    /// Stdout encoder
    #[arg(long, short = 'e', env = "HASH_ENCODER")]
    pub encoder: Option<String>,

    /// Watch for removable media
    #[arg(long, short = 'w', hide = cfg!(not(target_os = "linux")))]
    pub watch: bool,

    /// Script path or directory
    pub path: PathBuf,
}

#[derive(ClapArgs, Debug)]
pub struct InstallArgs {
    /// Binary to install (defaults to the running executable)
    #[arg(long)]
    pub binary: Option<PathBuf>,

    /// Where removable media gets mounted and watched
    #[arg(long)]
    pub mount_point: Option<PathBuf>,

    /// Host id baked into the service environment
    #[arg(long = "id", short = 'i')]
    pub host_id: Option<String>,

    /// Don't enable and start the service after install
    #[arg(long)]
    pub no_start: bool,

    /// Show what would be done without doing it
    #[arg(long)]
    pub dry_run: bool,
}
