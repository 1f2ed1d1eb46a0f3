mod cli;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use hash::{HashConfig, InstallerBuilder, Runner, control, install};

fn main() {
    env_logger::Builder::new()
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = real_main() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = cli::Args::parse();

    match args.sub {
        cli::Cmd::Run(run) => {
            let cfg = HashConfig::load(args.config.as_deref())?;
            run_scripts(&cfg, run)
        }
        cli::Cmd::Install(opts) => {
            let cfg = HashConfig::load(args.config.as_deref())?;
            handle_install(&cfg, args.config, opts)
        }
        cli::Cmd::Uninstall { dry_run } => {
            let cfg = HashConfig::load(args.config.as_deref())?;
            let builder = installer(&cfg, None)?.dry_run(dry_run);
            install::uninstall(&builder).context("Uninstall failed")?;
            Ok(())
        }
        cli::Cmd::Status => handle_status(),
        cli::Cmd::Start => report("start", control::start_daemon()),
        cli::Cmd::Stop => report("stop", control::stop_daemon()),
        cli::Cmd::Restart => report("restart", control::restart_daemon()),
    }
}

fn run_scripts(cfg: &HashConfig, run: cli::RunArgs) -> Result<()> {
    let runner = Runner::new(
        cfg.host_id(run.host_id),
        cfg.decoder(run.decoder),
        cfg.encoder(run.encoder),
    )
    .max_script_size(cfg.max_script_size());

    info!("{} evaluating {}", runner.host_id(), run.path.display());
    runner
        .start(&run.path, run.watch)
        .with_context(|| format!("Failed to evaluate {}", run.path.display()))
}

fn handle_install(
    cfg: &HashConfig,
    config_path: Option<PathBuf>,
    opts: cli::InstallArgs,
) -> Result<()> {
    // systemd starts the unit from `/`, so relative paths would not resolve there.
    let config_path = config_path.map(absolute).transpose()?;
    let mut builder = installer(cfg, opts.binary)?
        .config_path(config_path)
        .auto_start(!opts.no_start)
        .dry_run(opts.dry_run);

    if let Some(mount_point) = opts.mount_point {
        builder = builder.mount_point(mount_point);
    }
    builder.mount_point = absolute(builder.mount_point)?;
    if let Some(host_id) = opts.host_id {
        builder = builder.env("HASH_HOST", &host_id);
    }

    install::install(&builder).context("Install failed")?;
    if !opts.dry_run {
        println!("hash installed, watching {}", builder.mount_point.display());
    }
    Ok(())
}

fn absolute(path: PathBuf) -> Result<PathBuf> {
    std::path::absolute(&path).with_context(|| format!("Failed to resolve {}", path.display()))
}

fn installer(cfg: &HashConfig, binary: Option<PathBuf>) -> Result<InstallerBuilder> {
    let binary = match binary {
        Some(path) => path,
        None => std::env::current_exe().context("Failed to locate the running executable")?,
    };
    Ok(InstallerBuilder::new(binary).with_config(&cfg.install))
}

/// Handle status command - check if the service is running
fn handle_status() -> Result<()> {
    match control::check_status() {
        Ok(true) => {
            println!("hash is running");
            std::process::exit(0);
        }
        Ok(false) => {
            println!("hash is stopped");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error checking status: {e:#}");
            std::process::exit(1);
        }
    }
}

fn report(action: &str, result: Result<()>) -> Result<()> {
    match result {
        Ok(()) => {
            println!("hash {action} succeeded");
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Failed to {action}: {e:#}");
            std::process::exit(1);
        }
    }
}
