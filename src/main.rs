mod cli;
mod config;
mod engine;
mod history;
mod monitor;
mod notify;
mod snapshot;

use anyhow::Result;
use cli::{Cli, Commands, ConfigActions};
use config::Config;
use engine::ScanEngine;
use history::AlertLog;
use monitor::Monitor;
use notify::DesktopNotifier;
use snapshot::WatchDirectory;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let result = match Config::load() {
        Ok(config) => run(cli, config),
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    match cli.command {
        None => run_watch(None, None, None, None, false, config)?,
        Some(Commands::Watch {
            dir,
            interval,
            max_pending_age,
            no_pending_timeout,
            no_desktop,
        }) => run_watch(
            dir,
            interval,
            max_pending_age,
            no_pending_timeout,
            no_desktop,
            config,
        )?,
        Some(Commands::Config { action }) => run_config(action, config)?,
        Some(Commands::History { limit }) => run_history(limit)?,
    }

    Ok(ExitCode::SUCCESS)
}

fn run_watch(
    dir: Option<PathBuf>,
    interval: Option<u64>,
    max_pending_age: Option<u64>,
    no_pending_timeout: Option<u64>,
    no_desktop: bool,
    mut config: Config,
) -> Result<()> {
    if let Some(secs) = interval {
        config.monitor.poll_interval_seconds = secs;
    }
    if let Some(secs) = max_pending_age {
        config.monitor.max_pending_age_seconds = secs;
    }
    if let Some(secs) = no_pending_timeout {
        config.monitor.no_pending_timeout_seconds = secs;
    }

    // Configuration problems are the only fatal errors; everything past
    // this point is per-tick recoverable.
    config.validate()?;
    let watch_dir = config.resolve_watch_directory(dir.as_ref())?;

    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = stop.clone();
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    let engine = ScanEngine::new(
        chrono::Duration::seconds(config.monitor.max_pending_age_seconds as i64),
        chrono::Duration::seconds(config.monitor.no_pending_timeout_seconds as i64),
    );
    let source = WatchDirectory::new(&watch_dir);
    let sink = DesktopNotifier::new(
        config.notify.app_name.as_str(),
        config.notify.desktop && !no_desktop,
        AlertLog::new(),
    );

    println!(
        "Starting {} on {} (poll every {}s)...",
        config.notify.app_name,
        watch_dir.display(),
        config.monitor.poll_interval_seconds
    );

    let mut monitor = Monitor::new(
        source,
        sink,
        engine,
        Duration::from_secs(config.monitor.poll_interval_seconds),
        stop,
    );
    monitor.run();

    println!("Monitor stopped.");
    Ok(())
}

fn run_config(action: ConfigActions, mut config: Config) -> Result<()> {
    match action {
        ConfigActions::Show => {
            println!("Current configuration:");
            match &config.watch.directory {
                Some(dir) => println!("  Watch directory: {}", dir.display()),
                None => println!("  Watch directory: (not set)"),
            }
            println!(
                "  Poll interval: {}s",
                config.monitor.poll_interval_seconds
            );
            println!(
                "  Max pending age: {}s",
                config.monitor.max_pending_age_seconds
            );
            println!(
                "  No-pending timeout: {}s",
                config.monitor.no_pending_timeout_seconds
            );
            println!("  App name: {}", config.notify.app_name);
            println!("  Desktop notifications: {}", config.notify.desktop);
        }
        ConfigActions::Set { key, value } => match key.as_str() {
            "directory" => {
                config.watch.directory = Some(PathBuf::from(&value));
                config.save()?;
                println!("Set directory to {}", value);
            }
            "poll_interval" => {
                config.monitor.poll_interval_seconds = value.parse()?;
                config.save()?;
                println!("Set poll_interval to {}", value);
            }
            "max_pending_age" => {
                config.monitor.max_pending_age_seconds = value.parse()?;
                config.save()?;
                println!("Set max_pending_age to {}", value);
            }
            "no_pending_timeout" => {
                config.monitor.no_pending_timeout_seconds = value.parse()?;
                config.save()?;
                println!("Set no_pending_timeout to {}", value);
            }
            "desktop" => {
                config.notify.desktop = value.parse()?;
                config.save()?;
                println!("Set desktop to {}", value);
            }
            _ => {
                println!("Unknown key: {}", key);
                println!(
                    "Available keys: directory, poll_interval, max_pending_age, no_pending_timeout, desktop"
                );
            }
        },
        ConfigActions::Path => {
            println!("{}", Config::config_path().display());
        }
    }

    Ok(())
}

fn run_history(limit: usize) -> Result<()> {
    let log = AlertLog::new();
    let entries = log.read(Some(limit))?;

    if entries.is_empty() {
        println!("No alerts logged yet.");
        return Ok(());
    }

    println!("Last {} alert(s):\n", entries.len());
    for entry in entries {
        println!(
            "{}  {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.message
        );
    }

    Ok(())
}
