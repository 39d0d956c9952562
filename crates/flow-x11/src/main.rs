//! Flow desktop shell entry point.
//!
//! Connects to the X server, builds the taskbar and runs the dispatch loop
//! until logout, ctrl-c or the display goes away.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use flow_core::catalog::AppCatalog;
use flow_core::config::{Config, Directories};
use flow_core::{DetachedLauncher, Shell, run};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod x11;

use x11::X11Display;

/// Flow - a minimal X11 desktop shell
#[derive(Parser, Debug)]
#[command(name = "flow")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file (defaults to `$XDG_CONFIG_HOME/flow/flow.conf`)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// X display to connect to (defaults to `$DISPLAY`)
    #[arg(long, value_name = "NAME")]
    display: Option<String>,

    /// Print the app menu entries as JSON and exit
    #[arg(long)]
    list_apps: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,
}

/// Set up logging with file output for debugging.
/// In debug builds, defaults to debug level and logs to timestamped file.
/// In release builds, defaults to info level and logs to stderr.
fn setup_logging() {
    let default_level = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("flow={default_level},flow_core={default_level}"))
    });

    if cfg!(debug_assertions) {
        let temp_dir = std::env::temp_dir();
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let log_filename = format!("flow-{timestamp}.log");
        let log_path = temp_dir.join(&log_filename);

        #[cfg(unix)]
        {
            let symlink_path = temp_dir.join("flow.log");
            let _ = std::fs::remove_file(&symlink_path);
            let _ = std::os::unix::fs::symlink(&log_path, &symlink_path);
        }

        let file_appender = tracing_appender::rolling::never(&temp_dir, &log_filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        std::mem::forget(guard);

        let file_layer = fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true);

        let stderr_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(true)
            .with_line_number(true);

        tracing_subscriber::registry()
            .with(file_layer)
            .with(stderr_layer)
            .with(filter)
            .init();

        eprintln!("Logging to: {} (and stderr)", log_path.display());
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(filter)
            .init();
    }
}

/// Load the config, falling back to defaults when it cannot be read.
fn load_config(path: Option<&Path>) -> Config {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => match Directories::new() {
            Ok(dirs) => dirs.config_file,
            Err(e) => {
                warn!("{e}, using default config");
                return Config::default();
            }
        },
    };
    info!("Loading config from {}", path.display());
    Config::load(&path).unwrap_or_else(|e| {
        warn!("Failed to load {}: {e}, using defaults", path.display());
        Config::default()
    })
}

async fn run_shell(config: Config, display_name: Option<&str>) -> anyhow::Result<()> {
    let display = X11Display::connect(display_name).context("Cannot open X display")?;

    let (tx, rx) = mpsc::unbounded_channel();
    display.spawn_event_reader(tx)?;

    let launcher = DetachedLauncher::new(config.shell.clone());
    let mut shell = Shell::new(display, launcher, config);
    if let Err(e) = shell.build_taskbar() {
        error!("Failed to build the taskbar: {e}");
        shell.shutdown();
        return Err(e.into());
    }
    if let Err(e) = shell.display_mut().set_root_cursor() {
        warn!("Failed to set root cursor: {e}");
    }
    shell.launch_session();

    let reason = run(&mut shell, rx).await;
    info!("Flow stopped: {reason:?}");
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    setup_logging();

    let config = load_config(args.config.as_deref());

    if args.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    if args.list_apps {
        let entries = AppCatalog::new(config.application_dirs()).scan();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    info!("Starting Flow desktop shell...");
    run_shell(config, args.display.as_deref()).await
}
