use crate::models::HubSettings;
use anyhow::{Context, Result};
use std::fs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber from the `Log Directory`, `Debug Mode` and
/// `Console Logging` settings.
///
/// Keep the returned guard alive until exit; dropping it stops the file writer.
pub fn setup_from_settings(settings: &HubSettings) -> Result<WorkerGuard> {
    setup_logging_with_console(
        &settings.log_dir,
        crate::APP_NAME,
        settings.debug_mode,
        settings.console_logging,
    )
}

/// File-only logging, rotated daily as `<log_dir>/<prefix>.<date>`.
pub fn setup_logging(log_dir: &str, prefix: &str, debug: bool) -> Result<WorkerGuard> {
    setup_logging_with_console(log_dir, prefix, debug, false)
}

/// File logging plus, with `console`, a colored stderr layer.
///
/// `RUST_LOG` takes precedence over `debug` when set.
pub fn setup_logging_with_console(
    log_dir: &str,
    prefix: &str,
    debug: bool,
    console: bool,
) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory: {}", log_dir))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
        log_dir, prefix,
    ));

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| level_filter(debug));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    // stderr keeps log lines out of the shell's stdout
    let console_layer = console.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    let debug_mode = debug;
    tracing::info!(log_dir, prefix, debug_mode, console, "Logging initialized");
    Ok(guard)
}

fn level_filter(debug: bool) -> EnvFilter {
    // Dependencies stay at info so debug mode is not flooded by HTTP internals
    if debug {
        EnvFilter::new("info,cheathub=debug")
    } else {
        EnvFilter::new("info")
    }
}
