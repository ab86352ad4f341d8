//! CheatHub - CheatSlips cheat catalog client
//!
//! Main entry point for the console application.
//!
//! # Overview
//!
//! This binary wires the library into an interactive shell. It initializes:
//! - Configuration loading ([`ConfigManager`])
//! - Logging infrastructure (daily file rotation + optional console output)
//! - Tokio async runtime (request tasks and auto-clear timers)
//! - The page controller ([`AppController`]) and the [`ConsoleShell`]
//!
//! # Execution Flow
//!
//! 1. Load `CheatHub Data/CheatHub Config.yaml`, writing defaults on first run
//! 2. Initialize logging → `<Log Directory>/cheathub.<date>`
//! 3. Create tokio runtime with 4 worker threads
//! 4. Create AppController with the system clipboard
//! 5. Run the console shell until `quit` or end of input
//! 6. Log the session summary and shut the runtime down with a 5s timeout

use anyhow::Result;
use cheathub::services::SystemClipboard;
use cheathub::ui::ConsoleShell;
use cheathub::{APP_NAME, AppController, ConfigManager, VERSION};
use std::sync::Arc;

fn main() -> Result<()> {
    let config_manager = ConfigManager::new("CheatHub Data")?;
    let user_config = config_manager.load_or_init_user_config()?;

    // Hold the guard until exit so buffered log lines are flushed
    let _guard = cheathub::logging::setup_from_settings(&user_config.cheathub_settings)?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    tracing::info!(
        "Loaded configuration from {}",
        config_manager.user_config_path()
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(4)
        .thread_name("cheathub-worker")
        .build()?;

    tracing::info!("Tokio runtime initialized with {} worker threads", 4);

    let controller = Arc::new(AppController::new(
        &user_config,
        Arc::new(SystemClipboard::new()),
        runtime.handle().clone(),
    )?);

    let result = runtime.block_on(ConsoleShell::new(Arc::clone(&controller)).run());

    tracing::info!("Console closed, shutting down");
    controller.metrics().log_summary();

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    tracing::info!("Application shutdown complete");

    result.map_err(|e| {
        tracing::error!("Console error: {:#}", e);
        e
    })
}
