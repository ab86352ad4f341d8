// CheatHub - CheatSlips cheat catalog client
//
// This is the library crate containing the session, catalog, and view-state logic.
// The binary crate (main.rs) provides the console entry point.

pub mod config;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod state;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AppState, UserConfig};
pub use state::{StateChange, StateManager};
pub use ui::AppController;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
