// UI module - controller and rendering shell
//
// This module contains:
// - AppController: wires user actions to the services and owns the state
// - ConsoleShell: line-oriented terminal shell that renders StateChange events

pub mod console;
pub mod controller;

pub use console::{ConsoleCommand, ConsoleShell, render_result};
pub use controller::AppController;
