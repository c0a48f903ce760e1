//! DSM Core - Backend logic for Docker Simple Manager
//!
//! This crate contains the application's settings, workspace and
//! logging infrastructure with zero UI dependencies. It can be used
//! by the GUI application or a CLI tool.

pub mod logging;
pub mod paths;
pub mod settings;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
