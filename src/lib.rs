//! Library interface for bunenv, the Bun virtual environment builder
//!
//! The binary is a thin wrapper: it parses the command line, layers the
//! configuration into [`settings::Settings`] and hands them to
//! [`commands::run`]. Everything is exposed here for testing.

pub mod activate;
pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fs_utils;
pub mod install;
pub mod logging;
pub mod platform;
pub mod process;
pub mod settings;
pub mod version;

// Re-export commonly used types
pub use error::{BunenvError, Result};
pub use platform::{PlatformKey, Variant};
pub use settings::Settings;
