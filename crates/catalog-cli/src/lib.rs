//! Catalog CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations and JSON output

pub mod cli;
pub mod commands;

pub use cli::{
    AdminCommands, Cli, Commands, ItemCommands, PlaceCommands, StyleCommands, TopicCommands,
};
pub use commands::{execute, handle_admin, init_logging, load_settings, open_storage, run};
