//! CLI command handlers

pub mod args;
pub mod commands;
pub mod router;

pub use args::{Cli, Commands, ConvertDirection};
pub use router::execute_command;
