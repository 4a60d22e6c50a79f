//! Application module
//!
//! Process-level concerns shared by every command: configuration, logging
//! setup and fatal error reporting.

pub mod config;
pub mod error_handling;
pub mod logging;

pub use config::AppConfig;
pub use error_handling::{exit_code_for, handle_fatal_error};
pub use logging::init_logging;
