//! Command implementation modules

pub mod convert;
pub mod simulate;
pub mod wizard;

pub use convert::run_convert_command;
pub use simulate::{run_sample_command, run_simulate_command};
pub use wizard::{run_wizard_command, WizardParams, WizardSession};

use anyhow::{Context, Result};
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Read a whole input file, or stdin when no path is given
pub(crate) async fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buffer)
                .await
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}
