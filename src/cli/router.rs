//! Command routing and execution

use crate::cli::args::Commands;
use crate::cli::commands::*;
use crate::config::Settings;
use anyhow::Result;

/// Execute a CLI command based on the parsed arguments
pub async fn execute_command(command: Commands, settings: &Settings) -> Result<()> {
    match command {
        Commands::Convert { direction } => run_convert_command(direction).await,
        Commands::Simulate { converter, input } => run_simulate_command(&converter, input).await,
        Commands::Sample { converter } => run_sample_command(&converter),
        Commands::Wizard {
            session,
            output,
            no_deploy,
        } => {
            run_wizard_command(WizardParams {
                session,
                output,
                no_deploy,
                settings: settings.clone(),
            })
            .await
        }
    }
}
