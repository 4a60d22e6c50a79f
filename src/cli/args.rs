//! CLI argument structures

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Configure adapters between a legacy API and a new API
#[derive(Parser)]
#[command(name = "apiconf")]
#[command(about = "apiconf - Configure, test and deploy API adapters", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace, -vvv for all)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (TOML) applied over the global settings
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a request or response between the legacy and new formats
    Convert {
        #[command(subcommand)]
        direction: ConvertDirection,
    },

    /// Run a simulated test of a converter
    Simulate {
        /// Converter name
        #[arg(long)]
        converter: String,

        /// JSON input file (a generated sample is used when omitted)
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },

    /// Print a sample input for a converter
    Sample {
        /// Converter name
        #[arg(long)]
        converter: String,
    },

    /// Run every wizard step from a session file
    Wizard {
        /// Session file (YAML) with route, authentication and specifications
        session: PathBuf,

        /// Write the deployment document to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Stop after the deployment document is generated and tested
        #[arg(long)]
        no_deploy: bool,
    },
}

#[derive(Subcommand)]
pub enum ConvertDirection {
    /// Legacy request to new request
    Request {
        /// JSON file (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// New response to legacy response
    Response {
        /// JSON file (stdin when omitted)
        file: Option<PathBuf>,
    },
}
