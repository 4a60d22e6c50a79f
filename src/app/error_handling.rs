//! Error handling utilities

use crate::error::Error;
use tracing::error;

const ARGUMENT_ERROR: i32 = 2;
const GENERAL_ERROR: i32 = 1;

/// Exit code for a fatal error: validation and argument problems map to 2,
/// everything else to 1.
pub fn exit_code_for(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<Error>() {
        Some(
            Error::Validation(_)
            | Error::MalformedInput(_)
            | Error::StepMismatch { .. }
            | Error::StepNotReached { .. }
            | Error::StepIncomplete(_)
            | Error::Config(_),
        ) => ARGUMENT_ERROR,
        Some(_) => GENERAL_ERROR,
        None if error.to_string().contains("required") => ARGUMENT_ERROR,
        None => GENERAL_ERROR,
    }
}

/// Handle fatal errors and exit with appropriate status code
///
/// Validation failures are listed one field per line. With `verbose >= 1` the
/// full error chain is shown as well.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    error!("Fatal error: {}", error);

    match error.downcast_ref::<Error>() {
        Some(Error::Validation(fields)) => {
            eprintln!("Error: validation failed");
            for (field, message) in fields.iter() {
                eprintln!("  {field}: {message}");
            }
        }
        _ => eprintln!("Error: {error}"),
    }

    if verbose >= 1 {
        eprintln!("\nError chain:");
        for (i, cause) in error.chain().enumerate() {
            eprintln!("  {}: {}", i, cause);
        }
    }

    std::process::exit(exit_code_for(&error))
}
