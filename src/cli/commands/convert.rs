use super::read_input;
use crate::cli::args::ConvertDirection;
use crate::error::Error;
use crate::mapping::{to_legacy_format, to_new_format, LegacyRequest, NewResponse};
use anyhow::Result;
use serde::de::DeserializeOwned;

pub async fn run_convert_command(direction: ConvertDirection) -> Result<()> {
    let output = match direction {
        ConvertDirection::Request { file } => {
            let legacy: LegacyRequest = parse(&read_input(file.as_deref()).await?)?;
            serde_json::to_string_pretty(&to_new_format(&legacy))?
        }
        ConvertDirection::Response { file } => {
            let response: NewResponse = parse(&read_input(file.as_deref()).await?)?;
            serde_json::to_string_pretty(&to_legacy_format(&response))?
        }
    };
    println!("{output}");
    Ok(())
}

fn parse<T: DeserializeOwned>(text: &str) -> Result<T, Error> {
    serde_json::from_str(text).map_err(|e| Error::MalformedInput(e.to_string()))
}
