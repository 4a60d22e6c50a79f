use super::read_input;
use crate::transform::{sample_input, simulate};
use anyhow::Result;
use std::path::PathBuf;

pub async fn run_simulate_command(converter: &str, input: Option<PathBuf>) -> Result<()> {
    let sample = match input {
        Some(path) => read_input(Some(path.as_path())).await?,
        None => serde_json::to_string(&sample_input(converter))?,
    };
    let envelope = simulate(converter, &sample)?;
    println!("{}", serde_json::to_string_pretty(&envelope)?);
    Ok(())
}

pub fn run_sample_command(converter: &str) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&sample_input(converter))?);
    Ok(())
}
