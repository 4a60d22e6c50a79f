use api_configurator::app::{handle_fatal_error, init_logging, AppConfig};
use api_configurator::cli::{execute_command, Cli};
use api_configurator::config::Settings;
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => handle_fatal_error(e.into(), cli.verbose),
    };

    let config = AppConfig::new(cli.verbose).with_log_filter(settings.log_level.clone());
    init_logging(&config);

    if let Err(e) = execute_command(cli.command, &settings).await {
        handle_fatal_error(e, cli.verbose);
    }
}
