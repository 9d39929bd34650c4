use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use model_cli::Cli;
use model_core::config::GeneratorConfig;
use model_core::operations::dispatch;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();

    let config = GeneratorConfig::load_or_default(cli.config.as_deref())?;
    let request = cli.command.to_request()?;

    match dispatch(&request, &config) {
        Ok(response) => {
            println!("{}", serde_json::to_string_pretty(&response)?);
            Ok(())
        }
        Err(e) => {
            if let Ok(json) = serde_json::to_string_pretty(&e) {
                eprintln!("{}", json);
            }
            Err(e.into())
        }
    }
}
