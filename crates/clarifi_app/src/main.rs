mod cli;
mod command;
mod platform;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    let config = platform::AppConfig::load(&args)?;
    engine_logging::initialize(config.log_destination, config.log_level, &config.log_path);
    platform::run(config)
}
