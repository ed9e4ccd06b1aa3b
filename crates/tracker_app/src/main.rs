mod platform;

use std::path::PathBuf;

use clap::Parser;
use platform::logging::{self, LogDestination};
use platform::{Cli, ConfigOverrides, TrackerConfig, CONFIG_FILENAME};
use tracker_logging::{parse_level, tracker_info, tracker_warn};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));
    // Logging depends on the config, so load problems are reported afterwards.
    let (mut config, load_outcome) = match TrackerConfig::load(&config_path) {
        Ok(Some(config)) => (config, Ok(true)),
        Ok(None) => (TrackerConfig::default(), Ok(false)),
        Err(err) => (TrackerConfig::default(), Err(err)),
    };
    config.apply(ConfigOverrides {
        base_url: cli.base_url.clone(),
        webhook_url: cli.webhook_url.clone(),
        output_dir: cli.output_dir.clone(),
    });

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        parse_level(&config.log_level)
    };
    logging::initialize(LogDestination::select(config.log_to_file, cli.verbose), level);

    match load_outcome {
        Ok(true) => tracker_info!("Loaded config from {:?}", config_path),
        Ok(false) => tracker_info!("No config at {:?}; using defaults", config_path),
        Err(err) => tracker_warn!("{}; using defaults", err),
    }
    tracker_info!("Backend {} (webhook {})", config.base_url, config.webhook_url);

    platform::run_app(cli.command, &config)
}
