mod app;
mod cli;
mod config;
mod effects;
pub mod logging;
mod ui;

pub use app::run_app;
pub use cli::Cli;
pub use config::{ConfigOverrides, TrackerConfig, CONFIG_FILENAME};
