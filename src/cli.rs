use std::path::PathBuf;

use clap::builder::{styling::AnsiColor, Styles};
use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::units::Units;

const ABOUT: &str = "IP geolocation and current weather TUI";

const LONG_ABOUT: &str = "
TUI showing where your public IP address is located and the current weather there.

Location comes from ipgeolocation.io and weather from OpenWeatherMap. Both need an API key, set
in the config file or through IPGEOLOCATION_API_KEY and OPENWEATHER_API_KEY.

Pass --save to store the given options, so subsequent runs of `geowx` use them unless otherwise
specified.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, styles=STYLES, about=ABOUT, long_about = LONG_ABOUT)]
pub struct Args {
    #[arg(long, help = "Look up this IP address instead of your own")]
    pub ip: Option<String>,

    #[arg(short, long, value_enum, help = "Unit system for weather values")]
    pub units: Option<Units>,

    #[arg(long, value_name = "SECS", help = "Seconds between automatic refreshes")]
    pub refresh: Option<u64>,

    #[arg(long, value_name = "PATH", help = "Config file (default: <config dir>/geowx/config.toml)")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "Log file (default: <cache dir>/geowx/geowx.log)")]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_enum, help = "Minimum log level (overrides RUST_LOG, info when neither is set)")]
    pub log_level: Option<LogLevel>,

    #[arg(long, help = "Write the resulting options back to the config file")]
    pub save: bool,
}
