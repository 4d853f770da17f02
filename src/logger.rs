//! Logger initialization.
//!
//! The terminal belongs to the UI while the app runs, so records are written
//! to a file instead of stderr. `RUST_LOG` is read first and an explicit
//! level, when given, replaces its global directive.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use env_logger::{Builder, Target};
use log::LevelFilter;

use crate::error::ConfigError;

const NOISY_DEPENDENCIES: [&str; 3] = ["reqwest", "hyper", "hyper_util"];

pub fn default_log_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("geowx")
        .join("geowx.log")
}

/// Filters only; target and format are added by [`init_logger`].
///
/// Dependencies are capped at info only when `rust_log` is unset, so
/// `RUST_LOG=reqwest=debug` still works.
fn filter_builder(level: Option<LevelFilter>, rust_log: Option<&str>) -> Builder {
    let mut builder = Builder::new();
    match rust_log {
        Some(filters) => {
            builder.parse_filters(filters);
        }
        None => {
            builder.filter_level(LevelFilter::Info);
            for module in NOISY_DEPENDENCIES {
                builder.filter_module(module, LevelFilter::Info);
            }
        }
    }
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder
}

pub fn init_logger(level: Option<LevelFilter>, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;

    let rust_log = std::env::var("RUST_LOG").ok();
    let mut builder = filter_builder(level, rust_log.as_deref());
    builder.target(Target::Pipe(Box::new(file)));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} [{}] {}: {}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    if let Err(err) = builder.try_init() {
        log::debug!("keeping the existing logger: {err}");
    }
    Ok(())
}
