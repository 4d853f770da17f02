use std::path::PathBuf;

use thiserror::Error;

/// Failure to attach the application to its host element.
///
/// All variants are fatal at startup: the binary reports them and exits
/// without drawing anything.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MountError {
    #[error("invalid host selector {0:?}, expected `#<id>`")]
    InvalidSelector(String),

    #[error("no host element with id {0:?} in the host document")]
    HostElementMissing(String),

    #[error("an application is already mounted on host element {0:?}")]
    AlreadyMounted(String),
}

/// A payload that does not match its data contract.
#[derive(Debug, Error)]
#[error("malformed {what} payload: {source}")]
pub struct DecodeError {
    pub what: &'static str,
    #[source]
    pub source: serde_json::Error,
}

impl DecodeError {
    pub fn new(what: &'static str, source: serde_json::Error) -> Self {
        Self { what, source }
    }
}

/// A textual coordinate that cannot be used as decimal degrees.
#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("{field} {value:?} is not a number")]
    NotANumber { field: &'static str, value: String },

    #[error("{field} {value} is outside +/-{limit} degrees")]
    OutOfRange {
        field: &'static str,
        value: f64,
        limit: f64,
    },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{what} service answered {status}: {body}")]
    Status {
        what: &'static str,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("no usable coordinates: {0}")]
    Coordinates(#[from] CoordinateError),

    #[error("no API key configured for {0}")]
    MissingApiKey(&'static str),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no configuration directory available on this platform")]
    NoConfigDir,

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("refresh interval must be at least {min} seconds, got {got}")]
    RefreshTooShort { min: u64, got: u64 },
}
