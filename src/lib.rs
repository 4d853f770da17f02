//! Terminal client for IP geolocation and current weather.
//!
//! [`geolocation::UserGeolocation`] and [`weather::Weather`] are the decode
//! targets for the two upstream JSON payloads. [`shell`] mounts the
//! [`app::App`] composition root into the terminal host document.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod geolocation;
pub mod http;
pub mod logger;
pub mod shell;
pub mod units;
pub mod weather;
