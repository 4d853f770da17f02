use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;

use crate::error::{DecodeError, FetchError};

const USER_AGENT: &str = concat!("geowx/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Base URL and credentials for one upstream service.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Endpoint {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key,
        }
    }

    /// `path` joined onto the base URL with exactly one slash between them.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn key(&self, service: &'static str) -> Result<&str, FetchError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(FetchError::MissingApiKey(service))
    }
}

pub fn client() -> Result<Client, FetchError> {
    Ok(Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()?)
}

/// Decode a JSON body into one of the data contracts.
pub fn decode<T: DeserializeOwned>(what: &'static str, body: &str) -> Result<T, DecodeError> {
    serde_json::from_str(body).map_err(|e| DecodeError::new(what, e))
}

pub fn get_json<T: DeserializeOwned>(
    client: &Client,
    what: &'static str,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, FetchError> {
    log::debug!("GET {url} ({what})");
    let response = client.get(url).query(query).send()?;
    let status = response.status();
    let body = response.text()?;
    if !status.is_success() {
        log::warn!("{what} request failed with {status}");
        return Err(FetchError::Status {
            what,
            status: status.as_u16(),
            body,
        });
    }
    Ok(decode(what, &body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url_joins_single_slash() {
        let ep = Endpoint::new("https://api.example.com/", None);
        assert_eq!(ep.url("/ipgeo"), "https://api.example.com/ipgeo");
        let ep = Endpoint::new("https://api.example.com/data/2.5", None);
        assert_eq!(ep.url("weather"), "https://api.example.com/data/2.5/weather");
    }

    #[test]
    fn test_endpoint_key_rejects_blank() {
        let ep = Endpoint::new("https://x", Some(String::new()));
        assert!(matches!(ep.key("weather"), Err(FetchError::MissingApiKey("weather"))));
        let ep = Endpoint::new("https://x", Some("abc".into()));
        assert_eq!(ep.key("weather").unwrap(), "abc");
    }

    #[test]
    fn test_decode_reports_contract_name() {
        let err = decode::<serde_json::Value>("weather", "{not json").unwrap_err();
        assert_eq!(err.what, "weather");
        assert!(err.to_string().starts_with("malformed weather payload"));
    }
}
