//! IP geolocation lookup result, as returned by the ipgeolocation.io
//! `ipgeo` endpoint.
//!
//! Numeric-looking fields the service sends as strings (`latitude`,
//! `longitude`, `zipcode`, `calling_code`, `geoname_id`) are kept as text.
//! Use [`UserGeolocation::coordinates`] to get numbers out.

use chrono::{DateTime, FixedOffset, Utc};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{CoordinateError, DecodeError, FetchError};
use crate::http::{self, Endpoint};

const CONTRACT: &str = "geolocation";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct UserGeolocation {
    pub ip: String,
    pub continent_code: String,
    pub continent_name: String,
    pub country_code2: String,
    pub country_code3: String,
    pub country_name: String,
    pub country_name_official: String,
    pub country_capital: String,
    pub state_prov: String,
    pub state_code: String,
    pub district: String,
    pub city: String,
    pub zipcode: String,
    pub latitude: String,
    pub longitude: String,
    pub is_eu: bool,
    pub calling_code: String,
    pub country_tld: String,
    pub languages: String,
    pub country_flag: String,
    pub geoname_id: String,
    pub isp: String,
    pub connection_type: String,
    pub organization: String,
    pub currency: Currency,
    pub time_zone: TimeZone,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TimeZone {
    pub name: String,
    /// Hours from UTC, standard time. May be fractional (e.g. 5.5).
    pub offset: f64,
    pub offset_with_dst: f64,
    pub current_time: String,
    /// Epoch seconds, with a fractional millisecond part.
    pub current_time_unix: f64,
    pub is_dst: bool,
    pub dst_savings: f64,
}

/// Decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Parse one textual coordinate, rejecting values beyond `limit` degrees.
pub fn parse_coordinate(
    field: &'static str,
    text: &str,
    limit: f64,
) -> Result<f64, CoordinateError> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| CoordinateError::NotANumber {
            field,
            value: text.to_string(),
        })?;
    if !value.is_finite() || value.abs() > limit {
        return Err(CoordinateError::OutOfRange {
            field,
            value,
            limit,
        });
    }
    Ok(value)
}

impl UserGeolocation {
    pub fn decode(json: &str) -> Result<Self, DecodeError> {
        http::decode(CONTRACT, json)
    }

    /// Look up `ip`, or the caller's own address when `ip` is `None`.
    pub fn lookup(
        client: &Client,
        endpoint: &Endpoint,
        ip: Option<&str>,
    ) -> Result<Self, FetchError> {
        let key = endpoint.key(CONTRACT)?;
        let url = endpoint.url("ipgeo");
        let mut query = vec![("apiKey", key)];
        if let Some(ip) = ip {
            query.push(("ip", ip));
        }
        let geo: Self = http::get_json(client, CONTRACT, &url, &query)?;
        log::info!("located {} in {}", geo.ip, geo.place());
        Ok(geo)
    }

    pub fn coordinates(&self) -> Result<Coordinates, CoordinateError> {
        Ok(Coordinates {
            latitude: parse_coordinate("latitude", &self.latitude, 90.0)?,
            longitude: parse_coordinate("longitude", &self.longitude, 180.0)?,
        })
    }

    /// "City, State, Country", skipping blank parts.
    pub fn place(&self) -> String {
        let parts: Vec<&str> = [&self.city, &self.state_prov, &self.country_name]
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect();
        if parts.is_empty() {
            "--".to_string()
        } else {
            parts.join(", ")
        }
    }
}

impl TimeZone {
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.current_time_unix.trunc() as i64;
        let nanos = (self.current_time_unix.fract() * 1e9).round() as u32;
        DateTime::from_timestamp(secs, nanos.min(999_999_999))
    }

    /// Lookup time on the location's wall clock, DST included.
    pub fn local_time(&self) -> Option<DateTime<FixedOffset>> {
        let offset = FixedOffset::east_opt((self.offset_with_dst * 3600.0).round() as i32)?;
        self.observed_at().map(|at| at.with_timezone(&offset))
    }
}
