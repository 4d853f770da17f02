//! Current-weather observation, as returned by the OpenWeatherMap
//! `data/2.5/weather` endpoint.

use chrono::{DateTime, FixedOffset};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, FetchError};
use crate::geolocation::Coordinates;
use crate::http::{self, Endpoint};
use crate::units::Units;

const CONTRACT: &str = "weather";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Weather {
    pub coord: Coord,
    /// Every condition describing this observation, in upstream order.
    pub weather: Vec<Condition>,
    pub base: String,
    pub main: Measurements,
    pub visibility: i64,
    pub wind: Wind,
    pub clouds: Clouds,
    pub dt: i64,
    pub sys: Sys,
    /// Shift in seconds from UTC.
    pub timezone: i32,
    /// Omitted upstream when there is no rain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain: Option<Rain>,
    pub id: i64,
    pub name: String,
    pub cod: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coord {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Condition {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Measurements {
    pub temp: f64,
    pub feels_like: f64,
    pub temp_min: f64,
    pub temp_max: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub sea_level: f64,
    pub grnd_level: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Wind {
    pub speed: f64,
    pub deg: f64,
    pub gust: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Clouds {
    /// Cloud cover, percent.
    pub all: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Sys {
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// Precipitation in mm, keyed by accumulation window.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Rain {
    #[serde(rename = "1h", default, skip_serializing_if = "Option::is_none")]
    pub one_hour: Option<f64>,

    #[serde(rename = "3h", default, skip_serializing_if = "Option::is_none")]
    pub three_hour: Option<f64>,
}

impl Weather {
    pub fn decode(json: &str) -> Result<Self, DecodeError> {
        http::decode(CONTRACT, json)
    }

    pub fn current(
        client: &Client,
        endpoint: &Endpoint,
        at: Coordinates,
        units: Units,
    ) -> Result<Self, FetchError> {
        let key = endpoint.key(CONTRACT)?;
        let url = endpoint.url("data/2.5/weather");
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();
        let query = [
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("units", units.as_query()),
            ("appid", key),
        ];
        let weather: Self = http::get_json(client, CONTRACT, &url, &query)?;
        log::info!(
            "weather for {} at {}: {}",
            weather.name,
            weather.dt,
            weather.summary().unwrap_or("no conditions")
        );
        Ok(weather)
    }

    fn offset(&self) -> Option<FixedOffset> {
        FixedOffset::east_opt(self.timezone)
    }

    fn local(&self, epoch: i64) -> Option<DateTime<FixedOffset>> {
        let offset = self.offset()?;
        DateTime::from_timestamp(epoch, 0).map(|utc| utc.with_timezone(&offset))
    }

    pub fn observed_at(&self) -> Option<DateTime<FixedOffset>> {
        self.local(self.dt)
    }

    pub fn sunrise(&self) -> Option<DateTime<FixedOffset>> {
        self.local(self.sys.sunrise)
    }

    pub fn sunset(&self) -> Option<DateTime<FixedOffset>> {
        self.local(self.sys.sunset)
    }

    pub fn summary(&self) -> Option<&str> {
        self.weather.first().map(|c| c.description.as_str())
    }
}
