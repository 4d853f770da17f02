use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Unit system requested from the weather service. The payload carries no
/// unit marker, so the request's choice travels alongside the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    #[default]
    Metric,
    Imperial,
}

impl Units {
    /// Value of the `units` query parameter.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Metric => "metric",
            Self::Imperial => "imperial",
        }
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Self::Standard => "K",
            Self::Metric => "C",
            Self::Imperial => "F",
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            Self::Standard | Self::Metric => "m/s",
            Self::Imperial => "mph",
        }
    }

    /// The same temperature in the other common scale, for side-by-side display.
    pub fn alternate_temperature(&self, temp: f64) -> (f64, &'static str) {
        match self {
            Self::Standard => (temperature::k2c(temp), "C"),
            Self::Metric => (temperature::c2f(temp), "F"),
            Self::Imperial => (temperature::f2c(temp), "C"),
        }
    }

    pub fn alternate_speed(&self, speed: f64) -> Option<(f64, &'static str)> {
        match self {
            Self::Standard => Some((speed::mps2mph(speed), "mph")),
            Self::Metric => Some((speed::mps2kph(speed), "km/h")),
            Self::Imperial => None,
        }
    }
}

pub mod temperature {
    const ZERO_C_IN_K: f64 = 273.15;

    pub fn f2c(temp_f: f64) -> f64 {
        (temp_f - 32.0) * 5.0 / 9.0
    }

    pub fn c2f(temp_c: f64) -> f64 {
        temp_c * 9.0 / 5.0 + 32.0
    }

    pub fn k2c(temp_k: f64) -> f64 {
        temp_k - ZERO_C_IN_K
    }

    #[test]
    fn test_temperature() {
        assert_eq!(f2c(212.0), 100.0);
        assert_eq!(f2c(32.0), 0.0);
        assert_eq!(c2f(0.0), 32.0);
        assert_eq!(c2f(100.0), 212.0);
        assert!((k2c(273.15)).abs() < 1e-9);
    }
}

pub mod speed {
    const MPH_PER_MPS: f64 = 2.236936;

    pub fn mps2kph(mps: f64) -> f64 {
        mps * 3.6
    }

    pub fn mps2mph(mps: f64) -> f64 {
        mps * MPH_PER_MPS
    }

    #[test]
    fn test_speed() {
        assert!((mps2kph(10.0) - 36.0).abs() < 1e-9);
        assert!((mps2mph(1.0) - 2.236936).abs() < 1e-9);
    }
}

pub mod direction {
    const COMPASS: [&str; 16] = [
        "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
        "NW", "NNW",
    ];

    /// Nearest 16-point compass heading for a bearing in degrees.
    pub fn degree_to_compass(deg: f64) -> &'static str {
        let deg = deg.rem_euclid(360.0);
        let val = (deg / 22.5 + 0.5) as usize;
        COMPASS[val % 16]
    }

    #[test]
    fn test_degree_to_compass() {
        assert_eq!(degree_to_compass(0.0), "N");
        assert_eq!(degree_to_compass(90.0), "E");
        assert_eq!(degree_to_compass(180.0), "S");
        assert_eq!(degree_to_compass(270.0), "W");
        assert_eq!(degree_to_compass(360.0), "N");
        assert_eq!(degree_to_compass(-90.0), "W");
        assert_eq!(degree_to_compass(350.0), "N");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_value_names() {
        assert_eq!(Units::from_str("imperial", true), Ok(Units::Imperial));
        assert!(Units::from_str("furlongs", true).is_err());
        for units in Units::value_variants() {
            let name = units.to_possible_value().unwrap();
            assert_eq!(name.get_name(), units.as_query());
        }
    }

    #[test]
    fn test_units_labels() {
        assert_eq!(Units::Metric.temperature_label(), "C");
        assert_eq!(Units::Imperial.speed_label(), "mph");
        assert_eq!(Units::Standard.as_query(), "standard");
    }

    #[test]
    fn test_alternate_values() {
        assert_eq!(Units::Metric.alternate_temperature(100.0), (212.0, "F"));
        assert_eq!(Units::Imperial.alternate_temperature(32.0), (0.0, "C"));
        assert_eq!(Units::Imperial.alternate_speed(5.0), None);
        let (kph, label) = Units::Metric.alternate_speed(10.0).unwrap();
        assert!((kph - 36.0).abs() < 1e-9);
        assert_eq!(label, "km/h");
    }
}
