use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Unit system requested from the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    /// Temperature suffix used when printing.
    pub fn temperature_symbol(&self) -> &'static str {
        match self {
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial]
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial."
            )),
        }
    }
}

/// Normalized current conditions, as returned to callers and stored in the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub city: String,
    pub temperature: f64,
    pub humidity: u8,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn units_parse_is_case_insensitive() {
        assert_eq!(Units::try_from("Imperial").unwrap(), Units::Imperial);
        assert_eq!(Units::try_from(" METRIC ").unwrap(), Units::Metric);
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("kelvin").unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn default_units_are_metric() {
        assert_eq!(Units::default(), Units::Metric);
        assert_eq!(Units::Metric.temperature_symbol(), "°C");
        assert_eq!(Units::Imperial.temperature_symbol(), "°F");
    }
}
