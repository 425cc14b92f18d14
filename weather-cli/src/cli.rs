use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use weather_core::{API_KEY_ENV, Config, Units, WeatherService};

use crate::display;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Get the current weather for a specific city.")]
pub struct Cli {
    /// The name of the city to get the weather for.
    pub city: String,

    /// Units for temperature (metric=Celsius, imperial=Fahrenheit). Default: metric
    #[arg(long, value_parser = parse_units)]
    pub units: Option<Units>,

    /// Cache file to use instead of ./cache.json.
    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Seconds a cached result stays fresh.
    #[arg(long, value_name = "SECS")]
    pub ttl: Option<u64>,
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|err| err.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;
        let mut settings = config.resolve(std::env::var(API_KEY_ENV).ok())?;

        if let Some(units) = self.units {
            settings.units = units;
        }
        if let Some(path) = self.cache_file {
            settings.cache_file = path;
        }
        if let Some(secs) = self.ttl {
            settings.ttl = std::time::Duration::from_secs(secs);
        }

        let service = WeatherService::from_settings(&settings)
            .context("Failed to set up the weather client")?;

        match service.fetch(&self.city, settings.units).await {
            Ok(weather) => print!("{}", display::render(&weather, settings.units)),
            Err(err) => {
                tracing::debug!(error = ?err, "Weather lookup failed");
                eprintln!("{}", err.user_message());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_city_and_units() {
        let cli = Cli::try_parse_from(["weather", "London", "--units", "imperial"]).unwrap();
        assert_eq!(cli.city, "London");
        assert_eq!(cli.units, Some(Units::Imperial));
        assert!(cli.cache_file.is_none());
    }

    #[test]
    fn units_are_optional() {
        let cli = Cli::try_parse_from(["weather", "Paris"]).unwrap();
        assert_eq!(cli.units, None);
    }

    #[test]
    fn rejects_unknown_units() {
        let err = Cli::try_parse_from(["weather", "Paris", "--units", "kelvin"]).unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn city_is_required() {
        assert!(Cli::try_parse_from(["weather"]).is_err());
    }
}
