use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    config::Settings,
    error::WeatherError,
    model::{Units, WeatherResult},
    provider::openweather::OpenWeatherProvider,
};

pub mod openweather;

/// Source of current conditions for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, city: &str, units: Units) -> Result<WeatherResult, WeatherError>;
}

/// Construct the OpenWeather provider from resolved settings.
pub fn provider_from_settings(settings: &Settings) -> Result<Box<dyn WeatherProvider>, WeatherError> {
    let provider = OpenWeatherProvider::new(settings.api_key.clone())?
        .with_endpoint(settings.endpoint.clone());
    Ok(Box::new(provider))
}
