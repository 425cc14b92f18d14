//! Cache-first weather lookups.
//!
//! One call reads the cache, and only on a miss (absent, stale, or fetched in
//! other units) goes to the provider. A successful provider response is
//! written back before it is returned. Provider failures are returned as-is
//! and leave the cache untouched.

use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    cache::{CacheStorage, CacheStore, DEFAULT_CACHE_FILE, DEFAULT_TTL, FileStorage, cache_key, unix_now},
    config::Settings,
    error::WeatherError,
    model::{Units, WeatherResult},
    provider::{WeatherProvider, openweather::OpenWeatherProvider, provider_from_settings},
};

#[derive(Debug)]
pub struct WeatherService<S: CacheStorage = FileStorage> {
    provider: Box<dyn WeatherProvider>,
    cache: CacheStore<S>,
    ttl: Duration,
}

impl WeatherService<FileStorage> {
    pub fn from_settings(settings: &Settings) -> Result<Self, WeatherError> {
        let provider = provider_from_settings(settings)?;
        Ok(Self::new(provider, CacheStore::open(&settings.cache_file)).with_ttl(settings.ttl))
    }
}

impl<S: CacheStorage> WeatherService<S> {
    pub fn new(provider: Box<dyn WeatherProvider>, cache: CacheStore<S>) -> Self {
        Self { provider, cache, ttl: DEFAULT_TTL }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache(&self) -> &CacheStore<S> {
        &self.cache
    }

    pub async fn fetch(&self, city: &str, units: Units) -> Result<WeatherResult, WeatherError> {
        self.fetch_at(city, units, unix_now()).await
    }

    /// Same as [`fetch`](Self::fetch) with an explicit clock reading (seconds since epoch).
    pub async fn fetch_at(
        &self,
        city: &str,
        units: Units,
        now: f64,
    ) -> Result<WeatherResult, WeatherError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherError::EmptyCity);
        }
        let key = cache_key(city);

        match self.cache.get(&key) {
            Some(entry) if !entry.matches_units(units) => {
                debug!(city = %key, %units, "Cached weather is in other units");
            }
            Some(entry) if entry.is_fresh(now, self.ttl) => {
                debug!(city = %key, "Cache hit");
                return Ok(entry.weather);
            }
            Some(_) => debug!(city = %key, "Cached weather is stale"),
            None => debug!(city = %key, "Cache miss"),
        }

        let weather = self.provider.current(city, units).await?;

        if let Err(err) = self.cache.put(&key, &weather, now, units) {
            warn!(city = %key, error = %err, "Failed to save weather to cache");
        }

        Ok(weather)
    }
}

/// Fetch current weather using `cache.json` in the working directory and the default TTL.
pub async fn fetch_weather(
    city: &str,
    api_key: &str,
    units: Units,
) -> Result<WeatherResult, WeatherError> {
    let provider = OpenWeatherProvider::new(api_key)?;
    WeatherService::new(Box::new(provider), CacheStore::open(DEFAULT_CACHE_FILE))
        .fetch(city, units)
        .await
}
