//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - A whole-file JSON cache of recent lookups
//! - The OpenWeather provider behind a small trait
//! - The cache-first fetch routine tying them together
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod service;

pub use cache::{CacheEntry, CacheStorage, CacheStore, FileStorage, MemoryStorage};
pub use config::{API_KEY_ENV, Config, Settings};
pub use error::{CacheError, WeatherError};
pub use model::{Units, WeatherResult};
pub use provider::{WeatherProvider, openweather::OpenWeatherProvider};
pub use service::{WeatherService, fetch_weather};
