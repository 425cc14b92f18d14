//! Error types for weather lookups and the local cache.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("City name must not be empty")]
    EmptyCity,

    #[error("Provider rejected the API key")]
    InvalidCredential,

    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Provider error ({status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl WeatherError {
    /// User-friendly message for console output.
    pub fn user_message(&self) -> String {
        match self {
            Self::EmptyCity => "Error: Please provide a city name.".to_string(),
            Self::InvalidCredential => {
                "Error: Invalid API key. Please check OPENWEATHER_API_KEY in your .env file."
                    .to_string()
            }
            Self::CityNotFound(city) => {
                format!("Error: City '{city}' not found. Please check the spelling.")
            }
            Self::Provider { status, message } => {
                format!("An API error occurred ({status}): {message}")
            }
            Self::Network(err) => format!(
                "Network error: Could not connect to the weather service.\nDetails: {err}"
            ),
            Self::MalformedResponse(msg) => {
                format!("Error: The weather service returned unexpected data ({msg}).")
            }
        }
    }
}

/// Failures inside the cache store. `Corrupt` never leaves the store.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache contents are not a valid JSON object: {0}")]
    Corrupt(String),

    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize weather cache: {0}")]
    Serialize(#[from] serde_json::Error),
}
