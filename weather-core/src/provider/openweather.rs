use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::{fmt, time::Duration};
use tracing::debug;

use crate::{
    error::WeatherError,
    model::{Units, WeatherResult},
};

use super::WeatherProvider;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(WeatherError::Network)?;

        Ok(Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            http,
        })
    }

    /// Point the provider at a different URL (a proxy or a mock server).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn fetch_current(&self, city: &str, units: Units) -> Result<WeatherResult, WeatherError> {
        debug!(%city, %units, endpoint = %self.endpoint, "Requesting current weather");

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .map_err(WeatherError::Network)?;

        let status = res.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(WeatherError::InvalidCredential),
            StatusCode::NOT_FOUND => return Err(WeatherError::CityNotFound(city.to_string())),
            _ => {}
        }

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(WeatherError::Provider {
                status: status.as_u16(),
                message: error_message(status, &body),
            });
        }

        let body = res.text().await.map_err(WeatherError::Network)?;
        normalize(&body)
    }
}

impl fmt::Debug for OpenWeatherProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenWeatherProvider")
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, city: &str, units: Units) -> Result<WeatherResult, WeatherError> {
        self.fetch_current(city, units).await
    }
}

/// Reduce a current-weather body to a [`WeatherResult`].
fn normalize(body: &str) -> Result<WeatherResult, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)
        .map_err(|err| WeatherError::MalformedResponse(err.to_string()))?;

    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .unwrap_or_else(|| "Unknown".to_string());

    Ok(WeatherResult {
        city: parsed.name,
        temperature: parsed.main.temp,
        humidity: parsed.main.humidity,
        description,
    })
}

fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<OwErrorBody>(body) {
        return parsed.message;
    }
    if body.trim().is_empty() {
        return status.canonical_reason().unwrap_or("unknown error").to_string();
    }
    truncate_body(body)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> OpenWeatherProvider {
        OpenWeatherProvider::new("test_key").unwrap().with_endpoint(server.uri())
    }

    #[test]
    fn normalize_takes_first_condition() {
        let body = r#"{
            "name": "London",
            "dt": 1700000000,
            "main": {"temp": 15.0, "feels_like": 14.2, "humidity": 70},
            "weather": [{"description": "clear sky"}, {"description": "mist"}]
        }"#;

        let result = normalize(body).unwrap();
        assert_eq!(result.city, "London");
        assert_eq!(result.temperature, 15.0);
        assert_eq!(result.humidity, 70);
        assert_eq!(result.description, "clear sky");
    }

    #[test]
    fn normalize_without_conditions_uses_unknown() {
        let body = r#"{"name": "Oslo", "main": {"temp": -3.5, "humidity": 88}, "weather": []}"#;
        assert_eq!(normalize(body).unwrap().description, "Unknown");
    }

    #[test]
    fn normalize_rejects_missing_main() {
        let err = normalize(r#"{"name": "Oslo"}"#).unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }

    #[test]
    fn error_message_prefers_provider_message() {
        let msg = error_message(
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"cod": 429, "message": "rate limit exceeded"}"#,
        );
        assert_eq!(msg, "rate limit exceeded");

        let msg = error_message(StatusCode::BAD_GATEWAY, "");
        assert_eq!(msg, "Bad Gateway");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let provider = OpenWeatherProvider::new("super-secret").unwrap();
        let out = format!("{provider:?}");
        assert!(!out.contains("super-secret"));
        assert!(out.contains(DEFAULT_ENDPOINT));
    }

    #[tokio::test]
    async fn sends_city_key_and_units() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(query_param("q", "Boston"))
            .and(query_param("appid", "test_key"))
            .and(query_param("units", "imperial"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "Boston",
                "main": {"temp": 59.0, "humidity": 40},
                "weather": [{"description": "overcast clouds"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = provider_for(&mock_server)
            .current("Boston", Units::Imperial)
            .await
            .unwrap();

        assert_eq!(result.city, "Boston");
        assert_eq!(result.temperature, 59.0);
    }

    #[tokio::test]
    async fn maps_unauthorized_to_invalid_credential() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "cod": 401,
                "message": "Invalid API key."
            })))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).current("London", Units::Metric).await.unwrap_err();
        assert!(matches!(err, WeatherError::InvalidCredential));
    }

    #[tokio::test]
    async fn maps_not_found_to_city_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).current("Atlantis", Units::Metric).await.unwrap_err();
        assert!(matches!(err, WeatherError::CityNotFound(ref city) if city == "Atlantis"));
    }

    #[tokio::test]
    async fn maps_other_status_to_provider_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).current("London", Units::Metric).await.unwrap_err();
        match err {
            WeatherError::Provider { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn maps_bad_json_to_malformed_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let err = provider_for(&mock_server).current("London", Units::Metric).await.unwrap_err();
        assert!(matches!(err, WeatherError::MalformedResponse(_)));
    }
}
