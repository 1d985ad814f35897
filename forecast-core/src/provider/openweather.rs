use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::{
    error::WeatherError,
    provider::{WeatherSource, status_text, truncate_body, unless_cancelled},
    schema::{self, OneCallResponse},
};

/// Current conditions through the One Call 3.0 API.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    const EXCLUDE: &'static str = "minutely,hourly,daily,alerts";

    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), http }
    }

    async fn fetch_current(
        &self,
        lat: f64,
        lon: f64,
        api_key: &str,
    ) -> Result<OneCallResponse, WeatherError> {
        let lat = lat.to_string();
        let lon = lon.to_string();

        let res = self
            .http
            .get(&self.base_url)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("appid", api_key),
                ("units", "metric"),
                ("exclude", Self::EXCLUDE),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(format!("Weather request failed: {e}")))?;

        let status = res.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("OpenWeather rejected the API key");
            return Err(WeatherError::Auth);
        }

        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %truncate_body(&body), "weather request rejected");
            return Err(WeatherError::Network(format!(
                "Failed to fetch weather data: {}",
                status_text(status)
            )));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| WeatherError::Network(format!("Failed to read weather response: {e}")))?;

        let parsed = schema::parse_one_call(&body).inspect_err(|e| {
            tracing::warn!(detail = e.detail(), "weather payload failed validation");
        })?;

        Ok(parsed)
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn fetch_current_weather(
        &self,
        lat: f64,
        lon: f64,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<OneCallResponse, WeatherError> {
        unless_cancelled(cancel, self.fetch_current(lat, lon, api_key)).await
    }
}
