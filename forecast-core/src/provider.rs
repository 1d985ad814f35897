use std::{fmt::Debug, future::Future};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::{config::Config, error::WeatherError, schema::OneCallResponse};

pub mod nominatim;
pub mod openweather;

pub use nominatim::NominatimGeocoder;
pub use openweather::OpenWeatherClient;

/// Coordinates plus the display name resolved for a city query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoResult {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Resolves free-text place names.
#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    async fn geocode(
        &self,
        city: &str,
        cancel: &CancellationToken,
    ) -> Result<GeoResult, WeatherError>;
}

/// Fetches current conditions for a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    async fn fetch_current_weather(
        &self,
        lat: f64,
        lon: f64,
        api_key: &str,
        cancel: &CancellationToken,
    ) -> Result<OneCallResponse, WeatherError>;
}

/// HTTP client shared by both providers.
pub fn http_client(config: &Config) -> Result<Client, WeatherError> {
    Client::builder()
        .connect_timeout(config.connect_timeout())
        .build()
        .map_err(|e| WeatherError::Network(format!("Failed to initialise HTTP client: {e}")))
}

/// Run `fut` unless `cancel` fires first.
pub(crate) async fn unless_cancelled<T, F>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, WeatherError>
where
    F: Future<Output = Result<T, WeatherError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(WeatherError::Cancelled),
        res = fut => res,
    }
}

/// Reason phrase for a status, e.g. "Service Unavailable".
pub(crate) fn status_text(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => status.as_str().to_string(),
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn status_text_uses_reason_phrase() {
        assert_eq!(status_text(StatusCode::SERVICE_UNAVAILABLE), "Service Unavailable");
        assert_eq!(status_text(StatusCode::NOT_FOUND), "Not Found");
    }

    #[test]
    fn status_text_falls_back_to_code() {
        let odd = StatusCode::from_u16(599).unwrap();
        assert_eq!(status_text(odd), "599");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(300);
        let cut = truncate_body(&long);
        assert!(cut.ends_with("..."));
        assert_eq!(cut.chars().count(), 203);
        assert_eq!(truncate_body("short"), "short");
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let token = CancellationToken::new();
        token.cancel();

        let res = unless_cancelled(&token, async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, WeatherError>(())
        })
        .await;

        assert!(res.unwrap_err().is_cancelled());
    }

    #[tokio::test]
    async fn live_token_lets_the_future_finish() {
        let token = CancellationToken::new();
        let res = unless_cancelled(&token, async { Ok::<_, WeatherError>(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }
}
