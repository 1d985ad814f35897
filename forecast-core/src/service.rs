//! The single entry point consumers call.
//!
//! `WeatherService` checks the cache, then chains geocoding and the
//! weather lookup on a miss. It owns one cancellation slot: every call to
//! [`WeatherService::fetch_weather`] cancels whatever request is still in
//! flight, and a cancelled request never writes to the cache.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::{
    cache::WeatherCache,
    config::Config,
    error::WeatherError,
    model::{WeatherCondition, WeatherData, round_half_up},
    provider::{self, GeoResult, Geocoder, NominatimGeocoder, OpenWeatherClient, WeatherSource},
    schema::{OneCallResponse, Schema, ValidationError},
};

#[derive(Debug)]
pub struct WeatherService {
    config: Config,
    geocoder: Box<dyn Geocoder>,
    weather: Box<dyn WeatherSource>,
    cache: WeatherCache,
    current: Mutex<Option<Arc<CancellationToken>>>,
}

impl WeatherService {
    pub fn new(config: Config, geocoder: Box<dyn Geocoder>, weather: Box<dyn WeatherSource>) -> Self {
        let cache = WeatherCache::new(config.cache_ttl());
        Self { config, geocoder, weather, cache, current: Mutex::new(None) }
    }

    /// Build the service with the Nominatim and OpenWeather clients.
    pub fn from_config(config: Config) -> Result<Self, WeatherError> {
        let http = provider::http_client(&config)?;
        let geocoder =
            NominatimGeocoder::new(http.clone(), config.geocoding_url.clone(), config.user_agent.clone());
        let weather = OpenWeatherClient::new(http, config.weather_url.clone());

        Ok(Self::new(config, Box::new(geocoder), Box::new(weather)))
    }

    pub fn cache(&self) -> &WeatherCache {
        &self.cache
    }

    /// Current weather for `city`, served from cache when fresh.
    ///
    /// Supersedes any request still in flight, even for another city. The
    /// superseded call resolves to [`WeatherError::Cancelled`].
    pub async fn fetch_weather(&self, city: &str) -> Result<WeatherData, WeatherError> {
        self.abort_current_request();

        if let Some(cached) = self.cache.get(city) {
            return Ok(cached);
        }
        tracing::info!(city, "cache miss, fetching fresh data");

        let api_key = self
            .config
            .api_key()
            .ok_or_else(|| WeatherError::Config { env_var: self.config.api_key_env.clone() })?;

        let token = Arc::new(CancellationToken::new());
        *self.current.lock() = Some(Arc::clone(&token));

        let outcome = self.lookup(city, &api_key, &token).await;

        // Settling and caching happen under the slot lock so a newer call
        // cannot cancel us between the check and the write.
        let mut current = self.current.lock();
        if current.as_ref().is_some_and(|active| Arc::ptr_eq(active, &token)) {
            *current = None;
        }
        if token.is_cancelled() {
            tracing::debug!(city, "discarding superseded result");
            return Err(WeatherError::Cancelled);
        }

        let data = outcome?;
        self.cache.put(city, data.clone());
        Ok(data)
    }

    /// Cancel the in-flight request, if any.
    pub fn abort_current_request(&self) {
        if let Some(token) = self.current.lock().take() {
            token.cancel();
            tracing::debug!("cancelled in-flight weather request");
        }
    }

    /// Drop every cached result. In-flight requests are unaffected.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    async fn lookup(
        &self,
        city: &str,
        api_key: &str,
        token: &CancellationToken,
    ) -> Result<WeatherData, WeatherError> {
        let geo = self.geocoder.geocode(city, token).await?;
        let response = self.weather.fetch_current_weather(geo.lat, geo.lon, api_key, token).await?;
        normalize(geo, &response)
    }
}

fn normalize(geo: GeoResult, response: &OneCallResponse) -> Result<WeatherData, WeatherError> {
    let current = &response.current;
    let primary = current.primary().ok_or_else(|| {
        ValidationError::new(Schema::Weather, "current.weather must contain at least one item")
    })?;

    Ok(WeatherData {
        city: geo.name,
        temperature: round_half_up(current.temp) as i32,
        condition: WeatherCondition::from_id(primary.id),
        condition_description: primary.description.clone(),
        humidity: round_half_up(current.humidity.clamp(0.0, 100.0)) as u8,
        wind_speed: round_half_up(current.wind_speed * 10.0) / 10.0,
        icon: primary.icon.clone(),
        observed_at: DateTime::from_timestamp(current.dt as i64, 0).unwrap_or_else(Utc::now),
    })
}
