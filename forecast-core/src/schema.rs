//! Shapes of the two upstream payloads and the checks applied to them.
//!
//! Deserialization enforces field presence and JSON types (no coercion);
//! `Validate` adds the rules serde cannot express. A failure carries the
//! raw diagnostic for logging, while `Display` only names the service.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Geocode,
    Weather,
}

impl std::fmt::Display for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schema::Geocode => f.write_str("Invalid response from geocoding service"),
            Schema::Weather => f.write_str("Invalid response from weather service"),
        }
    }
}

#[derive(Debug, Error)]
#[error("{schema}")]
pub struct ValidationError {
    pub schema: Schema,
    detail: String,
}

impl ValidationError {
    pub fn new(schema: Schema, detail: impl Into<String>) -> Self {
        Self { schema, detail: detail.into() }
    }

    /// Parser or rule diagnostic. Not meant for end users.
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

/// One Nominatim search hit.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeRecord {
    pub place_id: f64,
    pub lat: String,
    pub lon: String,
    pub display_name: String,
    pub name: Option<String>,
    pub address: Option<GeocodeAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub municipality: Option<String>,
    pub country: Option<String>,
}

/// One Call 3.0 payload with only the `current` block requested.
#[derive(Debug, Clone, Deserialize)]
pub struct OneCallResponse {
    pub lat: f64,
    pub lon: f64,
    pub current: CurrentConditions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub dt: f64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: f64,
    pub humidity: f64,
    pub clouds: f64,
    pub visibility: f64,
    pub wind_speed: f64,
    pub wind_deg: f64,
    pub weather: Vec<ConditionItem>,
}

impl CurrentConditions {
    /// The leading condition. `validate` guarantees there is one.
    pub fn primary(&self) -> Option<&ConditionItem> {
        self.weather.first()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConditionItem {
    pub id: f64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

trait Validate {
    fn validate(&self) -> Result<(), String>;
}

impl Validate for Vec<GeocodeRecord> {
    fn validate(&self) -> Result<(), String> {
        // An empty array is well-formed; "no match" is decided by the geocoder.
        Ok(())
    }
}

impl Validate for OneCallResponse {
    fn validate(&self) -> Result<(), String> {
        if self.current.weather.is_empty() {
            return Err("current.weather must contain at least one item".to_string());
        }
        Ok(())
    }
}

fn parse<T>(schema: Schema, body: &[u8]) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T =
        serde_json::from_slice(body).map_err(|e| ValidationError::new(schema, e.to_string()))?;
    value.validate().map_err(|detail| ValidationError::new(schema, detail))?;
    Ok(value)
}

pub fn parse_geocode(body: &[u8]) -> Result<Vec<GeocodeRecord>, ValidationError> {
    parse(Schema::Geocode, body)
}

pub fn parse_one_call(body: &[u8]) -> Result<OneCallResponse, ValidationError> {
    parse(Schema::Weather, body)
}
