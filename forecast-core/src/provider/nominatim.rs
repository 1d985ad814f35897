use async_trait::async_trait;
use reqwest::{Client, header::USER_AGENT};
use tokio_util::sync::CancellationToken;

use crate::{
    error::WeatherError,
    provider::{GeoResult, Geocoder, status_text, truncate_body, unless_cancelled},
    schema::{self, GeocodeRecord, Schema, ValidationError},
};

/// Forward geocoding through the Nominatim search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    base_url: String,
    user_agent: String,
    http: Client,
}

impl NominatimGeocoder {
    pub fn new(http: Client, base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), user_agent: user_agent.into(), http }
    }

    async fn search(&self, city: &str) -> Result<GeoResult, WeatherError> {
        let res = self
            .http
            .get(&self.base_url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[("q", city), ("format", "json"), ("limit", "1"), ("addressdetails", "1")])
            .send()
            .await
            .map_err(|e| WeatherError::Network(format!("Geocoding request failed: {e}")))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            tracing::warn!(%status, body = %truncate_body(&body), "geocoding request rejected");
            return Err(WeatherError::Network(format!("Geocoding failed: {}", status_text(status))));
        }

        let body = res
            .bytes()
            .await
            .map_err(|e| WeatherError::Network(format!("Failed to read geocoding response: {e}")))?;

        let records = schema::parse_geocode(&body).inspect_err(|e| {
            tracing::warn!(detail = e.detail(), "geocoding payload failed validation");
        })?;

        let record = records
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::NotFound { city: city.to_string() })?;

        let result = to_geo_result(&record, city)?;
        tracing::debug!(city, resolved = %result.name, lat = result.lat, lon = result.lon, "geocoded");
        Ok(result)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(
        &self,
        city: &str,
        cancel: &CancellationToken,
    ) -> Result<GeoResult, WeatherError> {
        unless_cancelled(cancel, self.search(city)).await
    }
}

/// First non-empty of city, town, village, municipality, the record's own
/// name, then the query text.
fn resolve_name(record: &GeocodeRecord, query: &str) -> String {
    let address = record.address.as_ref();

    [
        address.and_then(|a| a.city.as_deref()),
        address.and_then(|a| a.town.as_deref()),
        address.and_then(|a| a.village.as_deref()),
        address.and_then(|a| a.municipality.as_deref()),
        record.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    .find(|candidate| !candidate.is_empty())
    .unwrap_or(query)
    .to_string()
}

fn parse_coordinate(raw: &str, field: &str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ValidationError::new(Schema::Geocode, format!("{field} {raw:?} is not a number")))
}

fn to_geo_result(record: &GeocodeRecord, query: &str) -> Result<GeoResult, ValidationError> {
    Ok(GeoResult {
        lat: parse_coordinate(&record.lat, "lat")?,
        lon: parse_coordinate(&record.lon, "lon")?,
        name: resolve_name(record, query),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GeocodeAddress;

    fn record(name: Option<&str>, address: Option<GeocodeAddress>) -> GeocodeRecord {
        GeocodeRecord {
            place_id: 1.0,
            lat: "39.7817".into(),
            lon: "-89.6501".into(),
            display_name: "Springfield, Sangamon County, Illinois, United States".into(),
            name: name.map(str::to_string),
            address,
        }
    }

    #[test]
    fn city_wins_over_everything() {
        let address = GeocodeAddress {
            city: Some("Springfield".into()),
            town: Some("Town".into()),
            ..Default::default()
        };
        assert_eq!(resolve_name(&record(Some("Name"), Some(address)), "q"), "Springfield");
    }

    #[test]
    fn falls_through_town_village_municipality() {
        let town = GeocodeAddress { town: Some("Oldtown".into()), ..Default::default() };
        assert_eq!(resolve_name(&record(None, Some(town)), "q"), "Oldtown");

        let village = GeocodeAddress { village: Some("Hamlet".into()), ..Default::default() };
        assert_eq!(resolve_name(&record(None, Some(village)), "q"), "Hamlet");

        let muni = GeocodeAddress { municipality: Some("Gemeinde".into()), ..Default::default() };
        assert_eq!(resolve_name(&record(None, Some(muni)), "q"), "Gemeinde");
    }

    #[test]
    fn uses_record_name_without_locality() {
        let address = GeocodeAddress { country: Some("United States".into()), ..Default::default() };
        let rec = record(Some("Greater Springfield"), Some(address));
        assert_eq!(resolve_name(&rec, "springfield"), "Greater Springfield");
    }

    #[test]
    fn empty_strings_are_skipped() {
        let address = GeocodeAddress { city: Some(String::new()), ..Default::default() };
        assert_eq!(resolve_name(&record(Some(""), Some(address)), "springfield"), "springfield");
    }

    #[test]
    fn query_is_the_last_resort() {
        assert_eq!(resolve_name(&record(None, None), "Atlantis"), "Atlantis");
    }

    #[test]
    fn coordinates_are_parsed_from_text() {
        let geo = to_geo_result(&record(Some("Springfield"), None), "q").unwrap();
        assert_eq!(geo.lat, 39.7817);
        assert_eq!(geo.lon, -89.6501);
    }

    #[test]
    fn non_numeric_coordinates_are_rejected() {
        let mut rec = record(None, None);
        rec.lon = "west".into();

        let err = to_geo_result(&rec, "q").unwrap_err();
        assert_eq!(err.schema, Schema::Geocode);
        assert!(err.detail().contains("lon"));
    }
}
