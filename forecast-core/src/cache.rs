use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use parking_lot::Mutex;

use crate::model::WeatherData;

/// Default freshness window.
pub const CACHE_DURATION: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    data: WeatherData,
    timestamp: Instant,
}

/// Time-bounded results keyed by normalized city name.
///
/// Stale entries are only removed when a read finds them. There is no size
/// bound.
#[derive(Debug)]
pub struct WeatherCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl Default for WeatherCache {
    fn default() -> Self {
        Self::new(CACHE_DURATION)
    }
}

impl WeatherCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(HashMap::new()) }
    }

    pub fn key(city: &str) -> String {
        city.trim().to_lowercase()
    }

    pub fn get(&self, city: &str) -> Option<WeatherData> {
        self.get_at(city, Instant::now())
    }

    /// `get` as observed at `now`.
    pub fn get_at(&self, city: &str, now: Instant) -> Option<WeatherData> {
        let key = Self::key(city);
        let mut entries = self.entries.lock();
        let entry = entries.get(&key)?;

        let age = now.saturating_duration_since(entry.timestamp);
        if age < self.ttl {
            tracing::debug!(city, age_secs = age.as_secs(), "cache hit");
            return Some(entry.data.clone());
        }

        tracing::debug!(city, age_secs = age.as_secs(), "cache entry expired");
        entries.remove(&key);
        None
    }

    pub fn put(&self, city: &str, data: WeatherData) {
        self.put_at(city, data, Instant::now());
    }

    pub fn put_at(&self, city: &str, data: WeatherData, now: Instant) {
        self.entries.lock().insert(Self::key(city), CacheEntry { data, timestamp: now });
        tracing::debug!(city, "cache set");
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
        tracing::debug!("cache cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
