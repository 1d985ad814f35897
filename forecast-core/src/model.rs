use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// UI-facing sky condition, collapsed from the provider's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    Sunny,
    Rainy,
    Snowy,
    Cloudy,
}

impl WeatherCondition {
    /// Map an OpenWeather condition id. First matching rule wins; anything
    /// not matched (clouds, atmosphere, unknown ids) is `Cloudy`.
    pub fn from_code(code: i64) -> Self {
        match code {
            200..=599 => WeatherCondition::Rainy,
            600..=699 => WeatherCondition::Snowy,
            800 => WeatherCondition::Sunny,
            _ => WeatherCondition::Cloudy,
        }
    }

    /// Map a JSON numeric id. Only whole numbers can match a rule, so a
    /// fractional id is `Cloudy`.
    pub fn from_id(id: f64) -> Self {
        if id.fract() == 0.0 {
            Self::from_code(id as i64)
        } else {
            WeatherCondition::Cloudy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Snowy => "snowy",
            WeatherCondition::Cloudy => "cloudy",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized current conditions for one city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherData {
    /// Canonical name resolved by geocoding, not the raw user input.
    pub city: String,
    /// Degrees Celsius.
    pub temperature: i32,
    pub condition: WeatherCondition,
    pub condition_description: String,
    /// Relative humidity, percent.
    pub humidity: u8,
    /// Metres per second, one decimal.
    pub wind_speed: f64,
    pub icon: String,
    pub observed_at: DateTime<Utc>,
}

impl WeatherData {
    pub fn icon_url(&self) -> String {
        format!("https://openweathermap.org/img/wn/{}@2x.png", self.icon)
    }
}

/// Half-up rounding to the nearest integer (`-2.5` becomes `-2`).
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}
