use thiserror::Error;

use crate::schema::ValidationError;

/// Everything `WeatherService::fetch_weather` can fail with.
///
/// `Display` is the message shown to the user as-is.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// No API key available for the weather provider.
    #[error(
        "OpenWeatherMap API key is not configured. \
         Please set {env_var} in your environment or run `forecast configure`."
    )]
    Config { env_var: String },

    /// Transport failure or a non-2xx status other than 401.
    #[error("{0}")]
    Network(String),

    /// Weather provider rejected the credentials.
    #[error(
        "Invalid API key or One Call API 3.0 subscription required. \
         Please check your API key and ensure you have subscribed to One Call API 3.0."
    )]
    Auth,

    /// Geocoding returned no match.
    #[error("City \"{city}\" not found. Please check the spelling and try again.")]
    NotFound { city: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A newer request superseded this one; the outcome should be discarded.
    #[error("Request was superseded by a newer one")]
    Cancelled,
}

impl WeatherError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WeatherError::Cancelled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn config_error_names_the_variable() {
        let err = WeatherError::Config { env_var: "OPENWEATHER_API_KEY".into() };
        assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
    }

    #[test]
    fn auth_error_mentions_key_and_subscription() {
        let msg = WeatherError::Auth.to_string();
        assert!(msg.contains("API key"));
        assert!(msg.contains("subscri"));
    }

    #[test]
    fn validation_error_hides_parser_detail() {
        let err = WeatherError::from(ValidationError::new(
            Schema::Geocode,
            "invalid type: integer `3`, expected a string at line 1 column 9",
        ));
        assert_eq!(err.to_string(), "Invalid response from geocoding service");
    }

    #[test]
    fn only_cancelled_is_cancelled() {
        assert!(WeatherError::Cancelled.is_cancelled());
        assert!(!WeatherError::Auth.is_cancelled());
        assert!(!WeatherError::NotFound { city: "x".into() }.is_cancelled());
    }
}
