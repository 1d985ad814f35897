//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Nominatim geocoding and OpenWeather One Call clients
//! - Validation of both upstream payloads
//! - A time-bounded result cache
//! - `WeatherService`, which chains the above and cancels superseded requests
//!
//! It is used by `forecast-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod schema;
pub mod service;

pub use cache::{CACHE_DURATION, WeatherCache};
pub use config::Config;
pub use error::WeatherError;
pub use model::{WeatherCondition, WeatherData};
pub use provider::{Geocoder, WeatherSource};
pub use service::WeatherService;
