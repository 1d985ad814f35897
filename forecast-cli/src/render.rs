use chrono::Local;
use forecast_core::{WeatherCondition, WeatherData};

fn glyph(condition: WeatherCondition) -> &'static str {
    match condition {
        WeatherCondition::Sunny => "☀",
        WeatherCondition::Rainy => "☂",
        WeatherCondition::Snowy => "❄",
        WeatherCondition::Cloudy => "☁",
    }
}

/// Multi-line card for one lookup.
pub fn weather_card(data: &WeatherData) -> String {
    let observed = data.observed_at.with_timezone(&Local).format("%Y-%m-%d %H:%M");

    format!(
        "{city}\n\
         {glyph} {temp}°C  {description}\n\
         Humidity: {humidity}%\n\
         Wind:     {wind:.1} m/s\n\
         Icon:     {icon} ({icon_url})\n\
         Observed: {observed}",
        city = data.city,
        glyph = glyph(data.condition),
        temp = data.temperature,
        description = data.condition_description,
        humidity = data.humidity,
        wind = data.wind_speed,
        icon = data.icon,
        icon_url = data.icon_url(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    #[test]
    fn card_shows_every_field() {
        let data = WeatherData {
            city: "Paris".into(),
            temperature: 22,
            condition: WeatherCondition::Sunny,
            condition_description: "clear sky".into(),
            humidity: 40,
            wind_speed: 3.0,
            icon: "01d".into(),
            observed_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default(),
        };

        let card = weather_card(&data);
        assert!(card.starts_with("Paris\n"));
        assert!(card.contains("☀ 22°C  clear sky"));
        assert!(card.contains("Humidity: 40%"));
        assert!(card.contains("Wind:     3.0 m/s"));
        assert!(card.contains("https://openweathermap.org/img/wn/01d@2x.png"));
    }
}
