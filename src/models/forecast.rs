use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily weather record. Forecast sequences are keyed by `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub temperature: f64,   // °F
    pub precipitation: f64, // inches
    pub humidity: f64,      // percent
    pub wind_speed: f64,    // mph
    #[serde(default)]
    pub conditions: WeatherCondition,
}

impl ForecastDay {
    pub fn new(date: NaiveDate, temperature: f64, precipitation: f64) -> Self {
        Self {
            date,
            temperature,
            precipitation: precipitation.max(0.0),
            humidity: 0.0,
            wind_speed: 0.0,
            conditions: WeatherCondition::default(),
        }
    }

    pub fn with_humidity(mut self, humidity: f64) -> Self {
        self.humidity = humidity;
        self
    }

    pub fn with_wind_speed(mut self, wind_speed: f64) -> Self {
        self.wind_speed = wind_speed;
        self
    }

    pub fn with_conditions(mut self, conditions: WeatherCondition) -> Self {
        self.conditions = conditions;
        self
    }
}

/// Pick the record for `date`, falling back to the first record of the sequence.
///
/// Dates beyond the available range silently reuse day-0 conditions.
pub fn day_for_date(forecast: &[ForecastDay], date: NaiveDate) -> Option<&ForecastDay> {
    forecast
        .iter()
        .find(|d| d.date == date)
        .or_else(|| forecast.first())
}

/// Daily weather categories shown alongside forecasts and irrigation events
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum WeatherCondition {
    #[default]
    Sunny,
    Cloudy,
    Rainy,
    Stormy,
    Snowy,
}

impl WeatherCondition {
    pub fn from_owm_id(id: u32) -> Self {
        match id {
            200..=232 => WeatherCondition::Stormy,
            300..=321 | 500..=531 => WeatherCondition::Rainy,
            600..=622 => WeatherCondition::Snowy,
            800 => WeatherCondition::Sunny,
            _ => WeatherCondition::Cloudy,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCondition::Sunny => "sunny",
            WeatherCondition::Cloudy => "cloudy",
            WeatherCondition::Rainy => "rainy",
            WeatherCondition::Stormy => "stormy",
            WeatherCondition::Snowy => "snowy",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sunny" | "clear" => Some(WeatherCondition::Sunny),
            "cloudy" | "clouds" => Some(WeatherCondition::Cloudy),
            "rainy" | "rain" => Some(WeatherCondition::Rainy),
            "stormy" | "thunderstorm" => Some(WeatherCondition::Stormy),
            "snowy" | "snow" => Some(WeatherCondition::Snowy),
            _ => None,
        }
    }

    /// Whether this condition involves precipitation
    pub fn has_precipitation(&self) -> bool {
        matches!(
            self,
            WeatherCondition::Rainy | WeatherCondition::Stormy | WeatherCondition::Snowy
        )
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn weather_condition_from_owm_id() {
        assert_eq!(WeatherCondition::from_owm_id(200), WeatherCondition::Stormy);
        assert_eq!(WeatherCondition::from_owm_id(310), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_owm_id(500), WeatherCondition::Rainy);
        assert_eq!(WeatherCondition::from_owm_id(601), WeatherCondition::Snowy);
        assert_eq!(WeatherCondition::from_owm_id(800), WeatherCondition::Sunny);
        assert_eq!(WeatherCondition::from_owm_id(803), WeatherCondition::Cloudy);
        assert_eq!(WeatherCondition::from_owm_id(741), WeatherCondition::Cloudy);
    }

    #[test]
    fn weather_condition_from_str() {
        assert_eq!(WeatherCondition::from_str("Sunny"), Some(WeatherCondition::Sunny));
        assert_eq!(WeatherCondition::from_str("rain"), Some(WeatherCondition::Rainy));
        assert_eq!(WeatherCondition::from_str("hail"), None);
    }

    #[test]
    fn weather_condition_has_precipitation() {
        assert!(WeatherCondition::Rainy.has_precipitation());
        assert!(WeatherCondition::Stormy.has_precipitation());
        assert!(!WeatherCondition::Sunny.has_precipitation());
        assert!(!WeatherCondition::Cloudy.has_precipitation());
    }

    #[test]
    fn day_for_date_exact_match() {
        let forecast = vec![
            ForecastDay::new(date(10), 72.0, 0.0),
            ForecastDay::new(date(11), 88.0, 0.1),
        ];
        let day = day_for_date(&forecast, date(11)).unwrap();
        assert_eq!(day.temperature, 88.0);
    }

    #[test]
    fn day_for_date_falls_back_to_first() {
        let forecast = vec![
            ForecastDay::new(date(10), 72.0, 0.9),
            ForecastDay::new(date(11), 88.0, 0.1),
        ];
        let day = day_for_date(&forecast, date(30)).unwrap();
        assert_eq!(day.date, date(10));
        assert!(day_for_date(&[], date(10)).is_none());
    }

    #[test]
    fn forecast_day_deserializes_without_conditions() {
        let json = r#"{"date":"2024-06-10","temperature":78.0,"precipitation":0.0,"humidity":65.0,"wind_speed":8.0}"#;
        let day: ForecastDay = serde_json::from_str(json).unwrap();
        assert_eq!(day.conditions, WeatherCondition::Sunny);
        assert_eq!(day.humidity, 65.0);
    }
}
