use super::WeatherProvider;
use crate::error::Result;
use crate::models::ForecastDay;
use async_trait::async_trait;
use std::path::Path;

const BUNDLED_WEATHER: &str = include_str!("../../fixtures/weather.json");

/// Weather provider backed by a static list of daily records
#[derive(Debug, Clone)]
pub struct FixtureWeatherProvider {
    days: Vec<ForecastDay>,
}

impl FixtureWeatherProvider {
    pub fn new(mut days: Vec<ForecastDay>) -> Self {
        days.sort_by_key(|d| d.date);
        Self { days }
    }

    /// Records compiled into the binary
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_WEATHER)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let days: Vec<ForecastDay> = serde_json::from_str(json)?;
        Ok(Self::new(days))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "Loading weather fixtures");
        Self::from_json(&json)
    }

    pub fn all(&self) -> &[ForecastDay] {
        &self.days
    }
}

#[async_trait]
impl WeatherProvider for FixtureWeatherProvider {
    fn name(&self) -> &'static str {
        "fixtures"
    }

    async fn forecast(&self, days: usize) -> Result<Vec<ForecastDay>> {
        Ok(self.days.iter().take(days).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldOpsError;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    #[test]
    fn bundled_fixtures_parse() {
        let provider = FixtureWeatherProvider::bundled().unwrap();
        assert!(provider.all().len() >= 7);
        assert!(provider.all().windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn invalid_json_is_an_error() {
        let err = FixtureWeatherProvider::from_json("{not json").unwrap_err();
        assert!(matches!(err, FieldOpsError::Json(_)));
    }

    #[tokio::test]
    async fn forecast_is_truncated_to_days() {
        let provider = FixtureWeatherProvider::new(vec![
            ForecastDay::new(date(12), 80.0, 0.0),
            ForecastDay::new(date(10), 70.0, 0.0),
            ForecastDay::new(date(11), 75.0, 0.0),
        ]);
        let forecast = provider.forecast(2).await.unwrap();
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast[0].date, date(10));
        assert_eq!(forecast[1].date, date(11));

        let all = provider.forecast(30).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn current_is_first_day() {
        let provider = FixtureWeatherProvider::new(vec![
            ForecastDay::new(date(11), 75.0, 0.0),
            ForecastDay::new(date(10), 70.0, 0.0),
        ]);
        assert_eq!(provider.current().await.unwrap().date, date(10));
    }

    #[tokio::test]
    async fn current_without_data_is_unavailable() {
        let provider = FixtureWeatherProvider::new(Vec::new());
        let err = provider.current().await.unwrap_err();
        assert!(matches!(err, FieldOpsError::DataSourceUnavailable(_)));
    }
}
