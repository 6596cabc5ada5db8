pub mod fixture;
pub mod openweathermap;

pub use fixture::FixtureWeatherProvider;
pub use openweathermap::OpenWeatherMapProvider;

use crate::error::{FieldOpsError, Result};
use crate::models::ForecastDay;
use async_trait::async_trait;

/// Source of daily forecast records, ordered by date
#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Short label used in logs and status output
    fn name(&self) -> &'static str;

    /// At most `days` records starting today. May return fewer.
    async fn forecast(&self, days: usize) -> Result<Vec<ForecastDay>>;

    /// Today's conditions
    async fn current(&self) -> Result<ForecastDay> {
        self.forecast(1).await?.into_iter().next().ok_or_else(|| {
            FieldOpsError::DataSourceUnavailable(format!("{}: no weather data", self.name()))
        })
    }

    async fn test_connection(&self) -> Result<bool> {
        Ok(true)
    }
}
