use crate::config::{Config, StorageBackend, WeatherProviderKind};
use crate::datasources::{FixtureWeatherProvider, OpenWeatherMapProvider, WeatherProvider};
use crate::db::Database;
use crate::error::{FieldOpsError, Result};
use crate::logic::rules::engine::FORECAST_DAYS;
use crate::logic::{
    FixedMoistureSampler, IrrigationAdvisor, IrrigationScheduler, MoistureSampler,
    RandomMoistureSampler, ScheduleRequest,
};
use crate::models::{
    day_for_date, EventStatus, Field, ForecastDay, IrrigationEvent, IrrigationRecommendation,
    SoilMoistureReading,
};
use crate::store::{seed, EventStore, FieldStore, InMemoryRepository};
use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// Wires the stores, weather provider and advisor together for one session
pub struct App {
    pub config: Config,
    fields: Box<dyn FieldStore>,
    events: Box<dyn EventStore>,
    weather: Box<dyn WeatherProvider>,
    sampler: Box<dyn MoistureSampler>,
    advisor: IrrigationAdvisor,
}

/// Result of scheduling: the stored event plus the advice it was based on
#[derive(Debug, Clone, Serialize)]
pub struct ScheduledIrrigation {
    pub event: IrrigationEvent,
    pub recommendation: IrrigationRecommendation,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionStatus {
    pub storage: bool,
    pub weather: bool,
    pub weather_provider: &'static str,
}

impl ConnectionStatus {
    pub fn all_connected(&self) -> bool {
        self.storage && self.weather
    }
}

impl App {
    pub fn new(
        config: Config,
        fields: Box<dyn FieldStore>,
        events: Box<dyn EventStore>,
        weather: Box<dyn WeatherProvider>,
    ) -> Self {
        Self {
            config,
            fields,
            events,
            weather,
            sampler: Box::new(RandomMoistureSampler),
            advisor: IrrigationAdvisor::new(),
        }
    }

    /// Build stores and the weather provider from configuration
    pub fn from_config(config: Config, data_dir: Option<&PathBuf>) -> Result<Self> {
        let weather = build_weather_provider(&config)?;

        let (fields, events): (Box<dyn FieldStore>, Box<dyn EventStore>) =
            match config.storage.backend {
                StorageBackend::Sqlite => {
                    let db = Database::open(&Config::db_path(data_dir)?)?;
                    if config.storage.seed_fields {
                        seed_database(&db)?;
                    }
                    tracing::info!(path = %db.path().display(), "Using SQLite field storage");
                    let fields: Box<dyn FieldStore> = Box::new(db.clone());
                    let events: Box<dyn EventStore> = Box::new(db);
                    (fields, events)
                }
                StorageBackend::Memory => {
                    let (fields, events) = if config.storage.seed_fields {
                        (seed::bundled_fields()?, seed::bundled_events()?)
                    } else {
                        (Vec::new(), Vec::new())
                    };
                    let fields: Box<dyn FieldStore> =
                        Box::new(InMemoryRepository::with_seed(fields));
                    let events: Box<dyn EventStore> =
                        Box::new(InMemoryRepository::with_seed(events));
                    (fields, events)
                }
            };

        Ok(Self::new(config, fields, events, weather))
    }

    pub fn with_sampler(mut self, sampler: Box<dyn MoistureSampler>) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn weather_provider_name(&self) -> &'static str {
        self.weather.name()
    }

    /// Field to use when none was given on the command line
    pub fn resolve_field_id(&self, field_id: Option<i64>) -> Result<i64> {
        if let Some(id) = field_id.or(self.config.farm.default_field_id) {
            return Ok(id);
        }
        self.fields
            .list()?
            .first()
            .and_then(|f| f.id)
            .ok_or_else(|| FieldOpsError::NotFound("No fields configured".into()))
    }

    pub async fn recommend(
        &self,
        field_id: i64,
        date: NaiveDate,
        moisture: Option<u8>,
    ) -> IrrigationRecommendation {
        match moisture {
            Some(value) => {
                self.advisor
                    .advise(self.weather.as_ref(), date, field_id, &FixedMoistureSampler(value))
                    .await
            }
            None => {
                self.advisor
                    .advise(self.weather.as_ref(), date, field_id, self.sampler.as_ref())
                    .await
            }
        }
    }

    pub async fn schedule(&self, request: ScheduleRequest) -> Result<ScheduledIrrigation> {
        let field = self.fields.get(request.field_id)?;
        if field.is_none() {
            tracing::warn!(field_id = request.field_id, "Scheduling for unknown field");
        }

        let forecast = self.forecast_or_empty().await;
        let recommendation = self.advisor.recommend(
            request.date,
            request.field_id,
            &forecast,
            self.sampler.as_ref(),
        );
        let day = day_for_date(&forecast, request.date);

        let event = IrrigationScheduler::new(self.events.as_ref()).schedule(
            &request,
            field.as_ref(),
            &recommendation,
            day,
        )?;

        Ok(ScheduledIrrigation {
            event,
            recommendation,
        })
    }

    pub fn fields(&self) -> Result<Vec<Field>> {
        self.fields.list()
    }

    pub fn events(
        &self,
        date: Option<NaiveDate>,
        field_id: Option<i64>,
    ) -> Result<Vec<IrrigationEvent>> {
        let events = match (date, field_id) {
            (Some(d), Some(f)) => self
                .events
                .list_by_date(d)?
                .into_iter()
                .filter(|e| e.field_id == f)
                .collect(),
            (Some(d), None) => self.events.list_by_date(d)?,
            (None, Some(f)) => self.events.list_by_field(f)?,
            (None, None) => self.events.list()?,
        };
        Ok(events)
    }

    /// Remove a scheduled event. Completed events are kept as history.
    pub fn cancel(&self, id: i64) -> Result<IrrigationEvent> {
        let event = self
            .events
            .get(id)?
            .ok_or_else(|| FieldOpsError::NotFound(format!("Irrigation event {} not found", id)))?;
        if event.status == EventStatus::Completed {
            return Err(FieldOpsError::InvalidData(format!(
                "Irrigation event {} already completed",
                id
            )));
        }
        self.events.delete(id)
    }

    pub async fn forecast(&self, days: usize) -> Result<Vec<ForecastDay>> {
        self.weather.forecast(days).await
    }

    pub fn soil_moisture(&self, field_id: i64) -> SoilMoistureReading {
        self.sampler.sample(field_id)
    }

    pub async fn check_connections(&self) -> ConnectionStatus {
        let storage = match self.fields.list() {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!("Storage check failed: {}", e);
                false
            }
        };

        let weather = match self.weather.test_connection().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("Weather check failed: {}", e);
                false
            }
        };

        ConnectionStatus {
            storage,
            weather,
            weather_provider: self.weather.name(),
        }
    }

    async fn forecast_or_empty(&self) -> Vec<ForecastDay> {
        match self.weather.forecast(FORECAST_DAYS).await {
            Ok(forecast) => forecast,
            Err(e) => {
                tracing::warn!("Weather forecast unavailable: {}", e);
                Vec::new()
            }
        }
    }
}

/// Load the bundled fields into an empty field table. Sample events only go
/// into an empty event table, so existing history and ids are left alone.
fn seed_database(db: &Database) -> Result<()> {
    if db.count_fields()? > 0 {
        return Ok(());
    }
    let fields = db.seed_fields(&seed::bundled_fields()?)?;

    let events = if db.count_irrigation_events()? == 0 {
        db.seed_irrigation_events(&seed::bundled_events()?)?
    } else {
        0
    };
    tracing::info!(fields, events, "Seeded field storage");
    Ok(())
}

fn build_weather_provider(config: &Config) -> Result<Box<dyn WeatherProvider>> {
    if config.weather.provider == WeatherProviderKind::OpenWeatherMap {
        match config.active_openweathermap() {
            Some(owm) => {
                tracing::info!("OpenWeatherMap provider configured for forecast data");
                return Ok(Box::new(OpenWeatherMapProvider::new(owm.clone())));
            }
            None => {
                tracing::warn!(
                    "OpenWeatherMap selected but not configured - using bundled forecast"
                );
            }
        }
    }

    let provider = match &config.weather.fixture_path {
        Some(path) => FixtureWeatherProvider::from_path(path)?,
        None => FixtureWeatherProvider::bundled()?,
    };
    Ok(Box::new(provider))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, REASON_HEAT, REASON_RAIN};

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn memory_app(moisture: u8) -> App {
        let mut config = Config::default();
        config.storage.backend = StorageBackend::Memory;
        App::from_config(config, None)
            .unwrap()
            .with_sampler(Box::new(FixedMoistureSampler(moisture)))
    }

    #[tokio::test]
    async fn recommend_uses_bundled_forecast() {
        let app = memory_app(50);
        assert_eq!(app.weather_provider_name(), "fixtures");

        let rainy = app.recommend(1, date(12), None).await;
        assert!(!rainy.recommended);
        assert_eq!(rainy.reason, REASON_RAIN);

        let hot = app.recommend(1, date(15), None).await;
        assert_eq!(hot.reason, REASON_HEAT);
        assert_eq!(hot.priority, Priority::High);
    }

    #[tokio::test]
    async fn moisture_override_takes_precedence() {
        let app = memory_app(50);
        let rec = app.recommend(1, date(10), Some(20)).await;
        assert_eq!(rec.duration, 45);
        assert_eq!(rec.soil_moisture, 20);
    }

    #[tokio::test]
    async fn schedule_records_recommendation_and_weather() {
        let app = memory_app(50);
        let scheduled = app
            .schedule(ScheduleRequest::new(4, date(14)))
            .await
            .unwrap();

        assert_eq!(scheduled.event.field_name, "West Field");
        assert_eq!(scheduled.event.duration, scheduled.recommendation.duration);
        assert_eq!(scheduled.event.temperature, Some(88.0));
        assert_eq!(app.events(Some(date(14)), Some(4)).unwrap().len(), 2);
    }

    #[test]
    fn cancel_removes_scheduled_but_not_completed() {
        let app = memory_app(50);
        // Bundled event 1 is completed, event 2 is scheduled
        assert!(matches!(app.cancel(1), Err(FieldOpsError::InvalidData(_))));
        assert_eq!(app.cancel(2).unwrap().id, Some(2));
        assert!(matches!(app.cancel(2), Err(FieldOpsError::NotFound(_))));
    }

    #[test]
    fn resolve_field_prefers_explicit_then_config() {
        let app = memory_app(50);
        assert_eq!(app.resolve_field_id(Some(3)).unwrap(), 3);
        assert_eq!(app.resolve_field_id(None).unwrap(), 1);
    }

    #[test]
    fn soil_moisture_uses_sampler() {
        let app = memory_app(75);
        let reading = app.soil_moisture(2);
        assert_eq!(reading.moisture, 75);
        assert_eq!(reading.field_id, 2);
    }

    #[test]
    fn seeding_fresh_database_loads_fields_and_events() {
        let db = Database::open_in_memory().unwrap();
        seed_database(&db).unwrap();
        assert_eq!(db.count_fields().unwrap(), 4);
        assert_eq!(db.count_irrigation_events().unwrap(), 2);

        // Second run is a no-op
        seed_database(&db).unwrap();
        assert_eq!(db.count_irrigation_events().unwrap(), 2);
    }

    #[test]
    fn seeding_keeps_existing_events() {
        let db = Database::open_in_memory().unwrap();
        let time = chrono::NaiveTime::from_hms_opt(6, 0, 0).unwrap();
        let existing = db
            .create_irrigation_event(&IrrigationEvent::new(4, "West Field", date(14), time))
            .unwrap();
        assert_eq!(existing.id, Some(1));

        seed_database(&db).unwrap();

        assert_eq!(db.count_fields().unwrap(), 4);
        assert_eq!(db.list_irrigation_events().unwrap(), vec![existing]);
    }

    #[tokio::test]
    async fn sqlite_app_opens_after_scheduling_without_seed() {
        let dir = std::env::temp_dir().join(format!("fieldops-seed-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);

        let mut unseeded = Config::default();
        unseeded.storage.seed_fields = false;
        let app = App::from_config(unseeded, Some(&dir))
            .unwrap()
            .with_sampler(Box::new(FixedMoistureSampler(50)));
        let scheduled = app.schedule(ScheduleRequest::new(4, date(14))).await.unwrap();
        assert_eq!(scheduled.event.id, Some(1));
        drop(app);

        let app = App::from_config(Config::default(), Some(&dir)).unwrap();
        assert_eq!(app.fields().unwrap().len(), 4);
        let events = app.events(None, None).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field_name, "Unknown Field");

        drop(app);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn check_connections_with_fixtures() {
        let app = memory_app(50);
        let status = app.check_connections().await;
        assert!(status.all_connected());
        assert_eq!(status.weather_provider, "fixtures");
    }
}
