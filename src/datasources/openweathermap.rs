use super::WeatherProvider;
use crate::config::OpenWeatherMapConfig;
use crate::error::{FieldOpsError, Result};
use crate::models::{ForecastDay, WeatherCondition};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::collections::BTreeMap;

const API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const MM_PER_INCH: f64 = 25.4;

pub struct OpenWeatherMapProvider {
    client: reqwest::Client,
    config: OpenWeatherMapConfig,
}

// OpenWeatherMap API response structures
#[derive(Debug, Deserialize)]
struct OwmForecastResponse {
    list: Vec<OwmForecastItem>,
}

#[derive(Debug, Deserialize)]
struct OwmForecastItem {
    dt: i64,
    main: OwmMain,
    weather: Vec<OwmWeather>,
    wind: OwmWind,
    #[serde(default)]
    rain: Option<OwmPrecipitation>,
    #[serde(default)]
    snow: Option<OwmPrecipitation>,
}

#[derive(Debug, Deserialize)]
struct OwmMain {
    temp: f64,
    humidity: f64,
}

#[derive(Debug, Deserialize)]
struct OwmWeather {
    id: u32,
}

#[derive(Debug, Deserialize)]
struct OwmWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwmPrecipitation {
    #[serde(rename = "3h", default)]
    three_hour: f64,
}

/// One 3-hour forecast point, already in imperial units
#[derive(Debug, Clone)]
struct ForecastPoint {
    date: NaiveDate,
    temp_f: f64,
    humidity_percent: f64,
    precipitation_mm: f64,
    wind_speed_mph: f64,
    condition: WeatherCondition,
}

impl OpenWeatherMapProvider {
    pub fn new(config: OpenWeatherMapConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    /// Transport failures surface as `Http`; status handling is left to the caller
    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        Ok(self.client.get(url).send().await?)
    }

    /// Fetch the 5-day/3-hour forecast and collapse it into daily records
    pub async fn fetch_forecast(&self) -> Result<Vec<ForecastDay>> {
        let url = format!(
            "{}/forecast?lat={}&lon={}&appid={}&units=imperial",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response = self.get(&url).await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(FieldOpsError::DataSourceUnavailable(format!(
                "OpenWeatherMap returned {}: {}",
                status, body
            )));
        }

        let owm_response: OwmForecastResponse = response.json().await.map_err(|e| {
            FieldOpsError::DataSourceUnavailable(format!(
                "Failed to parse OpenWeatherMap response: {}",
                e
            ))
        })?;

        Ok(convert_response(owm_response))
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    fn name(&self) -> &'static str {
        "openweathermap"
    }

    async fn forecast(&self, days: usize) -> Result<Vec<ForecastDay>> {
        let mut forecast = self.fetch_forecast().await?;
        forecast.truncate(days);
        Ok(forecast)
    }

    async fn test_connection(&self) -> Result<bool> {
        let url = format!(
            "{}/weather?lat={}&lon={}&appid={}&units=imperial",
            API_BASE_URL, self.config.latitude, self.config.longitude, self.config.api_key
        );

        let response = self.get(&url).await?;

        Ok(response.status().is_success())
    }
}

fn convert_response(response: OwmForecastResponse) -> Vec<ForecastDay> {
    let points: Vec<ForecastPoint> = response
        .list
        .iter()
        .filter_map(convert_forecast_item)
        .collect();

    aggregate_daily(&points)
}

fn convert_forecast_item(item: &OwmForecastItem) -> Option<ForecastPoint> {
    let timestamp = DateTime::from_timestamp(item.dt, 0)?;

    let condition = item
        .weather
        .first()
        .map(|w| WeatherCondition::from_owm_id(w.id))
        .unwrap_or_default();

    // Combine rain and snow precipitation
    let rain_mm = item.rain.as_ref().map(|r| r.three_hour).unwrap_or(0.0);
    let snow_mm = item.snow.as_ref().map(|s| s.three_hour).unwrap_or(0.0);

    Some(ForecastPoint {
        date: timestamp.date_naive(),
        temp_f: item.main.temp,
        humidity_percent: item.main.humidity,
        precipitation_mm: rain_mm + snow_mm,
        wind_speed_mph: item.wind.speed,
        condition,
    })
}

fn aggregate_daily(points: &[ForecastPoint]) -> Vec<ForecastDay> {
    let mut by_date: BTreeMap<NaiveDate, Vec<&ForecastPoint>> = BTreeMap::new();
    for point in points {
        by_date.entry(point.date).or_default().push(point);
    }

    by_date
        .into_iter()
        .map(|(date, points)| aggregate_day(date, &points))
        .collect()
}

fn aggregate_day(date: NaiveDate, points: &[&ForecastPoint]) -> ForecastDay {
    let count = points.len().max(1) as f64;

    let high_temp_f = points
        .iter()
        .map(|p| p.temp_f)
        .fold(f64::NEG_INFINITY, f64::max);

    let avg_humidity = points.iter().map(|p| p.humidity_percent).sum::<f64>() / count;
    let avg_wind_speed = points.iter().map(|p| p.wind_speed_mph).sum::<f64>() / count;
    let total_precipitation_mm: f64 = points.iter().map(|p| p.precipitation_mm).sum();

    // Most frequent condition; ties go to the wetter one, then the later variant
    let mut condition_counts: BTreeMap<WeatherCondition, usize> = BTreeMap::new();
    for point in points {
        *condition_counts.entry(point.condition).or_insert(0) += 1;
    }
    let dominant_condition = condition_counts
        .into_iter()
        .max_by_key(|(condition, count)| (*count, condition.has_precipitation(), *condition))
        .map(|(condition, _)| condition)
        .unwrap_or_default();

    ForecastDay::new(
        date,
        if high_temp_f.is_finite() { high_temp_f } else { 0.0 },
        total_precipitation_mm / MM_PER_INCH,
    )
    .with_humidity(avg_humidity)
    .with_wind_speed(avg_wind_speed)
    .with_conditions(dominant_condition)
}
