use crate::error::{FieldOpsError, Result};
use crate::models::{
    Field, ForecastDay, IrrigationEvent, IrrigationRecommendation, IrrigationType,
    WeatherCondition,
};
use crate::store::EventStore;
use chrono::{NaiveDate, NaiveTime};

/// Temperature recorded on an event when the day's forecast is missing.
pub const DEFAULT_EVENT_TEMP_F: f64 = 75.0;

/// What the user asked for when scheduling. `None` keeps the recommended value.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRequest {
    pub field_id: i64,
    pub date: NaiveDate,
    pub time: Option<NaiveTime>,
    pub duration: Option<u32>,
    pub water_amount: Option<u32>,
    pub irrigation_type: IrrigationType,
    pub notes: Option<String>,
}

impl ScheduleRequest {
    pub fn new(field_id: i64, date: NaiveDate) -> Self {
        Self {
            field_id,
            date,
            ..Default::default()
        }
    }
}

/// Turns recommendations into persisted irrigation events
pub struct IrrigationScheduler<'a, E: EventStore + ?Sized> {
    events: &'a E,
}

impl<'a, E: EventStore + ?Sized> IrrigationScheduler<'a, E> {
    pub fn new(events: &'a E) -> Self {
        Self { events }
    }

    pub fn schedule(
        &self,
        request: &ScheduleRequest,
        field: Option<&Field>,
        recommendation: &IrrigationRecommendation,
        day: Option<&ForecastDay>,
    ) -> Result<IrrigationEvent> {
        let event = build_event(request, field, recommendation, day)?;
        let created = self.events.create(event)?;
        tracing::info!(
            id = created.id,
            field_id = created.field_id,
            date = %created.date,
            "Irrigation scheduled"
        );
        Ok(created)
    }
}

/// Combine a recommendation with the user's overrides into a new scheduled event.
pub fn build_event(
    request: &ScheduleRequest,
    field: Option<&Field>,
    recommendation: &IrrigationRecommendation,
    day: Option<&ForecastDay>,
) -> Result<IrrigationEvent> {
    let duration = request.duration.unwrap_or(recommendation.duration);
    if duration == 0 {
        return Err(FieldOpsError::InvalidData(
            "Duration must be at least one minute".into(),
        ));
    }

    let water_amount = request.water_amount.unwrap_or(recommendation.water_amount);
    if water_amount == 0 {
        return Err(FieldOpsError::InvalidData(
            "Water amount must be at least one gallon".into(),
        ));
    }

    let field_name = field.map(|f| f.name.as_str()).unwrap_or("Unknown Field");
    let time = request.time.unwrap_or(recommendation.best_time);

    let (condition, temperature) = match day {
        Some(d) if d.date == request.date => (Some(d.conditions), d.temperature),
        _ => (None, DEFAULT_EVENT_TEMP_F),
    };

    let mut event = IrrigationEvent::new(request.field_id, field_name, request.date, time)
        .with_duration(duration)
        .with_water_amount(water_amount)
        .with_type(request.irrigation_type)
        .with_soil_moisture(recommendation.soil_moisture);
    event.weather_condition = condition;
    event.temperature = Some(temperature);
    if let Some(notes) = request.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        event = event.with_notes(notes);
    }

    Ok(event)
}

/// Condition label for display; `unknown` when the event has none recorded.
pub fn condition_label(condition: Option<WeatherCondition>) -> &'static str {
    condition.map(|c| c.as_str()).unwrap_or("unknown")
}
