use super::WeatherCondition;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IrrigationType {
    #[default]
    Automatic,
    Manual,
}

impl IrrigationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IrrigationType::Automatic => "automatic",
            IrrigationType::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "automatic" | "auto" => Some(IrrigationType::Automatic),
            "manual" => Some(IrrigationType::Manual),
            _ => None,
        }
    }
}

impl std::fmt::Display for IrrigationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Scheduled => "scheduled",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "scheduled" => Some(EventStatus::Scheduled),
            "completed" => Some(EventStatus::Completed),
            "cancelled" | "canceled" => Some(EventStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A watering session planned (or carried out) on one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IrrigationEvent {
    pub id: Option<i64>,
    pub field_id: i64,
    pub field_name: String,
    pub date: NaiveDate,
    #[serde(with = "super::time_format")]
    pub time: NaiveTime,
    pub duration: u32,     // minutes
    pub water_amount: u32, // gallons
    #[serde(default)]
    pub irrigation_type: IrrigationType,
    #[serde(default)]
    pub status: EventStatus,
    pub soil_moisture: u8,
    pub weather_condition: Option<WeatherCondition>,
    pub temperature: Option<f64>,
    pub notes: Option<String>,
}

impl IrrigationEvent {
    pub fn new(field_id: i64, field_name: &str, date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            id: None,
            field_id,
            field_name: field_name.to_string(),
            date,
            time,
            duration: 30,
            water_amount: 15,
            irrigation_type: IrrigationType::default(),
            status: EventStatus::Scheduled,
            soil_moisture: super::FALLBACK_SOIL_MOISTURE,
            weather_condition: None,
            temperature: None,
            notes: None,
        }
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = minutes;
        self
    }

    pub fn with_water_amount(mut self, gallons: u32) -> Self {
        self.water_amount = gallons;
        self
    }

    pub fn with_type(mut self, irrigation_type: IrrigationType) -> Self {
        self.irrigation_type = irrigation_type;
        self
    }

    pub fn with_soil_moisture(mut self, moisture: u8) -> Self {
        self.soil_moisture = moisture.min(100);
        self
    }

    pub fn with_weather(mut self, condition: WeatherCondition, temperature: f64) -> Self {
        self.weather_condition = Some(condition);
        self.temperature = Some(temperature);
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    pub fn is_pending(&self) -> bool {
        self.status == EventStatus::Scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn irrigation_type_from_str() {
        assert_eq!(IrrigationType::from_str("Automatic"), Some(IrrigationType::Automatic));
        assert_eq!(IrrigationType::from_str("auto"), Some(IrrigationType::Automatic));
        assert_eq!(IrrigationType::from_str("manual"), Some(IrrigationType::Manual));
        assert_eq!(IrrigationType::from_str("sprinkler"), None);
    }

    #[test]
    fn event_status_accepts_both_spellings() {
        assert_eq!(EventStatus::from_str("cancelled"), Some(EventStatus::Cancelled));
        assert_eq!(EventStatus::from_str("canceled"), Some(EventStatus::Cancelled));
        assert_eq!(EventStatus::from_str("done"), None);
    }

    #[test]
    fn new_event_is_scheduled() {
        let event = IrrigationEvent::new(
            2,
            "South Field",
            NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            NaiveTime::from_hms_opt(5, 30, 0).unwrap(),
        )
        .with_duration(40)
        .with_water_amount(25)
        .with_type(IrrigationType::Manual)
        .with_soil_moisture(180)
        .with_weather(WeatherCondition::Sunny, 91.0)
        .with_notes("Check the east valve");

        assert!(event.is_pending());
        assert_eq!(event.duration, 40);
        assert_eq!(event.water_amount, 25);
        assert_eq!(event.irrigation_type, IrrigationType::Manual);
        assert_eq!(event.soil_moisture, 100);
        assert_eq!(event.weather_condition, Some(WeatherCondition::Sunny));
        assert_eq!(event.temperature, Some(91.0));
    }

    #[test]
    fn event_json_uses_hours_and_minutes() {
        let event = IrrigationEvent::new(
            1,
            "North Field",
            NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
            NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
        );
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["time"], "06:00");
        assert_eq!(value["status"], "scheduled");
        assert_eq!(value["irrigation_type"], "automatic");
    }
}
