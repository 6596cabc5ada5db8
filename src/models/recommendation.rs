use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const REASON_STANDARD: &str = "Standard irrigation cycle";
pub const REASON_RAIN: &str = "Rain expected - irrigation not needed";
pub const REASON_HEAT: &str = "High temperature - early and extended irrigation recommended";
pub const REASON_COOL: &str = "Cool conditions - reduced irrigation needed";
pub const REASON_MOISTURE_HIGH: &str = "Soil moisture adequate - skip irrigation";
pub const REASON_MOISTURE_LOW: &str = "Low soil moisture - extended irrigation needed";

/// Soil moisture reported by the fallback recommendation.
pub const FALLBACK_SOIL_MOISTURE: u8 = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Priority::Low => "→",
            Priority::Medium => "⚠",
            Priority::High => "!",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Watering advice for one field on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrigationRecommendation {
    pub recommended: bool,
    #[serde(with = "super::time_format")]
    pub best_time: NaiveTime,
    pub duration: u32,     // minutes
    pub water_amount: u32, // gallons
    pub reason: String,
    pub soil_moisture: u8,
    pub priority: Priority,
}

impl IrrigationRecommendation {
    /// The standard cycle every evaluation starts from.
    pub fn standard(soil_moisture: u8) -> Self {
        Self {
            recommended: true,
            best_time: NaiveTime::from_hms_opt(6, 0, 0).unwrap_or_default(),
            duration: 30,
            water_amount: 15,
            reason: REASON_STANDARD.to_string(),
            soil_moisture,
            priority: Priority::Medium,
        }
    }

    /// Fixed answer used when no weather data can be obtained.
    pub fn fallback() -> Self {
        Self::standard(FALLBACK_SOIL_MOISTURE)
    }

    pub fn is_fallback(&self) -> bool {
        *self == Self::fallback()
    }

    pub fn summary(&self) -> String {
        if self.recommended {
            format!(
                "Water at {} for {} min ({} gal)",
                super::time_format::format(&self.best_time),
                self.duration,
                self.water_amount
            )
        } else {
            "Skip irrigation".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_matches_fixed_values() {
        let rec = IrrigationRecommendation::fallback();
        assert!(rec.recommended);
        assert_eq!(rec.best_time, NaiveTime::from_hms_opt(6, 0, 0).unwrap());
        assert_eq!(rec.duration, 30);
        assert_eq!(rec.water_amount, 15);
        assert_eq!(rec.reason, "Standard irrigation cycle");
        assert_eq!(rec.soil_moisture, 50);
        assert_eq!(rec.priority, Priority::Medium);
        assert!(rec.is_fallback());
    }

    #[test]
    fn serializes_time_as_hours_and_minutes() {
        let rec = IrrigationRecommendation::fallback();
        let value = serde_json::to_value(&rec).unwrap();
        assert_eq!(value["best_time"], "06:00");
        assert_eq!(value["priority"], "medium");

        let back: IrrigationRecommendation = serde_json::from_value(value).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn summary_text() {
        let mut rec = IrrigationRecommendation::standard(40);
        assert_eq!(rec.summary(), "Water at 06:00 for 30 min (15 gal)");
        rec.recommended = false;
        assert_eq!(rec.summary(), "Skip irrigation");
    }

    #[test]
    fn priority_ordering() {
        assert!(Priority::High > Priority::Medium);
        assert!(Priority::Medium > Priority::Low);
    }
}
