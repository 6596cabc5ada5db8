use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Below this percentage soil is considered dry.
pub const MOISTURE_LOW_THRESHOLD: u8 = 30;
/// Above this percentage soil is considered saturated.
pub const MOISTURE_HIGH_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoistureStatus {
    Low,
    Normal,
    High,
}

impl MoistureStatus {
    pub fn from_moisture(moisture: u8) -> Self {
        if moisture < MOISTURE_LOW_THRESHOLD {
            MoistureStatus::Low
        } else if moisture > MOISTURE_HIGH_THRESHOLD {
            MoistureStatus::High
        } else {
            MoistureStatus::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MoistureStatus::Low => "low",
            MoistureStatus::Normal => "normal",
            MoistureStatus::High => "high",
        }
    }
}

impl std::fmt::Display for MoistureStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilMoistureReading {
    pub field_id: i64,
    pub moisture: u8,
    pub status: MoistureStatus,
    pub last_updated: DateTime<Utc>,
}

impl SoilMoistureReading {
    /// Build a reading, clamping `moisture` to 100 and deriving its status.
    pub fn new(field_id: i64, moisture: u8) -> Self {
        let moisture = moisture.min(100);
        Self {
            field_id,
            moisture,
            status: MoistureStatus::from_moisture(moisture),
            last_updated: Utc::now(),
        }
    }
}
