use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    #[default]
    Planted,
    Growing,
    Ready,
    Harvested,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Planted => "planted",
            FieldStatus::Growing => "growing",
            FieldStatus::Ready => "ready",
            FieldStatus::Harvested => "harvested",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "planted" => Some(FieldStatus::Planted),
            "growing" => Some(FieldStatus::Growing),
            "ready" => Some(FieldStatus::Ready),
            "harvested" => Some(FieldStatus::Harvested),
            _ => None,
        }
    }

    pub fn all() -> &'static [FieldStatus] {
        &[
            FieldStatus::Planted,
            FieldStatus::Growing,
            FieldStatus::Ready,
            FieldStatus::Harvested,
        ]
    }
}

impl std::fmt::Display for FieldStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub id: Option<i64>,
    pub name: String,
    pub acres: f64,
    pub crop_type: String,
    pub planting_date: Option<NaiveDate>,
    pub expected_harvest: Option<NaiveDate>,
    #[serde(default)]
    pub status: FieldStatus,
    pub notes: Option<String>,
}

impl Field {
    pub fn new(name: &str, crop_type: &str, acres: f64) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            acres,
            crop_type: crop_type.to_string(),
            planting_date: None,
            expected_harvest: None,
            status: FieldStatus::default(),
            notes: None,
        }
    }

    pub fn with_planting_date(mut self, date: NaiveDate) -> Self {
        self.planting_date = Some(date);
        self
    }

    pub fn with_expected_harvest(mut self, date: NaiveDate) -> Self {
        self.expected_harvest = Some(date);
        self
    }

    pub fn with_status(mut self, status: FieldStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// Days from `today` until the expected harvest. Negative once overdue.
    pub fn days_to_harvest(&self, today: NaiveDate) -> Option<i64> {
        if self.status == FieldStatus::Harvested {
            return None;
        }
        self.expected_harvest
            .map(|harvest| (harvest - today).num_days())
    }
}
