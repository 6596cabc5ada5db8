pub mod engine;
pub mod soil_moisture;
pub mod weather;

pub use engine::IrrigationAdvisor;

use crate::models::{ForecastDay, IrrigationRecommendation};
use chrono::NaiveDate;

/// Inputs every advisory rule sees for one evaluation
#[derive(Debug, Clone)]
pub struct AdvisoryContext<'a> {
    pub date: NaiveDate,
    pub field_id: i64,
    pub day: &'a ForecastDay,
    pub soil_moisture: u8,
}

/// Trait for irrigation advisory rules
pub trait AdvisoryRule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Adjust the accumulated recommendation, or return `None` to leave it as is
    fn apply(
        &self,
        ctx: &AdvisoryContext<'_>,
        current: &IrrigationRecommendation,
    ) -> Option<IrrigationRecommendation>;
}
