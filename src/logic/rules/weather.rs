use super::{AdvisoryContext, AdvisoryRule};
use crate::models::{
    IrrigationRecommendation, Priority, REASON_COOL, REASON_HEAT, REASON_RAIN,
};
use chrono::NaiveTime;

/// Rain (inches) above which watering is skipped.
pub const RAIN_SKIP_INCHES: f64 = 0.5;
/// Temperature (°F) above which the cycle starts early and runs longer.
pub const HOT_TEMP_F: f64 = 85.0;
/// Temperature (°F) below which the cycle is shortened.
pub const COOL_TEMP_F: f64 = 70.0;

/// Weather rule - adjusts the cycle for the selected forecast day
///
/// First match wins:
/// - Rain > 0.5": skip, low priority
/// - High > 85°F: 05:30 start, 40 min, 25 gal, high priority
/// - High < 70°F: 20 min, 10 gal, priority unchanged
pub struct WeatherRule;

impl AdvisoryRule for WeatherRule {
    fn id(&self) -> &'static str {
        "weather"
    }

    fn name(&self) -> &'static str {
        "Weather Adjustment"
    }

    fn apply(
        &self,
        ctx: &AdvisoryContext<'_>,
        current: &IrrigationRecommendation,
    ) -> Option<IrrigationRecommendation> {
        let day = ctx.day;
        let mut next = current.clone();

        if day.precipitation > RAIN_SKIP_INCHES {
            next.recommended = false;
            next.reason = REASON_RAIN.to_string();
            next.priority = Priority::Low;
        } else if day.temperature > HOT_TEMP_F {
            next.best_time = NaiveTime::from_hms_opt(5, 30, 0).unwrap_or(current.best_time);
            next.duration = 40;
            next.water_amount = 25;
            next.reason = REASON_HEAT.to_string();
            next.priority = Priority::High;
        } else if day.temperature < COOL_TEMP_F {
            next.duration = 20;
            next.water_amount = 10;
            next.reason = REASON_COOL.to_string();
        } else {
            return None;
        }

        Some(next)
    }
}
