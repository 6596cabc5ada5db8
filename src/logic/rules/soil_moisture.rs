use super::{AdvisoryContext, AdvisoryRule};
use crate::models::{
    IrrigationRecommendation, MoistureStatus, Priority, REASON_MOISTURE_HIGH,
    REASON_MOISTURE_LOW,
};

/// Soil moisture rule - runs after the weather rule and can override it
///
/// - Moisture > 70%: skip, low priority. Duration and volume are left as set.
/// - Moisture < 30%: 45 min, 30 gal, high priority. The skip flag is left as set.
pub struct SoilMoistureRule;

impl AdvisoryRule for SoilMoistureRule {
    fn id(&self) -> &'static str {
        "soil_moisture"
    }

    fn name(&self) -> &'static str {
        "Soil Moisture Adjustment"
    }

    fn apply(
        &self,
        ctx: &AdvisoryContext<'_>,
        current: &IrrigationRecommendation,
    ) -> Option<IrrigationRecommendation> {
        let mut next = current.clone();

        match MoistureStatus::from_moisture(ctx.soil_moisture) {
            MoistureStatus::High => {
                next.recommended = false;
                next.reason = REASON_MOISTURE_HIGH.to_string();
                next.priority = Priority::Low;
            }
            MoistureStatus::Low => {
                next.duration = 45;
                next.water_amount = 30;
                next.reason = REASON_MOISTURE_LOW.to_string();
                next.priority = Priority::High;
            }
            MoistureStatus::Normal => return None,
        }

        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ForecastDay;
    use chrono::NaiveDate;

    fn apply(moisture: u8, current: &IrrigationRecommendation) -> Option<IrrigationRecommendation> {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        let day = ForecastDay::new(date, 75.0, 0.0);
        let ctx = AdvisoryContext {
            date,
            field_id: 1,
            day: &day,
            soil_moisture: moisture,
        };
        SoilMoistureRule.apply(&ctx, current)
    }

    #[test]
    fn saturated_soil_skips_but_keeps_volume() {
        let mut current = IrrigationRecommendation::standard(85);
        current.duration = 40;
        current.water_amount = 25;

        let rec = apply(85, &current).unwrap();
        assert!(!rec.recommended);
        assert_eq!(rec.priority, Priority::Low);
        assert_eq!(rec.reason, REASON_MOISTURE_HIGH);
        assert_eq!(rec.duration, 40);
        assert_eq!(rec.water_amount, 25);
    }

    #[test]
    fn dry_soil_extends_but_keeps_skip_flag() {
        let mut current = IrrigationRecommendation::standard(20);
        current.recommended = false;

        let rec = apply(20, &current).unwrap();
        assert!(!rec.recommended);
        assert_eq!(rec.duration, 45);
        assert_eq!(rec.water_amount, 30);
        assert_eq!(rec.priority, Priority::High);
        assert_eq!(rec.reason, REASON_MOISTURE_LOW);
    }

    #[test]
    fn normal_band_is_inclusive() {
        let current = IrrigationRecommendation::standard(30);
        assert!(apply(30, &current).is_none());
        assert!(apply(70, &current).is_none());
        assert!(apply(29, &current).is_some());
        assert!(apply(71, &current).is_some());
    }
}
