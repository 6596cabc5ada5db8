use super::{soil_moisture::SoilMoistureRule, weather::WeatherRule, AdvisoryContext, AdvisoryRule};
use crate::datasources::WeatherProvider;
use crate::logic::sampler::MoistureSampler;
use crate::models::{day_for_date, ForecastDay, IrrigationRecommendation};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Days of forecast requested from a provider per recommendation.
pub const FORECAST_DAYS: usize = 7;

/// Irrigation advisor: runs the advisory rules, in order, over the standard cycle.
///
/// Later rules see the output of earlier ones, so the soil moisture rule can
/// override the weather rule's flag, reason and priority.
pub struct IrrigationAdvisor {
    rules: Vec<Box<dyn AdvisoryRule>>,
}

impl IrrigationAdvisor {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn AdvisoryRule>> = vec![Box::new(WeatherRule), Box::new(SoilMoistureRule)];

        Self { rules }
    }

    /// Recommend watering for `field_id` on `date` from an already fetched forecast.
    ///
    /// Uses the forecast entry for `date`, or the first entry when the date is
    /// not covered. An empty forecast yields the fixed fallback.
    pub fn recommend<S>(
        &self,
        date: NaiveDate,
        field_id: i64,
        forecast: &[ForecastDay],
        sampler: &S,
    ) -> IrrigationRecommendation
    where
        S: MoistureSampler + ?Sized,
    {
        let Some(day) = day_for_date(forecast, date) else {
            debug!(%date, field_id, "No forecast entries, using fallback recommendation");
            return IrrigationRecommendation::fallback();
        };

        if day.date != date {
            debug!(%date, substitute = %day.date, "No forecast for date, using first day");
        }

        let ctx = AdvisoryContext {
            date,
            field_id,
            day,
            soil_moisture: sampler.sample_moisture(field_id).min(100),
        };
        self.evaluate(&ctx)
    }

    /// Fetch the forecast from `provider` and recommend. Never fails: provider
    /// errors produce the fixed fallback.
    pub async fn advise<P, S>(
        &self,
        provider: &P,
        date: NaiveDate,
        field_id: i64,
        sampler: &S,
    ) -> IrrigationRecommendation
    where
        P: WeatherProvider + ?Sized,
        S: MoistureSampler + ?Sized,
    {
        match provider.forecast(FORECAST_DAYS).await {
            Ok(forecast) => self.recommend(date, field_id, &forecast, sampler),
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    "Weather forecast unavailable, using fallback recommendation: {}", e
                );
                IrrigationRecommendation::fallback()
            }
        }
    }

    pub fn evaluate(&self, ctx: &AdvisoryContext<'_>) -> IrrigationRecommendation {
        let seed = IrrigationRecommendation::standard(ctx.soil_moisture);

        self.rules
            .iter()
            .fold(seed, |current, rule| match rule.apply(ctx, &current) {
                Some(next) => {
                    debug!(rule = rule.id(), reason = %next.reason, "Advisory rule applied");
                    next
                }
                None => current,
            })
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for IrrigationAdvisor {
    fn default() -> Self {
        Self::new()
    }
}
