use crate::models::{SoilMoistureReading, MOISTURE_HIGH_THRESHOLD, MOISTURE_LOW_THRESHOLD};
use rand::Rng;

/// Source of soil-moisture percentages for a field.
///
/// Any `Fn(i64) -> u8` closure is a sampler as well.
pub trait MoistureSampler: Send + Sync {
    fn sample_moisture(&self, field_id: i64) -> u8;

    fn sample(&self, field_id: i64) -> SoilMoistureReading {
        SoilMoistureReading::new(field_id, self.sample_moisture(field_id))
    }
}

impl<F> MoistureSampler for F
where
    F: Fn(i64) -> u8 + Send + Sync,
{
    fn sample_moisture(&self, field_id: i64) -> u8 {
        self(field_id)
    }
}

/// Simulated probe: uniform draw in [30, 70)
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomMoistureSampler;

impl MoistureSampler for RandomMoistureSampler {
    fn sample_moisture(&self, _field_id: i64) -> u8 {
        rand::thread_rng().gen_range(MOISTURE_LOW_THRESHOLD..MOISTURE_HIGH_THRESHOLD)
    }
}

/// Always reports the same percentage
#[derive(Debug, Clone, Copy)]
pub struct FixedMoistureSampler(pub u8);

impl MoistureSampler for FixedMoistureSampler {
    fn sample_moisture(&self, _field_id: i64) -> u8 {
        self.0
    }
}
