pub mod rules;
pub mod sampler;
pub mod scheduler;

pub use rules::IrrigationAdvisor;
pub use sampler::{FixedMoistureSampler, MoistureSampler, RandomMoistureSampler};
pub use scheduler::{IrrigationScheduler, ScheduleRequest};
