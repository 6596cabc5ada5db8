pub mod memory;
pub mod seed;

pub use memory::InMemoryRepository;

use crate::error::{FieldOpsError, Result};
use crate::models::{EventStatus, Field, IrrigationEvent};
use chrono::NaiveDate;

/// A record with an optional storage-assigned id
pub trait Record: Clone + Send {
    /// Label used in error messages
    const KIND: &'static str;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);

    /// Normalize a record before `create` stores it
    fn prepare_new(&mut self) {}
}

impl Record for Field {
    const KIND: &'static str = "Field";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl Record for IrrigationEvent {
    const KIND: &'static str = "Irrigation event";

    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }

    // New events always start out scheduled
    fn prepare_new(&mut self) {
        self.status = EventStatus::Scheduled;
    }
}

/// CRUD boundary over one record type
pub trait Repository<T>: Send + Sync {
    fn list(&self) -> Result<Vec<T>>;

    fn get(&self, id: i64) -> Result<Option<T>>;

    /// Store a new record and return it with its assigned id
    fn create(&self, record: T) -> Result<T>;

    /// Replace the record stored under `id`. The id is preserved.
    fn update(&self, id: i64, record: T) -> Result<T>;

    /// Remove and return the record stored under `id`
    fn delete(&self, id: i64) -> Result<T>;
}

pub trait FieldStore: Repository<Field> {}

pub trait EventStore: Repository<IrrigationEvent> {
    fn list_by_date(&self, date: NaiveDate) -> Result<Vec<IrrigationEvent>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.date == date)
            .collect())
    }

    fn list_by_field(&self, field_id: i64) -> Result<Vec<IrrigationEvent>> {
        Ok(self
            .list()?
            .into_iter()
            .filter(|e| e.field_id == field_id)
            .collect())
    }
}

/// Ids are positive; anything else is rejected before touching storage.
pub fn validate_id(id: i64) -> Result<i64> {
    if id <= 0 {
        return Err(FieldOpsError::InvalidData("Invalid ID provided".into()));
    }
    Ok(id)
}

pub fn not_found<T: Record>(id: i64) -> FieldOpsError {
    FieldOpsError::NotFound(format!("{} {} not found", T::KIND, id))
}
