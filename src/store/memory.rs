use super::{not_found, validate_id, EventStore, FieldStore, Record, Repository};
use crate::error::{FieldOpsError, Result};
use crate::models::{Field, IrrigationEvent};
use std::sync::{Arc, Mutex, MutexGuard};

struct Inner<T> {
    records: Vec<T>,
    next_id: i64,
}

/// Repository held in memory. Clones share the same records.
pub struct InMemoryRepository<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self::with_seed(Vec::new())
    }

    /// Start from `seed`. Records without an id are numbered after the highest seeded id.
    pub fn with_seed(seed: Vec<T>) -> Self {
        let mut next_id = seed.iter().filter_map(Record::id).max().unwrap_or(0) + 1;
        let records = seed
            .into_iter()
            .map(|mut record| {
                if record.id().is_none() {
                    record.set_id(next_id);
                    next_id += 1;
                }
                record
            })
            .collect();

        Self {
            inner: Arc::new(Mutex::new(Inner { records, next_id })),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner<T>>> {
        self.inner
            .lock()
            .map_err(|_| FieldOpsError::Storage(format!("{} store lock poisoned", T::KIND)))
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for InMemoryRepository<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn list(&self) -> Result<Vec<T>> {
        Ok(self.lock()?.records.clone())
    }

    fn get(&self, id: i64) -> Result<Option<T>> {
        let id = validate_id(id)?;
        Ok(self
            .lock()?
            .records
            .iter()
            .find(|r| r.id() == Some(id))
            .cloned())
    }

    fn create(&self, mut record: T) -> Result<T> {
        record.prepare_new();
        let mut inner = self.lock()?;
        let id = inner
            .records
            .iter()
            .filter_map(Record::id)
            .max()
            .map_or(inner.next_id, |max| (max + 1).max(inner.next_id));
        record.set_id(id);
        inner.next_id = id + 1;
        inner.records.push(record.clone());
        tracing::debug!(id, kind = T::KIND, "Record created");
        Ok(record)
    }

    fn update(&self, id: i64, mut record: T) -> Result<T> {
        let id = validate_id(id)?;
        let mut inner = self.lock()?;
        let slot = inner
            .records
            .iter_mut()
            .find(|r| r.id() == Some(id))
            .ok_or_else(|| not_found::<T>(id))?;
        record.set_id(id);
        *slot = record.clone();
        Ok(record)
    }

    fn delete(&self, id: i64) -> Result<T> {
        let id = validate_id(id)?;
        let mut inner = self.lock()?;
        let index = inner
            .records
            .iter()
            .position(|r| r.id() == Some(id))
            .ok_or_else(|| not_found::<T>(id))?;
        Ok(inner.records.remove(index))
    }
}

impl FieldStore for InMemoryRepository<Field> {}

impl EventStore for InMemoryRepository<IrrigationEvent> {}
