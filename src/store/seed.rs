//! Sample records compiled into the binary.

use crate::error::Result;
use crate::models::{Field, IrrigationEvent};

const BUNDLED_FIELDS: &str = include_str!("../../fixtures/fields.json");
const BUNDLED_EVENTS: &str = include_str!("../../fixtures/irrigation.json");

pub fn bundled_fields() -> Result<Vec<Field>> {
    Ok(serde_json::from_str(BUNDLED_FIELDS)?)
}

pub fn bundled_events() -> Result<Vec<IrrigationEvent>> {
    Ok(serde_json::from_str(BUNDLED_EVENTS)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EventStatus, IrrigationType};

    #[test]
    fn bundled_fields_have_ids() {
        let fields = bundled_fields().unwrap();
        assert_eq!(fields.len(), 4);
        assert!(fields.iter().all(|f| f.id.is_some()));
        assert_eq!(fields[0].name, "North Field");
    }

    #[test]
    fn bundled_events_reference_fields() {
        let fields = bundled_fields().unwrap();
        let events = bundled_events().unwrap();
        assert!(!events.is_empty());
        for event in &events {
            assert!(fields.iter().any(|f| f.id == Some(event.field_id)));
        }
        assert_eq!(events[0].status, EventStatus::Completed);
        assert_eq!(events[1].irrigation_type, IrrigationType::Manual);
    }
}
