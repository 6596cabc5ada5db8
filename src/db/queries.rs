use crate::db::Database;
use crate::error::Result;
use crate::models::{
    time_format, EventStatus, Field, FieldStatus, IrrigationEvent, IrrigationType,
    WeatherCondition,
};
use crate::store::{not_found, validate_id, EventStore, FieldStore, Record, Repository};
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

const DATE_FORMAT: &str = "%Y-%m-%d";

// Field Queries

impl Database {
    pub fn list_fields(&self) -> Result<Vec<Field>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM fields ORDER BY id")?;
            let fields = stmt
                .query_map([], row_to_field)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(fields)
        })
    }

    pub fn get_field(&self, id: i64) -> Result<Option<Field>> {
        let id = validate_id(id)?;
        self.with_conn(|conn| fetch_field(conn, id))
    }

    pub fn create_field(&self, field: &Field) -> Result<Field> {
        self.with_conn(|conn| {
            insert_field(conn, None, field)?;
            let id = conn.last_insert_rowid();
            tracing::info!(id, name = %field.name, "Field created");
            Ok(Field {
                id: Some(id),
                ..field.clone()
            })
        })
    }

    pub fn update_field(&self, id: i64, field: &Field) -> Result<Field> {
        let id = validate_id(id)?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                r#"
                UPDATE fields SET
                    name = ?1, acres = ?2, crop_type = ?3, planting_date = ?4,
                    expected_harvest = ?5, status = ?6, notes = ?7
                WHERE id = ?8
                "#,
                params![
                    field.name,
                    field.acres,
                    field.crop_type,
                    field.planting_date.map(format_date),
                    field.expected_harvest.map(format_date),
                    field.status.as_str(),
                    field.notes,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(not_found::<Field>(id));
            }
            Ok(Field {
                id: Some(id),
                ..field.clone()
            })
        })
    }

    pub fn delete_field(&self, id: i64) -> Result<Field> {
        let id = validate_id(id)?;
        self.with_conn(|conn| {
            let field = fetch_field(conn, id)?.ok_or_else(|| not_found::<Field>(id))?;
            conn.execute("DELETE FROM fields WHERE id = ?1", [id])?;
            Ok(field)
        })
    }

    pub fn count_fields(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM fields", [], |row| row.get(0))?)
        })
    }

    /// Insert `fields` keeping their ids. Returns the number inserted.
    pub fn seed_fields(&self, fields: &[Field]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for field in fields {
                insert_field(&tx, field.id, field)?;
            }
            tx.commit()?;
            tracing::info!(count = fields.len(), "Seeded fields");
            Ok(fields.len())
        })
    }
}

fn insert_field(conn: &Connection, id: Option<i64>, field: &Field) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO fields
            (id, name, acres, crop_type, planting_date, expected_harvest, status, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            id,
            field.name,
            field.acres,
            field.crop_type,
            field.planting_date.map(format_date),
            field.expected_harvest.map(format_date),
            field.status.as_str(),
            field.notes,
        ],
    )?;
    Ok(())
}

fn fetch_field(conn: &Connection, id: i64) -> Result<Option<Field>> {
    conn.query_row("SELECT * FROM fields WHERE id = ?1", [id], row_to_field)
        .optional()
        .map_err(Into::into)
}

fn row_to_field(row: &Row) -> rusqlite::Result<Field> {
    let status_str: String = row.get("status")?;
    let status = FieldStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown field status in database, defaulting to planted");
        FieldStatus::Planted
    });

    Ok(Field {
        id: Some(row.get("id")?),
        name: row.get("name")?,
        acres: row.get("acres")?,
        crop_type: row.get("crop_type")?,
        planting_date: optional_date(row, "planting_date")?,
        expected_harvest: optional_date(row, "expected_harvest")?,
        status,
        notes: row.get("notes")?,
    })
}

// Irrigation Event Queries

impl Database {
    pub fn list_irrigation_events(&self) -> Result<Vec<IrrigationEvent>> {
        self.query_events(
            "SELECT * FROM irrigation_events ORDER BY event_date, event_time, id",
            params![],
        )
    }

    pub fn events_on_date(&self, date: NaiveDate) -> Result<Vec<IrrigationEvent>> {
        self.query_events(
            "SELECT * FROM irrigation_events WHERE event_date = ?1 ORDER BY event_time, id",
            [format_date(date)],
        )
    }

    pub fn events_for_field(&self, field_id: i64) -> Result<Vec<IrrigationEvent>> {
        self.query_events(
            "SELECT * FROM irrigation_events WHERE field_id = ?1 ORDER BY event_date, event_time, id",
            [field_id],
        )
    }

    fn query_events<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<IrrigationEvent>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(sql)?;
            let events = stmt
                .query_map(params, row_to_event)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(events)
        })
    }

    pub fn get_irrigation_event(&self, id: i64) -> Result<Option<IrrigationEvent>> {
        let id = validate_id(id)?;
        self.with_conn(|conn| fetch_event(conn, id))
    }

    pub fn create_irrigation_event(&self, event: &IrrigationEvent) -> Result<IrrigationEvent> {
        let mut event = event.clone();
        event.prepare_new();
        self.with_conn(|conn| {
            insert_event(conn, None, &event)?;
            let id = conn.last_insert_rowid();
            tracing::info!(id, field_id = event.field_id, date = %event.date, "Irrigation event created");
            event.set_id(id);
            Ok(event)
        })
    }

    pub fn count_irrigation_events(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM irrigation_events", [], |row| {
                row.get(0)
            })?)
        })
    }

    pub fn update_irrigation_event(
        &self,
        id: i64,
        event: &IrrigationEvent,
    ) -> Result<IrrigationEvent> {
        let id = validate_id(id)?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                r#"
                UPDATE irrigation_events SET
                    field_id = ?1, field_name = ?2, event_date = ?3, event_time = ?4,
                    duration_minutes = ?5, water_gallons = ?6, irrigation_type = ?7,
                    status = ?8, soil_moisture = ?9, weather_condition = ?10,
                    temperature_f = ?11, notes = ?12
                WHERE id = ?13
                "#,
                params![
                    event.field_id,
                    event.field_name,
                    format_date(event.date),
                    time_format::format(&event.time),
                    event.duration,
                    event.water_amount,
                    event.irrigation_type.as_str(),
                    event.status.as_str(),
                    event.soil_moisture,
                    event.weather_condition.map(|c| c.as_str()),
                    event.temperature,
                    event.notes,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(not_found::<IrrigationEvent>(id));
            }
            Ok(IrrigationEvent {
                id: Some(id),
                ..event.clone()
            })
        })
    }

    pub fn delete_irrigation_event(&self, id: i64) -> Result<IrrigationEvent> {
        let id = validate_id(id)?;
        self.with_conn(|conn| {
            let event = fetch_event(conn, id)?.ok_or_else(|| not_found::<IrrigationEvent>(id))?;
            conn.execute("DELETE FROM irrigation_events WHERE id = ?1", [id])?;
            tracing::info!(id, "Irrigation event deleted");
            Ok(event)
        })
    }

    /// Insert `events` keeping their ids
    pub fn seed_irrigation_events(&self, events: &[IrrigationEvent]) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for event in events {
                insert_event(&tx, event.id, event)?;
            }
            tx.commit()?;
            Ok(events.len())
        })
    }
}

fn insert_event(conn: &Connection, id: Option<i64>, event: &IrrigationEvent) -> Result<()> {
    conn.execute(
        r#"
        INSERT INTO irrigation_events
            (id, field_id, field_name, event_date, event_time, duration_minutes,
             water_gallons, irrigation_type, status, soil_moisture, weather_condition,
             temperature_f, notes)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
        "#,
        params![
            id,
            event.field_id,
            event.field_name,
            format_date(event.date),
            time_format::format(&event.time),
            event.duration,
            event.water_amount,
            event.irrigation_type.as_str(),
            event.status.as_str(),
            event.soil_moisture,
            event.weather_condition.map(|c| c.as_str()),
            event.temperature,
            event.notes,
        ],
    )?;
    Ok(())
}

fn fetch_event(conn: &Connection, id: i64) -> Result<Option<IrrigationEvent>> {
    conn.query_row(
        "SELECT * FROM irrigation_events WHERE id = ?1",
        [id],
        row_to_event,
    )
    .optional()
    .map_err(Into::into)
}

fn row_to_event(row: &Row) -> rusqlite::Result<IrrigationEvent> {
    let date_str: String = row.get("event_date")?;
    let time_str: String = row.get("event_time")?;
    let type_str: String = row.get("irrigation_type")?;
    let status_str: String = row.get("status")?;
    let condition_str: Option<String> = row.get("weather_condition")?;

    let irrigation_type = IrrigationType::from_str(&type_str).unwrap_or_else(|| {
        warn!(
            irrigation_type = %type_str,
            "Unknown irrigation_type in database, defaulting to automatic"
        );
        IrrigationType::Automatic
    });
    let status = EventStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown event status in database, defaulting to scheduled");
        EventStatus::Scheduled
    });
    let weather_condition = condition_str.as_ref().and_then(|c| {
        WeatherCondition::from_str(c).or_else(|| {
            warn!(weather_condition = %c, "Unknown weather_condition in database, ignoring");
            None
        })
    });

    let time = time_format::parse(&time_str).ok_or_else(|| {
        conversion_error(
            "event_time",
            format!("invalid time of day '{}'", time_str),
        )
    })?;

    Ok(IrrigationEvent {
        id: Some(row.get("id")?),
        field_id: row.get("field_id")?,
        field_name: row.get("field_name")?,
        date: parse_date("event_date", &date_str)?,
        time,
        duration: row.get("duration_minutes")?,
        water_amount: row.get("water_gallons")?,
        irrigation_type,
        status,
        soil_moisture: row.get("soil_moisture")?,
        weather_condition,
        temperature: row.get("temperature_f")?,
        notes: row.get("notes")?,
    })
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

fn parse_date(column: &str, value: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| conversion_error(column, format!("invalid date '{}': {}", value, e)))
}

fn optional_date(row: &Row, column: &str) -> rusqlite::Result<Option<NaiveDate>> {
    let value: Option<String> = row.get(column)?;
    value.map(|v| parse_date(column, &v)).transpose()
}

fn conversion_error(column: &str, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        0,
        Type::Text,
        format!("{}: {}", column, message).into(),
    )
}

// Repository boundary

impl Repository<Field> for Database {
    fn list(&self) -> Result<Vec<Field>> {
        self.list_fields()
    }

    fn get(&self, id: i64) -> Result<Option<Field>> {
        self.get_field(id)
    }

    fn create(&self, record: Field) -> Result<Field> {
        self.create_field(&record)
    }

    fn update(&self, id: i64, record: Field) -> Result<Field> {
        self.update_field(id, &record)
    }

    fn delete(&self, id: i64) -> Result<Field> {
        self.delete_field(id)
    }
}

impl FieldStore for Database {}

impl Repository<IrrigationEvent> for Database {
    fn list(&self) -> Result<Vec<IrrigationEvent>> {
        self.list_irrigation_events()
    }

    fn get(&self, id: i64) -> Result<Option<IrrigationEvent>> {
        self.get_irrigation_event(id)
    }

    fn create(&self, record: IrrigationEvent) -> Result<IrrigationEvent> {
        self.create_irrigation_event(&record)
    }

    fn update(&self, id: i64, record: IrrigationEvent) -> Result<IrrigationEvent> {
        self.update_irrigation_event(id, &record)
    }

    fn delete(&self, id: i64) -> Result<IrrigationEvent> {
        self.delete_irrigation_event(id)
    }
}

impl EventStore for Database {
    fn list_by_date(&self, date: NaiveDate) -> Result<Vec<IrrigationEvent>> {
        self.events_on_date(date)
    }

    fn list_by_field(&self, field_id: i64) -> Result<Vec<IrrigationEvent>> {
        self.events_for_field(field_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldOpsError;
    use crate::store::seed;
    use chrono::NaiveTime;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn event(field_id: i64, day: u32, hour: u32) -> IrrigationEvent {
        IrrigationEvent::new(
            field_id,
            "North Field",
            date(day),
            NaiveTime::from_hms_opt(hour, 0, 0).unwrap(),
        )
    }

    #[test]
    fn field_crud() {
        let db = Database::open_in_memory().unwrap();
        let field = Field::new("North Field", "Corn", 25.5)
            .with_planting_date(date(1))
            .with_status(FieldStatus::Growing);

        let created = db.create_field(&field).unwrap();
        assert_eq!(created.id, Some(1));

        let fetched = db.get_field(1).unwrap().unwrap();
        assert_eq!(fetched, created);

        let renamed = Field {
            name: "North Forty".into(),
            ..fetched
        };
        db.update_field(1, &renamed).unwrap();
        assert_eq!(db.get_field(1).unwrap().unwrap().name, "North Forty");

        let removed = db.delete_field(1).unwrap();
        assert_eq!(removed.name, "North Forty");
        assert_eq!(db.count_fields().unwrap(), 0);
    }

    #[test]
    fn seeded_fields_keep_ids() {
        let db = Database::open_in_memory().unwrap();
        let fields = seed::bundled_fields().unwrap();
        db.seed_fields(&fields).unwrap();

        assert_eq!(db.list_fields().unwrap(), fields);
        let created = db.create_field(&Field::new("Orchard", "Apples", 4.0)).unwrap();
        assert_eq!(created.id, Some(5));
    }

    #[test]
    fn event_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let event = event(2, 12, 5)
            .with_duration(40)
            .with_water_amount(25)
            .with_type(IrrigationType::Manual)
            .with_soil_moisture(38)
            .with_weather(WeatherCondition::Sunny, 88.0)
            .with_notes("Check emitters");

        let created = db.create_irrigation_event(&event).unwrap();
        let fetched = db.get_irrigation_event(created.id.unwrap()).unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[test]
    fn event_filters_and_ordering() {
        let db = Database::open_in_memory().unwrap();
        db.create_irrigation_event(&event(1, 11, 6)).unwrap();
        db.create_irrigation_event(&event(2, 10, 7)).unwrap();
        db.create_irrigation_event(&event(1, 10, 5)).unwrap();

        let on_tenth = db.list_by_date(date(10)).unwrap();
        assert_eq!(on_tenth.len(), 2);
        assert_eq!(on_tenth[0].field_id, 1);

        let field_one = db.list_by_field(1).unwrap();
        assert_eq!(field_one.len(), 2);
        assert!(field_one[0].date < field_one[1].date);

        let all = db.list_irrigation_events().unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn create_forces_scheduled_status() {
        let db = Database::open_in_memory().unwrap();
        let completed = IrrigationEvent {
            status: EventStatus::Completed,
            ..event(1, 10, 6)
        };
        let events: &dyn EventStore = &db;
        let created = events.create(completed).unwrap();
        assert_eq!(created.status, EventStatus::Scheduled);
        assert_eq!(
            db.get_irrigation_event(created.id.unwrap())
                .unwrap()
                .unwrap()
                .status,
            EventStatus::Scheduled
        );
        assert_eq!(db.count_irrigation_events().unwrap(), 1);
    }

    #[test]
    fn update_and_delete_missing_event() {
        let db = Database::open_in_memory().unwrap();
        let err = db.update_irrigation_event(7, &event(1, 10, 6)).unwrap_err();
        assert!(matches!(err, FieldOpsError::NotFound(_)));
        let err = db.delete_irrigation_event(7).unwrap_err();
        assert!(matches!(err, FieldOpsError::NotFound(_)));
        let err = db.get_irrigation_event(0).unwrap_err();
        assert!(matches!(err, FieldOpsError::InvalidData(_)));
    }

    #[test]
    fn update_event_status() {
        let db = Database::open_in_memory().unwrap();
        let created = db.create_irrigation_event(&event(1, 10, 6)).unwrap();
        let id = created.id.unwrap();

        let completed = IrrigationEvent {
            status: EventStatus::Completed,
            ..created
        };
        let updated = db.update_irrigation_event(id, &completed).unwrap();
        assert_eq!(updated.id, Some(id));
        assert_eq!(
            db.get_irrigation_event(id).unwrap().unwrap().status,
            EventStatus::Completed
        );
    }

    #[test]
    fn repository_trait_objects() {
        let db = Database::open_in_memory().unwrap();
        let events: &dyn EventStore = &db;
        let created = events.create(event(3, 14, 6)).unwrap();
        assert_eq!(events.list().unwrap().len(), 1);
        assert_eq!(events.delete(created.id.unwrap()).unwrap().field_id, 3);

        let fields: &dyn FieldStore = &db;
        assert!(fields.list().unwrap().is_empty());
    }

    #[test]
    fn seeded_events_load() {
        let db = Database::open_in_memory().unwrap();
        db.seed_fields(&seed::bundled_fields().unwrap()).unwrap();
        let events = seed::bundled_events().unwrap();
        db.seed_irrigation_events(&events).unwrap();
        assert_eq!(db.list_irrigation_events().unwrap(), events);
    }
}
