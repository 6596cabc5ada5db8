use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Initial schema
    r#"
    CREATE TABLE IF NOT EXISTS fields (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        acres REAL NOT NULL,
        crop_type TEXT NOT NULL,
        planting_date TEXT,
        expected_harvest TEXT,
        status TEXT NOT NULL,
        notes TEXT
    );

    CREATE TABLE IF NOT EXISTS irrigation_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        field_id INTEGER NOT NULL,
        field_name TEXT NOT NULL,
        event_date TEXT NOT NULL,
        event_time TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        water_gallons INTEGER NOT NULL,
        irrigation_type TEXT NOT NULL,
        status TEXT NOT NULL,
        soil_moisture INTEGER NOT NULL,
        weather_condition TEXT,
        temperature_f REAL,
        notes TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Add indexes
    r#"
    CREATE INDEX IF NOT EXISTS idx_irrigation_events_field_id
        ON irrigation_events(field_id);
    CREATE INDEX IF NOT EXISTS idx_irrigation_events_date
        ON irrigation_events(event_date);
    "#,
];

pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;

        let current_version: i32 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;

        for (i, migration) in MIGRATIONS.iter().enumerate() {
            let version = (i + 1) as i32;
            if version > current_version {
                tracing::info!("Applying migration {}", version);
                let tx = conn.transaction()?;
                tx.execute_batch(migration)?;
                tx.execute(
                    "INSERT INTO schema_migrations (version) VALUES (?1)",
                    [version],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    })
}

pub fn latest_version() -> i32 {
    MIGRATIONS.len() as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_version(db: &Database) -> i32 {
        db.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
                [],
                |row| row.get(0),
            )?)
        })
        .unwrap()
    }

    #[test]
    fn migrations_apply_once() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(schema_version(&db), latest_version());

        // Re-running is a no-op
        run(&db).unwrap();
        let applied: i32 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(applied, latest_version());
    }
}
