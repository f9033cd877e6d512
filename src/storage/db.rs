use std::sync::Mutex;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use tracing::debug;

use crate::error::PersistenceError;
use crate::storage::{models::RenewalRecord, Persistence};

/// SQLite-backed record persistence.
pub struct SqlitePersistence {
    conn: Mutex<Connection>,
}

impl SqlitePersistence {
    pub fn new(path: &str) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self, PersistenceError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, PersistenceError> {
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), PersistenceError> {
        let conn = self.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS renewal_records (
                id INTEGER PRIMARY KEY,
                payer TEXT NOT NULL,
                company TEXT NOT NULL,
                years INTEGER NOT NULL,
                expiry_date TEXT NOT NULL,
                email TEXT NOT NULL,
                position INTEGER NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_expiry ON renewal_records(expiry_date)",
            [],
        )?;

        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Connection> {
        // Poisoning leaves the connection usable.
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Persistence for SqlitePersistence {
    fn load(&self) -> Result<Vec<RenewalRecord>, PersistenceError> {
        let conn = self.lock();
        let mut stmt = conn.prepare(
            "SELECT id, payer, company, years, expiry_date, email
             FROM renewal_records
             ORDER BY position",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, payer, company, years, expiry, email)| {
                let expiry_date = NaiveDate::parse_from_str(&expiry, "%Y-%m-%d").map_err(|e| {
                    PersistenceError::Corrupt {
                        id,
                        reason: format!("bad expiry '{}': {}", expiry, e),
                    }
                })?;
                Ok(RenewalRecord {
                    id,
                    payer,
                    company,
                    years,
                    expiry_date,
                    email,
                })
            })
            .collect()
    }

    fn save(&self, records: &[RenewalRecord]) -> Result<(), PersistenceError> {
        let mut conn = self.lock();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM renewal_records", [])?;
        {
            let mut insert = tx.prepare(
                "INSERT INTO renewal_records
                 (id, payer, company, years, expiry_date, email, position)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for (position, record) in records.iter().enumerate() {
                insert.execute(params![
                    record.id,
                    record.payer,
                    record.company,
                    record.years,
                    record.expiry_string(),
                    record.email,
                    position as i64,
                ])?;
            }
        }
        tx.commit()?;

        debug!("Saved {} records to sqlite", records.len());
        Ok(())
    }
}
