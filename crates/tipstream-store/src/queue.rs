use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use tipstream_core::types::{AlertPayload, NotificationRecord};

/// Durable append-only queue of notification records.
///
/// Records are created undelivered and transition exactly once to delivered;
/// nothing is ever deleted or otherwise mutated. Wraps a single SQLite
/// connection in a `Mutex`; async callers go through `spawn_blocking`.
pub struct NotificationQueue {
    db: Mutex<Connection>,
}

impl NotificationQueue {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Persist a canonical payload with `delivered = 0` and return the
    /// assigned record id. The row is durable once this returns — dispatch
    /// for the record must only ever start after that point.
    pub fn append(&self, payload: &AlertPayload) -> Result<String> {
        // UUID v7 is time-ordered, giving a stable tiebreaker for rows that
        // share a created_at second.
        let id = Uuid::now_v7().to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let json = serde_json::to_string(payload).map_err(|e| StoreError::CorruptPayload {
            id: id.clone(),
            source: e,
        })?;

        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO notifications (id, identifier, payload, delivered, created_at)
             VALUES (?1, ?2, ?3, 0, ?4)",
            rusqlite::params![id, payload.identifier, json, now],
        )?;

        debug!(record_id = %id, identifier = %payload.identifier, "notification appended");
        Ok(id)
    }

    /// Mark a record delivered. Idempotent: the `delivered = 0` predicate
    /// makes repeat calls no-ops, so the first `delivered_at` always wins —
    /// the drain path and a concurrent live dispatch may both call this for
    /// the same record.
    pub fn mark_delivered(&self, id: &str) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        let rows = db.execute(
            "UPDATE notifications
             SET delivered = 1, delivered_at = ?2
             WHERE id = ?1 AND delivered = 0",
            rusqlite::params![id, now],
        )?;
        if rows > 0 {
            debug!(record_id = %id, "notification marked delivered");
        }
        Ok(())
    }

    /// Undelivered records for an identifier, oldest first.
    pub fn list_undelivered(&self, identifier: &str) -> Result<Vec<NotificationRecord>> {
        let db = self.db.lock().unwrap();
        let mut stmt = db.prepare(
            "SELECT id, identifier, payload, delivered, created_at, delivered_at
             FROM notifications
             WHERE identifier = ?1 AND delivered = 0
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(rusqlite::params![identifier], row_to_raw)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(parse_record(row?)?);
        }
        Ok(records)
    }

    /// Fetch one record by id, `None` if it does not exist. Test seam and
    /// invariant check; not part of the hot path.
    pub fn get(&self, id: &str) -> Result<Option<NotificationRecord>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT id, identifier, payload, delivered, created_at, delivered_at
             FROM notifications WHERE id = ?1",
            rusqlite::params![id],
            row_to_raw,
        ) {
            Ok(raw) => Ok(Some(parse_record(raw)?)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(e)),
        }
    }
}

/// Intermediate row shape — payload still JSON text.
struct RawRecord {
    id: String,
    identifier: String,
    payload: String,
    delivered: bool,
    created_at: String,
    delivered_at: Option<String>,
}

fn row_to_raw(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok(RawRecord {
        id: row.get(0)?,
        identifier: row.get(1)?,
        payload: row.get(2)?,
        delivered: row.get::<_, i32>(3)? != 0,
        created_at: row.get(4)?,
        delivered_at: row.get(5)?,
    })
}

fn parse_record(raw: RawRecord) -> Result<NotificationRecord> {
    let payload: AlertPayload =
        serde_json::from_str(&raw.payload).map_err(|e| StoreError::CorruptPayload {
            id: raw.id.clone(),
            source: e,
        })?;
    Ok(NotificationRecord {
        id: raw.id,
        identifier: raw.identifier,
        payload,
        delivered: raw.delivered,
        created_at: raw.created_at,
        delivered_at: raw.delivered_at,
    })
}
