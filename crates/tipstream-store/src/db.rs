use rusqlite::Connection;

use crate::error::Result;

/// Initialise all tables for the store. Safe to call on every startup —
/// CREATE IF NOT EXISTS means it's idempotent.
pub fn init_db(conn: &Connection) -> Result<()> {
    create_identities_table(conn)?;
    create_notifications_table(conn)?;
    Ok(())
}

fn create_identities_table(conn: &Connection) -> Result<()> {
    // Written by the external authorization flow; the relay core only reads.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS identities (
            identifier   TEXT PRIMARY KEY NOT NULL,
            provider     TEXT,
            provider_id  TEXT,
            display_name TEXT,
            avatar       TEXT,
            alert_gif    TEXT,
            alert_audio  TEXT,
            created_at   TEXT NOT NULL,
            updated_at   TEXT NOT NULL
        );",
    )?;
    Ok(())
}

fn create_notifications_table(conn: &Connection) -> Result<()> {
    // Append-only delivery log. The partial index backs the drain query:
    // undelivered rows per identifier in created_at order.
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS notifications (
            id           TEXT PRIMARY KEY NOT NULL,
            identifier   TEXT NOT NULL,
            payload      TEXT NOT NULL,  -- canonical payload JSON
            delivered    INTEGER NOT NULL DEFAULT 0,
            created_at   TEXT NOT NULL,
            delivered_at TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_notifications_undelivered
            ON notifications (identifier, created_at)
            WHERE delivered = 0;",
    )?;
    Ok(())
}
