use std::sync::Mutex;

use rusqlite::Connection;
use tracing::debug;

use crate::error::{Result, StoreError};
use tipstream_core::types::IdentityProfile;

/// Read side of the identity collection — the contract the relay core
/// consumes is `lookup`. The write side (`upsert`) belongs to the external
/// authorization flow that issues identifiers.
///
/// Wraps a single SQLite connection in a `Mutex`; callers in async context
/// must reach it through `spawn_blocking`.
pub struct IdentityStore {
    db: Mutex<Connection>,
}

impl IdentityStore {
    /// Wrap an already-open (and `init_db`-initialised) connection.
    pub fn new(conn: Connection) -> Self {
        Self {
            db: Mutex::new(conn),
        }
    }

    /// Look up an identity by its opaque identifier, `None` if unknown.
    pub fn lookup(&self, identifier: &str) -> Result<Option<IdentityProfile>> {
        let db = self.db.lock().unwrap();
        match db.query_row(
            "SELECT identifier, provider, provider_id, display_name, avatar,
                    alert_gif, alert_audio, created_at, updated_at
             FROM identities WHERE identifier = ?1",
            rusqlite::params![identifier],
            row_to_profile,
        ) {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => {
                debug!(identifier, "identity lookup miss");
                Ok(None)
            }
            Err(e) => Err(StoreError::Database(e)),
        }
    }

    /// Insert or refresh an identity record.
    ///
    /// The identifier is immutable once issued; upserting an existing row
    /// only refreshes the binding fields, the overrides, and `updated_at`.
    pub fn upsert(&self, profile: &IdentityProfile) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let db = self.db.lock().unwrap();
        db.execute(
            "INSERT INTO identities
             (identifier, provider, provider_id, display_name, avatar,
              alert_gif, alert_audio, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)
             ON CONFLICT(identifier) DO UPDATE SET
                 provider     = excluded.provider,
                 provider_id  = excluded.provider_id,
                 display_name = excluded.display_name,
                 avatar       = excluded.avatar,
                 alert_gif    = excluded.alert_gif,
                 alert_audio  = excluded.alert_audio,
                 updated_at   = excluded.updated_at",
            rusqlite::params![
                profile.identifier,
                profile.provider,
                profile.provider_id,
                profile.display_name,
                profile.avatar,
                profile.alert_gif,
                profile.alert_audio,
                now,
            ],
        )?;
        Ok(())
    }
}

/// Map a SQLite row to an `IdentityProfile`.
fn row_to_profile(row: &rusqlite::Row<'_>) -> rusqlite::Result<IdentityProfile> {
    Ok(IdentityProfile {
        identifier: row.get(0)?,
        provider: row.get(1)?,
        provider_id: row.get(2)?,
        display_name: row.get(3)?,
        avatar: row.get(4)?,
        alert_gif: row.get(5)?,
        alert_audio: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}
