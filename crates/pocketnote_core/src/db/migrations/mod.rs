//! Schema steps for the note store.
//!
//! Step `n` (1-based) in `SCHEMA_STEPS` upgrades the store from version
//! `n - 1` to `n`, so versions are ordered by construction. Pending steps run
//! inside one transaction together with the `user_version` bump.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::cmp::Ordering;

const SCHEMA_STEPS: &[&str] = &[include_str!("0001_init.sql")];

/// Schema version this binary writes.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.len() as u32
}

/// Reads the store's schema version.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Brings the store up to `latest_version()`.
///
/// # Errors
/// - `DbError::UnsupportedSchemaVersion` when the store is newer.
/// - `DbError::Migration` naming the failing step; nothing is applied.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found = schema_version(conn)?;
    let latest = latest_version();
    match found.cmp(&latest) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: found,
                latest_supported: latest,
            })
        }
        Ordering::Equal => return Ok(()),
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending_steps(found) {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration { version, source })?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found, latest
    );
    Ok(())
}

fn pending_steps(found: u32) -> impl Iterator<Item = (u32, &'static str)> {
    (1u32..)
        .zip(SCHEMA_STEPS.iter().copied())
        .skip(found as usize)
}
