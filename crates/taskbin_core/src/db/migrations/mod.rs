//! Schema steps for the task store.
//!
//! `PRAGMA user_version` records the last step applied. A database whose
//! version is ahead of [`latest_version`] was written by a newer taskbin and
//! is refused rather than downgraded.

use crate::db::{DbError, DbResult};
use log::{debug, info};
use rusqlite::Connection;

/// One forward-only schema change.
struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

/// Registered steps, ordered by `version` with no gaps.
const SCHEMA_STEPS: &[SchemaStep] = &[SchemaStep {
    version: 1,
    name: "active_and_recycled_tasks",
    sql: include_str!("0001_init.sql"),
}];

/// Highest schema version this build can read and write.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Brings the connection's schema up to [`latest_version`].
///
/// All pending steps share one transaction, so a failing step leaves the
/// schema at its previous version.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file is newer than this build.
/// - `Sqlite` when a step fails to apply.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = current_user_version(conn)?;
    let target = latest_version();
    if from_version > target {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: target,
        });
    }

    let mut pending = steps_after(from_version).peekable();
    if pending.peek().is_none() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for step in pending {
        tx.execute_batch(step.sql)?;
        tx.pragma_update(None, "user_version", step.version)?;
        debug!(
            "event=db_migrate_step module=db version={} name={}",
            step.version, step.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={target}");
    Ok(())
}

/// Reads `PRAGMA user_version`; 0 means no taskbin schema yet.
pub fn current_user_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

fn steps_after(version: u32) -> impl Iterator<Item = &'static SchemaStep> {
    SCHEMA_STEPS.iter().filter(move |step| step.version > version)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, steps_after, SCHEMA_STEPS};

    #[test]
    fn steps_are_numbered_from_one_without_gaps() {
        for (index, step) in SCHEMA_STEPS.iter().enumerate() {
            assert_eq!(step.version as usize, index + 1, "step {}", step.name);
        }
        assert_eq!(latest_version() as usize, SCHEMA_STEPS.len());
    }

    #[test]
    fn steps_after_latest_is_empty() {
        assert_eq!(steps_after(0).count(), SCHEMA_STEPS.len());
        assert_eq!(steps_after(latest_version()).count(), 0);
    }
}
