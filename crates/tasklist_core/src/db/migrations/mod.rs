//! Forward-only schema upgrades for the tasklist database.
//!
//! Script `n` in [`SCRIPTS`] upgrades the database to schema version `n + 1`,
//! which is mirrored to `PRAGMA user_version`. Scripts are never edited once
//! released; new layouts get a new script at the end.

use crate::store::{StoreError, StoreResult};
use log::info;
use rusqlite::Connection;

const SCRIPTS: [&str; 2] = [
    // Normalized layout: categories + tasks.
    include_str!("0001_categories_tasks.sql"),
    // Key-value layout: JSON records keyed by category name.
    include_str!("0002_kv_records.sql"),
];

/// Schema version written by this build.
pub fn latest_version() -> u32 {
    SCRIPTS.len() as u32
}

/// Brings the database up to [`latest_version`] in one transaction.
///
/// # Errors
/// - [`StoreError::SchemaTooNew`] when the file was written by a newer
///   tasklist release; the file is left untouched.
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(StoreError::SchemaTooNew { found, supported });
    }

    let pending = &SCRIPTS[found as usize..];
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for script in pending {
        tx.execute_batch(script)?;
    }
    tx.pragma_update(None, "user_version", supported)?;
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from={found} to={supported}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, latest_version};
    use rusqlite::Connection;

    #[test]
    fn partial_upgrade_only_runs_missing_scripts() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(include_str!("0001_categories_tasks.sql"))
            .unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();

        apply_migrations(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("PRAGMA user_version;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, latest_version());
        let kv_tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'kv_records';",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(kv_tables, 1);
    }
}
