use crate::db::migrate::run_pending_migrations;
use crate::errors::AppResult;
use rusqlite::Connection;

/// Initialize the database.
/// Delegates all schema creation / upgrades to the migration engine.
pub fn init_db(conn: &mut Connection) -> AppResult<()> {
    // NO direct CREATE TABLE here.
    // All schema is guaranteed by migrations.
    let applied = run_pending_migrations(conn)?;
    if !applied.is_empty() {
        tracing::debug!(count = applied.len(), "database schema upgraded");
    }
    Ok(())
}
