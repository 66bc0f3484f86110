use crate::errors::{AppError, AppResult};
use crate::utils::date;
use rusqlite::{Connection, OptionalExtension, Result, params};

/// One schema step. Steps run in order and each one is recorded in
/// `schema_migrations` once applied.
struct Migration {
    version: &'static str,
    description: &'static str,
    apply: fn(&Connection) -> Result<()>,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: "20250609_0001_initial_schema",
        description: "Create workers, tasks, predictions, activities and users tables",
        apply: create_initial_schema,
    },
    Migration {
        version: "20250612_0002_worker_salary",
        description: "Add salary column to workers",
        apply: add_worker_salary,
    },
    Migration {
        version: "20250620_0003_lookup_indexes",
        description: "Index foreign keys and created_at columns",
        apply: create_lookup_indexes,
    },
];

/// Ensure that the `schema_migrations` bookkeeping table exists.
fn ensure_migrations_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version     TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at  TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

fn is_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT 1 FROM schema_migrations WHERE version = ?1 LIMIT 1")?;
    Ok(stmt.query_row([version], |_| Ok(())).optional()?.is_some())
}

/// Check if `table` has a column named `column`.
pub fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{}')", table))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn create_initial_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS workers (
            id                INTEGER PRIMARY KEY AUTOINCREMENT,
            name              TEXT NOT NULL,
            role              TEXT NOT NULL,
            status            TEXT NOT NULL CHECK(status IN ('active','inactive','on_leave')),
            performance_score REAL NOT NULL DEFAULT 0
                              CHECK(performance_score >= 0 AND performance_score <= 10),
            tasks_completed   INTEGER NOT NULL DEFAULT 0,
            tasks_to_complete INTEGER NOT NULL DEFAULT 0,
            created_at        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tasks (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id    INTEGER NOT NULL REFERENCES workers(id),
            description  TEXT NOT NULL,
            is_completed INTEGER NOT NULL DEFAULT 0 CHECK(is_completed IN (0,1)),
            created_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS performance_predictions (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id        INTEGER NOT NULL REFERENCES workers(id),
            hours_worked     REAL NOT NULL DEFAULT 0,
            tasks_completed  INTEGER NOT NULL DEFAULT 0,
            efficiency_rate  REAL NOT NULL DEFAULT 0,
            predicted_score  REAL NOT NULL
                             CHECK(predicted_score >= 0 AND predicted_score <= 10),
            confidence_score REAL NOT NULL DEFAULT 0,
            created_at       TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS activities (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id     INTEGER REFERENCES workers(id),
            task_id       INTEGER REFERENCES tasks(id),
            activity_type TEXT NOT NULL,
            description   TEXT NOT NULL DEFAULT '',
            created_at    TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            username      TEXT NOT NULL UNIQUE,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role          TEXT NOT NULL DEFAULT 'user',
            created_at    TEXT NOT NULL,
            last_login    TEXT
        );
        "#,
    )
}

fn add_worker_salary(conn: &Connection) -> Result<()> {
    if table_has_column(conn, "workers", "salary")? {
        return Ok(()); // già presente → OK
    }
    conn.execute(
        "ALTER TABLE workers ADD COLUMN salary REAL NOT NULL DEFAULT 0",
        [],
    )?;
    Ok(())
}

fn create_lookup_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE INDEX IF NOT EXISTS idx_tasks_worker ON tasks(worker_id, is_completed);
        CREATE INDEX IF NOT EXISTS idx_predictions_worker_created
            ON performance_predictions(worker_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_activities_created ON activities(created_at);
        "#,
    )
}

/// Public entry point: run all pending migrations.
/// Returns the versions applied by this call.
pub fn run_pending_migrations(conn: &mut Connection) -> AppResult<Vec<&'static str>> {
    ensure_migrations_table(conn)?;

    let mut applied = Vec::new();

    for m in MIGRATIONS {
        if is_applied(conn, m.version)? {
            continue;
        }

        let tx = conn.transaction()?;
        (m.apply)(&tx).map_err(|e| {
            AppError::Migration(format!("{} failed: {}", m.version, e))
        })?;
        tx.execute(
            "INSERT INTO schema_migrations (version, description, applied_at) VALUES (?1, ?2, ?3)",
            params![m.version, m.description, date::format_ts(&date::now())],
        )?;
        tx.commit()?;

        tracing::info!(version = m.version, "migration applied");
        applied.push(m.version);
    }

    Ok(applied)
}

/// Versions recorded in `schema_migrations`, oldest first.
pub fn applied_versions(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT version FROM schema_migrations ORDER BY version ASC")?;
    let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::DbPool;

    #[test]
    fn migrations_are_applied_once() {
        let mut pool = DbPool::in_memory().unwrap();
        let first = run_pending_migrations(&mut pool.conn).unwrap();
        assert_eq!(first.len(), MIGRATIONS.len());

        let second = run_pending_migrations(&mut pool.conn).unwrap();
        assert!(second.is_empty());

        assert!(table_has_column(&pool.conn, "workers", "salary").unwrap());
        assert_eq!(
            applied_versions(&pool.conn).unwrap().len(),
            MIGRATIONS.len()
        );
    }

    #[test]
    fn salary_step_tolerates_existing_column() {
        let mut pool = DbPool::in_memory().unwrap();
        create_initial_schema(&pool.conn).unwrap();
        add_worker_salary(&pool.conn).unwrap();
        // Pre-existing column, not yet recorded: the migration must not fail.
        let applied = run_pending_migrations(&mut pool.conn).unwrap();
        assert!(applied.contains(&"20250612_0002_worker_salary"));
    }
}
