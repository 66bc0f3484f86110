use crate::db::migrate::applied_versions;
use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use crate::utils::formatting::format_file_size;
use rusqlite::OptionalExtension;
use std::fs;

const TABLES: [&str; 5] = [
    "workers",
    "tasks",
    "performance_predictions",
    "activities",
    "users",
];

/// Row counts per table, in display order.
pub fn table_counts(pool: &mut DbPool) -> rusqlite::Result<Vec<(&'static str, i64)>> {
    pool.with_conn(|conn| {
        let mut out = Vec::with_capacity(TABLES.len());
        for table in TABLES {
            let n: i64 =
                conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
            out.push((table, n));
        }
        Ok(out)
    })
}

pub fn print_db_info(pool: &mut DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {}", CYAN, RESET, format_file_size(file_size));

    //
    // 2) ROWS PER TABLE
    //
    println!("{}• Rows:{}", CYAN, RESET);
    for (table, n) in table_counts(pool)? {
        println!("    {:<24} {}{}{}", table, GREEN, n, RESET);
    }

    //
    // 3) ACTIVITY RANGE
    //
    let first: Option<String> = pool
        .conn
        .query_row(
            "SELECT created_at FROM activities ORDER BY created_at ASC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    let last: Option<String> = pool
        .conn
        .query_row(
            "SELECT created_at FROM activities ORDER BY created_at DESC LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;

    println!("{}• Activity range:{}", CYAN, RESET);
    println!(
        "    from: {}",
        first.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );
    println!(
        "    to:   {}",
        last.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    //
    // 4) SCHEMA VERSION
    //
    let versions = applied_versions(&pool.conn)?;
    let latest = versions
        .last()
        .cloned()
        .unwrap_or_else(|| format!("{GREY}--{RESET}"));
    println!(
        "{}• Schema:{} {} ({} migrations)",
        CYAN,
        RESET,
        latest,
        versions.len()
    );

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrate::run_pending_migrations;

    #[test]
    fn counts_every_table() {
        let mut pool = DbPool::in_memory().unwrap();
        run_pending_migrations(&mut pool.conn).unwrap();
        let counts = table_counts(&mut pool).unwrap();
        assert_eq!(counts.len(), 5);
        assert!(counts.iter().all(|(_, n)| *n == 0));
    }
}
