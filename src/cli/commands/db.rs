use crate::cli::parser::Commands;
use crate::config::{Backend, Config};
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats;
use crate::errors::{AppError, AppResult};
use crate::utils::colors::{CYAN, GREEN, RED, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
        info,
    } = cmd
    {
        if cfg.backend != Backend::Sqlite {
            return Err(AppError::validation(
                "Database maintenance needs the sqlite backend",
            ));
        }

        let db_path = cfg.database_path();
        let db_str = db_path.to_string_lossy().to_string();
        let mut pool = DbPool::new(&db_path)
            .map_err(|e| AppError::StorageUnavailable(format!("{}: {}", db_str, e)))?;

        if *migrate {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            let applied = run_pending_migrations(&mut pool.conn)?;
            if applied.is_empty() {
                println!("{}✔ Schema already up to date.{}\n", GREEN, RESET);
            } else {
                println!(
                    "{}✔ Applied: {}{}\n",
                    GREEN,
                    applied.join(", "),
                    RESET
                );
            }
        }

        if *info {
            stats::print_db_info(&mut pool, &db_str)?;
        }

        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);
            let integrity: String = pool
                .conn
                .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;

            if integrity == "ok" {
                println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
            } else {
                println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, integrity);
            }
        }

        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            pool.conn.execute_batch("VACUUM;")?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }
    }

    Ok(())
}
