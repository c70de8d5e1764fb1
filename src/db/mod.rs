//! SQLite-backed session and availability store. A single connection is
//! shared behind a mutex, so booking arbitration and the write it guards
//! always see the same snapshot.

pub mod migrations;
pub mod queries;

use anyhow::Context;
use rusqlite::Connection;

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path).context("failed to open database")?;

    // busy_timeout covers external readers (sqlite3 shell, backups) holding
    // the file while we write.
    conn.execute_batch(
        "PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON; PRAGMA busy_timeout=5000;",
    )
    .context("failed to set database pragmas")?;

    migrations::run_migrations(&conn)?;

    Ok(conn)
}
