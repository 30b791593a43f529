/// Database schema management.
use anyhow::Result;
use rusqlite::Connection;

/// Creates the schema if it doesn't exist yet. Tasks and categories keep
/// the textual column formats of the spreadsheet the data originates from;
/// `position` encodes collection order.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS tasks (
            position        INTEGER PRIMARY KEY,
            id              TEXT NOT NULL,
            name            TEXT NOT NULL,
            category        TEXT NOT NULL DEFAULT '',
            duration        TEXT NOT NULL DEFAULT '00:00:00',
            start_epoch     REAL NOT NULL DEFAULT 0,
            notes           TEXT NOT NULL DEFAULT '',
            created_date    TEXT NOT NULL DEFAULT '',
            archived        TEXT NOT NULL DEFAULT 'False',
            completion_date TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS categories (
            position    INTEGER PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS work_log (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            task_id    TEXT NOT NULL,
            task       TEXT NOT NULL,
            category   TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time   TEXT NOT NULL,
            duration   TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}
