/// Persistence layer: the TaskStore contract and its SQLite implementation.
mod categories;
mod migrations;
mod tasks;
mod worklog;

use anyhow::Result;
use rusqlite::Connection;
use tracing::warn;

use crate::types::{Category, LogEntry, Task};

/// The port the engine talks to. Loads fail soft (empty collection, warning
/// logged) and never raise to the engine; saves are whole-collection
/// overwrites whose failure is reported but not retried; log appends must
/// never block the stop that produced them.
pub trait TaskStore {
    fn load_tasks(&mut self) -> Vec<Task>;
    fn save_tasks(&mut self, tasks: &[Task]) -> Result<()>;
    fn load_categories(&mut self) -> Vec<Category>;
    fn save_categories(&mut self, categories: &[Category]) -> Result<()>;
    fn append_log(&mut self, entry: &LogEntry) -> Result<()>;
    fn load_log(&mut self) -> Vec<LogEntry>;
}

/// SQLite-backed store: one row per task, ordered by position, with the
/// textual column formats of the original spreadsheet kept verbatim.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the database and runs migrations.
    pub fn open(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { conn })
    }
}

impl TaskStore for SqliteStore {
    fn load_tasks(&mut self) -> Vec<Task> {
        match tasks::load_tasks(&self.conn) {
            Ok(tasks) => tasks,
            Err(err) => {
                warn!("failed to load tasks, starting empty: {err}");
                Vec::new()
            }
        }
    }

    fn save_tasks(&mut self, tasks: &[Task]) -> Result<()> {
        tasks::save_tasks(tasks, &mut self.conn)
    }

    fn load_categories(&mut self) -> Vec<Category> {
        match categories::load_categories(&self.conn) {
            Ok(categories) => categories,
            Err(err) => {
                warn!("failed to load categories, starting empty: {err}");
                Vec::new()
            }
        }
    }

    fn save_categories(&mut self, categories: &[Category]) -> Result<()> {
        categories::save_categories(categories, &mut self.conn)
    }

    fn append_log(&mut self, entry: &LogEntry) -> Result<()> {
        worklog::append_log(entry, &self.conn)
    }

    fn load_log(&mut self) -> Vec<LogEntry> {
        match worklog::load_log(&self.conn) {
            Ok(entries) => entries,
            Err(err) => {
                warn!("failed to load work log: {err}");
                Vec::new()
            }
        }
    }
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./tally.db` when no data dir is found.
pub fn default_db_path() -> String {
    if let Some(data_dir) = dirs::data_local_dir() {
        let tally_dir = data_dir.join("tally");
        std::fs::create_dir_all(&tally_dir).ok();
        tally_dir.join("tally.db").to_string_lossy().into_owned()
    } else {
        "tally.db".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn load_fails_soft_on_missing_schema() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.conn.execute("DROP TABLE tasks", []).unwrap();
        store.conn.execute("DROP TABLE categories", []).unwrap();

        assert!(store.load_tasks().is_empty());
        assert!(store.load_categories().is_empty());
    }

    #[test]
    fn trait_round_trip_through_sqlite() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let task = Task::new(
            "T1".to_string(),
            "Write docs".to_string(),
            "Docs".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        );
        store.save_tasks(std::slice::from_ref(&task)).unwrap();
        assert_eq!(store.load_tasks(), vec![task]);
    }
}
