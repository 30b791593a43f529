/// Append-only run log: one row per completed (start, stop) interval.
use anyhow::Result;
use rusqlite::Connection;

use crate::timefmt;
use crate::types::LogEntry;

pub fn append_log(entry: &LogEntry, conn: &Connection) -> Result<()> {
    conn.execute(
        "INSERT INTO work_log (task_id, task, category, start_time, end_time, duration)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        rusqlite::params![
            entry.task_id,
            entry.task,
            entry.category,
            timefmt::format_datetime(entry.start_epoch),
            timefmt::format_datetime(entry.end_epoch),
            timefmt::format_time(entry.duration_seconds),
        ],
    )?;
    Ok(())
}

pub fn load_log(conn: &Connection) -> Result<Vec<LogEntry>> {
    let mut stmt = conn.prepare(
        "SELECT task_id, task, category, start_time, end_time, duration
         FROM work_log ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        let start: String = row.get(3).unwrap_or_default();
        let end: String = row.get(4).unwrap_or_default();
        let duration: String = row.get(5).unwrap_or_default();
        Ok(LogEntry {
            task_id: row.get(0).unwrap_or_default(),
            task: row.get(1).unwrap_or_default(),
            category: row.get(2).unwrap_or_default(),
            start_epoch: timefmt::parse_datetime(&start),
            end_epoch: timefmt::parse_datetime(&end),
            duration_seconds: timefmt::parse_time_str(&duration),
        })
    })?;
    let mut entries = Vec::new();
    for row in rows {
        entries.push(row?);
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::migrations;

    #[test]
    fn appended_entries_come_back_in_order() {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();

        let first = LogEntry {
            task_id: "T1".to_string(),
            task: "Write docs".to_string(),
            category: "Docs".to_string(),
            start_epoch: 1_700_000_000.0,
            end_epoch: 1_700_000_125.0,
            duration_seconds: 125.0,
        };
        let second = LogEntry {
            task_id: "T2".to_string(),
            task: "Review".to_string(),
            category: "Dev".to_string(),
            start_epoch: 1_700_001_000.0,
            end_epoch: 1_700_001_050.0,
            duration_seconds: 50.0,
        };
        append_log(&first, &conn).unwrap();
        append_log(&second, &conn).unwrap();

        let entries = load_log(&conn).unwrap();
        assert_eq!(entries, vec![first, second]);
    }

    #[test]
    fn duration_persists_as_hms_text() {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();

        let entry = LogEntry {
            task_id: "T1".to_string(),
            task: "Write docs".to_string(),
            category: "Docs".to_string(),
            start_epoch: 1_700_000_000.0,
            end_epoch: 1_700_000_125.0,
            duration_seconds: 125.0,
        };
        append_log(&entry, &conn).unwrap();

        let duration: String = conn
            .query_row("SELECT duration FROM work_log", [], |row| row.get(0))
            .unwrap();
        assert_eq!(duration, "00:02:05");
    }
}
