/// Task row persistence: whole-collection load/save plus the lenient row
/// codec that centralizes all field coercion and defaulting.
use anyhow::Result;
use rusqlite::{Connection, Row};

use crate::timefmt;
use crate::types::Task;

pub fn load_tasks(conn: &Connection) -> Result<Vec<Task>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, category, duration, start_epoch, notes,
                created_date, archived, completion_date
         FROM tasks ORDER BY position",
    )?;
    let rows = stmt.query_map([], |row| decode_task(row))?;
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row?);
    }
    Ok(tasks)
}

/// Clear + rewrite the whole collection in one transaction. There is no
/// row-level update; the store contract is read-all/write-all.
pub fn save_tasks(tasks: &[Task], conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM tasks", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO tasks (position, id, name, category, duration, start_epoch,
                                notes, created_date, archived, completion_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )?;
        for (position, task) in tasks.iter().enumerate() {
            stmt.execute(rusqlite::params![
                position as i64,
                task.id,
                task.name,
                task.category,
                timefmt::format_time(task.total_seconds),
                task.start_epoch,
                task.notes,
                timefmt::format_date(task.created_date),
                if task.archived { "True" } else { "False" },
                task.completion_date
                    .map(timefmt::format_date)
                    .unwrap_or_default(),
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}

/// Decode one row, substituting a safe default for any field that fails to
/// parse. The duration string is authoritative for the accumulator; the
/// raw seconds are never stored separately.
fn decode_task(row: &Row<'_>) -> rusqlite::Result<Task> {
    let duration: String = row.get(3).unwrap_or_default();
    let created: String = row.get(6).unwrap_or_default();
    let archived: String = row.get(7).unwrap_or_default();
    let completion: String = row.get(8).unwrap_or_default();
    Ok(Task {
        id: row.get(0).unwrap_or_default(),
        name: row.get(1).unwrap_or_default(),
        category: row.get(2).unwrap_or_default(),
        total_seconds: timefmt::parse_time_str(&duration),
        start_epoch: row.get::<_, f64>(4).unwrap_or(0.0).max(0.0),
        notes: row.get(5).unwrap_or_default(),
        created_date: timefmt::parse_date(&created).unwrap_or_default(),
        archived: archived == "True",
        completion_date: timefmt::parse_date(&completion),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::migrations;
    use chrono::NaiveDate;

    fn test_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        migrations::run_migrations(&conn).unwrap();
        conn
    }

    fn sample_task(id: &str, name: &str) -> Task {
        Task::new(
            id.to_string(),
            name.to_string(),
            "Dev".to_string(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        )
    }

    #[test]
    fn save_and_load_round_trip_preserves_order() {
        let mut conn = test_conn();
        let mut first = sample_task("T1", "Write docs");
        first.total_seconds = 125.0;
        first.notes = "some notes".to_string();
        let mut second = sample_task("T2", "Review");
        second.start_epoch = 1_700_000_000.0;
        second.archived = true;
        second.completion_date = NaiveDate::from_ymd_opt(2024, 4, 1);

        save_tasks(&[first.clone(), second.clone()], &mut conn).unwrap();
        let loaded = load_tasks(&conn).unwrap();

        assert_eq!(loaded, vec![first, second]);
    }

    #[test]
    fn duration_text_is_authoritative_on_load() {
        let mut conn = test_conn();
        save_tasks(&[sample_task("T1", "Write docs")], &mut conn).unwrap();
        conn.execute("UPDATE tasks SET duration = '01:00:00'", [])
            .unwrap();

        let loaded = load_tasks(&conn).unwrap();
        assert_eq!(loaded[0].total_seconds, 3600.0);
    }

    #[test]
    fn corrupted_fields_fall_back_to_defaults() {
        let mut conn = test_conn();
        save_tasks(&[sample_task("T1", "Write docs")], &mut conn).unwrap();
        conn.execute(
            "UPDATE tasks SET duration = 'garbage', start_epoch = 'not a number',
                              created_date = '99/99', archived = 'maybe',
                              completion_date = 'soon'",
            [],
        )
        .unwrap();

        let loaded = load_tasks(&conn).unwrap();
        assert_eq!(loaded[0].total_seconds, 0.0);
        assert_eq!(loaded[0].start_epoch, 0.0);
        assert_eq!(loaded[0].created_date, NaiveDate::default());
        assert!(!loaded[0].archived);
        assert_eq!(loaded[0].completion_date, None);
    }

    #[test]
    fn save_overwrites_previous_collection() {
        let mut conn = test_conn();
        save_tasks(
            &[sample_task("T1", "Write docs"), sample_task("T2", "Review")],
            &mut conn,
        )
        .unwrap();
        save_tasks(&[sample_task("T3", "Deploy")], &mut conn).unwrap();

        let loaded = load_tasks(&conn).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "T3");
    }

    #[test]
    fn duration_persists_as_hms_text() {
        let mut conn = test_conn();
        let mut task = sample_task("T1", "Write docs");
        task.total_seconds = 90_000.0;
        save_tasks(&[task], &mut conn).unwrap();

        let duration: String = conn
            .query_row("SELECT duration FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(duration, "25:00:00");
    }
}
