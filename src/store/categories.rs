/// Category collection persistence.
use anyhow::Result;
use rusqlite::Connection;

use crate::types::Category;

pub fn load_categories(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt =
        conn.prepare("SELECT name, description FROM categories ORDER BY position")?;
    let rows = stmt.query_map([], |row| {
        Ok(Category {
            name: row.get(0)?,
            description: row.get(1).unwrap_or_default(),
        })
    })?;
    let mut categories = Vec::new();
    for row in rows {
        categories.push(row?);
    }
    Ok(categories)
}

/// Clear + rewrite, same contract as the task collection.
pub fn save_categories(categories: &[Category], conn: &mut Connection) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM categories", [])?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO categories (position, name, description) VALUES (?1, ?2, ?3)",
        )?;
        for (position, category) in categories.iter().enumerate() {
            stmt.execute(rusqlite::params![
                position as i64,
                category.name,
                category.description,
            ])?;
        }
    }
    tx.commit()?;
    Ok(())
}
