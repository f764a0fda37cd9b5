//! Category collection storage

#![allow(clippy::cast_possible_wrap)] // SQLite stores positions as i64

use crate::error::{Error, Result};
use crate::models::CategoryConfig;
use rusqlite::{params, Connection};

/// Whole-collection storage for category definitions
pub trait CategoryRepository {
    /// Read every stored category in display order
    fn read_all(&self) -> Result<Vec<CategoryConfig>>;

    /// Atomically clear and rewrite the collection
    fn replace_all(&self, categories: &[CategoryConfig]) -> Result<()>;
}

/// `SQLite` implementation of `CategoryRepository`
pub struct SqliteCategoryRepository<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteCategoryRepository<'a> {
    /// Create a new repository with the given connection
    pub const fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn read_all(&self) -> Result<Vec<CategoryConfig>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM categories ORDER BY position ASC")?;

        let payloads = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        payloads
            .iter()
            .map(|payload| serde_json::from_str::<CategoryConfig>(payload).map_err(Error::from))
            .collect()
    }

    fn replace_all(&self, categories: &[CategoryConfig]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM categories", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO categories (id, position, data) VALUES (?1, ?2, ?3)")?;
            for (position, category) in categories.iter().enumerate() {
                stmt.execute(params![
                    category.id,
                    position as i64,
                    serde_json::to_string(category)?,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::models::default_categories;

    #[test]
    fn test_replace_and_read_categories() {
        let db = Database::open_in_memory().unwrap();
        let repo = SqliteCategoryRepository::new(db.connection());

        assert!(repo.read_all().unwrap().is_empty());

        let categories = default_categories();
        repo.replace_all(&categories).unwrap();
        assert_eq!(repo.read_all().unwrap(), categories);

        repo.replace_all(&categories[..1]).unwrap();
        assert_eq!(repo.read_all().unwrap().len(), 1);
    }
}
