//! Recipe model
//!
//! Represents a named ingredient list. Cost is never cached: it is computed
//! on demand from the current inventory snapshot.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub name: String,
    pub notes: Option<String>,
}

/// Data for updating a recipe's metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
}

impl Recipe {
    /// Create a Recipe from a database row
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new recipe into the database
    pub fn create(conn: &Connection, data: &RecipeCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO recipes (name, notes) VALUES (?1, ?2)",
            params![data.name, data.notes],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List recipes with optional name search
    pub fn list(
        conn: &Connection,
        query: Option<&str>,
        sort_by: &str,
        sort_order: &str,
        limit: i64,
        offset: i64,
    ) -> DbResult<Vec<Self>> {
        let order = if sort_order.to_lowercase() == "desc" { "DESC" } else { "ASC" };
        let sort_col = match sort_by.to_lowercase().as_str() {
            "created_at" => "created_at",
            _ => "name",
        };

        let recipes = if let Some(q) = query {
            let sql = format!(
                "SELECT * FROM recipes WHERE name LIKE ?1 ORDER BY {} {} LIMIT ?2 OFFSET ?3",
                sort_col, order
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![format!("%{}%", q), limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        } else {
            let sql = format!(
                "SELECT * FROM recipes ORDER BY {} {} LIMIT ?1 OFFSET ?2",
                sort_col, order
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![limit, offset], Self::from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            rows
        };

        Ok(recipes)
    }

    /// Update recipe metadata
    pub fn update(conn: &Connection, id: i64, data: &RecipeUpdate) -> DbResult<Option<Self>> {
        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref name) = data.name {
            updates.push(format!("name = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(name.clone()));
        }
        if let Some(ref notes) = data.notes {
            updates.push(format!("notes = ?{}", params_vec.len() + 1));
            params_vec.push(Box::new(notes.clone()));
        }

        if updates.is_empty() {
            return Self::get_by_id(conn, id);
        }

        updates.push("updated_at = datetime('now')".to_string());

        let sql = format!(
            "UPDATE recipes SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len() + 1
        );

        params_vec.push(Box::new(id));

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Count recipes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Delete a recipe (cascades to its ingredient rows)
    ///
    /// Returns Ok(true) if deleted, Ok(false) if not found.
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
