//! Product Storage
//! Mission: Persist the product catalogue in SQLite

use crate::models::{Product, ProductInput};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Clone)]
pub struct ProductStore {
    conn: Arc<Mutex<Connection>>,
}

impl ProductStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let conn = Connection::open(db_path).context("open product db")?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS products (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                price REAL NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub async fn list(&self) -> Result<Vec<Product>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, name, price, created_at, updated_at
             FROM products ORDER BY rowid ASC",
        )?;
        let products = stmt
            .query_map([], product_from_row)?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to list products")?;
        Ok(products)
    }

    #[cfg(test)]
    async fn get(&self, id: &str) -> Result<Option<Product>> {
        let conn = self.conn.lock().await;
        conn.query_row(
            "SELECT id, name, price, created_at, updated_at FROM products WHERE id = ?1",
            params![id],
            product_from_row,
        )
        .optional()
        .context("Failed to load product")
    }

    pub async fn create(&self, input: &ProductInput) -> Result<Product> {
        let now = Utc::now().to_rfc3339();
        let product = Product {
            id: Uuid::new_v4().to_string(),
            name: input.name.clone(),
            price: input.price,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO products (id, name, price, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                product.id,
                product.name,
                product.price,
                product.created_at,
                product.updated_at,
            ],
        )
        .context("Failed to insert product")?;

        Ok(product)
    }

    /// Returns `None` when no product has this id.
    pub async fn update(&self, id: &str, input: &ProductInput) -> Result<Option<Product>> {
        let conn = self.conn.lock().await;
        let updated = conn
            .execute(
                "UPDATE products SET name = ?1, price = ?2, updated_at = ?3 WHERE id = ?4",
                params![input.name, input.price, Utc::now().to_rfc3339(), id],
            )
            .context("Failed to update product")?;

        if updated == 0 {
            return Ok(None);
        }

        conn.query_row(
            "SELECT id, name, price, created_at, updated_at FROM products WHERE id = ?1",
            params![id],
            product_from_row,
        )
        .optional()
        .context("Failed to reload product")
    }

    /// Returns `false` when no product has this id.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let conn = self.conn.lock().await;
        let deleted = conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])
            .context("Failed to delete product")?;
        Ok(deleted > 0)
    }
}

fn product_from_row(row: &Row<'_>) -> rusqlite::Result<Product> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}
