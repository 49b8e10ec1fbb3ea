//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OpenFlags, Transaction};
use serde::Serialize;
use crate::{Error, Result};
use super::schema;

/// SQLite-backed storage for the e-commerce tables
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an existing database file read-only, without touching its schema
    pub fn open_existing(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::MissingStore(path.to_path_buf()));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema. Safe to call repeatedly.
    pub fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Toggle foreign key enforcement for this connection
    pub fn set_foreign_keys(&self, enabled: bool) -> Result<()> {
        let value = if enabled { "ON" } else { "OFF" };
        self.conn.execute_batch(&format!("PRAGMA foreign_keys = {value}"))?;
        Ok(())
    }

    /// Borrow the underlying connection for read queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    // ========== Bulk Operations ==========

    /// Begin a transaction. Dropping it without `commit` rolls back.
    pub fn transaction(&mut self) -> Result<Transaction<'_>> {
        Ok(self.conn.transaction()?)
    }

    /// Count rows in one of the catalogued tables
    pub fn count_rows(&self, table: &str) -> Result<usize> {
        let schema = schema::table(table).ok_or_else(|| Error::UnknownTable(table.to_string()))?;
        let sql = format!("SELECT COUNT(*) FROM {}", schema::quote_ident(schema.name));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    fn count(&self, sql: &str) -> Result<usize> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<DbStats> {
        let mut tables = Vec::with_capacity(schema::TABLES.len());
        for table in schema::TABLES {
            tables.push(TableCount {
                table: table.name.to_string(),
                rows: self.count_rows(table.name)?,
            });
        }

        Ok(DbStats {
            tables,
            orders_without_customer: self.count(
                "SELECT COUNT(*) FROM orders o LEFT JOIN customers c ON o.customer_id = c.id WHERE c.id IS NULL",
            )?,
            items_without_order: self.count(
                "SELECT COUNT(*) FROM order_items oi LEFT JOIN orders o ON oi.order_id = o.id WHERE o.id IS NULL",
            )?,
            items_without_product: self.count(
                "SELECT COUNT(*) FROM order_items oi LEFT JOIN products p ON oi.product_id = p.id WHERE p.id IS NULL",
            )?,
            payments_without_order: self.count(
                "SELECT COUNT(*) FROM payments pm LEFT JOIN orders o ON pm.order_id = o.id WHERE o.id IS NULL",
            )?,
            orders_without_items: self.count(
                "SELECT COUNT(*) FROM orders o WHERE NOT EXISTS (SELECT 1 FROM order_items oi WHERE oi.order_id = o.id)",
            )?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}

/// Database statistics
#[derive(Debug, Clone, Serialize)]
pub struct DbStats {
    pub tables: Vec<TableCount>,
    pub orders_without_customer: usize,
    pub items_without_order: usize,
    pub items_without_product: usize,
    pub payments_without_order: usize,
    pub orders_without_items: usize,
}

impl DbStats {
    /// Total rows that reference a parent row that is not present
    pub fn orphans(&self) -> usize {
        self.orders_without_customer
            + self.items_without_order
            + self.items_without_product
            + self.payments_without_order
    }
}

#[cfg(test)]
impl SqliteStore {
    fn foreign_keys_enabled(&self) -> Result<bool> {
        let on: i64 = self.conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))?;
        Ok(on == 1)
    }

    fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}
