//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - customers(id, first_name, last_name, email, phone, signup_date, country)
//! - products(id, product_name, category, price, sku, stock)
//! - orders(id, customer_id, order_date, status, total_amount)
//! - order_items(id, order_id, product_id, quantity, unit_price)
//! - payments(id, order_id, payment_date, amount, payment_method, status, transaction_id)

pub mod schema;
pub mod sqlite;

pub use schema::{TableSchema, TABLES};
pub use sqlite::{DbStats, SqliteStore};
