//! SQLx backed record table synchronization.
//!
//! This crate runs the `recordsync-core` engine on MySQL and SQLite through sqlx.
//!
//! # Features
//!
//! - **`mysql`** - Enables MySQL support
//! - **`sqlite`** - Enables SQLite support
//!
//! Both features are enabled by default.
//!
//! # Usage
//!
//! [`Sql<DB>`] wraps a connection pool and opens one transaction per synchronization:
//!
//! ```rust,ignore
//! use recordsync_sql::Sql;
//! use sqlx::sqlite::SqlitePoolOptions;
//!
//! let pool = SqlitePoolOptions::new().connect(":memory:").await?;
//! let sql: Sql<sqlx::Sqlite> = pool.into();
//!
//! let report = sql.sync(&new, Some(&old)).await?;
//! ```
//!
//! When the collection record itself is saved in a transaction of your own, use
//! [`Sql::sync_in`] with that transaction's connection, or build a [`SqlExecutor`] and
//! drive a [`Synchronizer`](recordsync_core::Synchronizer) directly.
//!
//! ## Type Aliases
//!
//! - [`Sqlite`] - `Sql<sqlx::Sqlite>`
//! - [`MySql`] - `Sql<sqlx::MySql>`

mod executor;
mod sql;

pub use executor::*;
pub use sql::*;
