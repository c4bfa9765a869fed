//! Record table synchronization for collection schemas.
//!
//! A collection describes a record table: a name, a kind (`base`, `auth` or `view`), an
//! ordered list of typed fields and a list of `CREATE INDEX` statements. Whenever a
//! collection is created or edited its table has to follow. This crate computes what
//! changed between two versions of a collection and issues the DDL that brings the table in
//! line, without losing the data stored in surviving columns.
//!
//! The crate is backend agnostic: statements go through the [`Executor`] trait, and the
//! [`Dialect`] it reports decides how identifiers are quoted and columns are typed.
//! `recordsync-sql` implements the trait for sqlx pools (MySQL and SQLite).
//!
//! # Core Concepts
//!
//! ## Collections and fields
//!
//! ```rust,ignore
//! use recordsync_core::{Collection, CollectionKind, Field, FieldType};
//!
//! let posts = Collection::new("posts", CollectionKind::Base)
//!     .field(Field::new("f1", "title", FieldType::Text))
//!     .field(Field::new("f2", "tags", FieldType::Select).max_select(3))
//!     .index("CREATE INDEX idx_title ON posts (title)");
//! ```
//!
//! Fields are matched across versions by their id, never by name, so renaming a field
//! renames its column and keeps its values.
//!
//! ## Synchronizer
//!
//! [`Synchronizer::synchronize`] runs a full transition:
//!
//! 1. drop the indexes of the previous version
//! 2. rename the table and migrate its columns ([`SchemaDiff`])
//! 3. convert the values of fields that switched between single and multiple
//! 4. recreate the indexes of the new version
//!
//! ```rust,ignore
//! let config = SyncConfig::default();
//! let mut sync = Synchronizer::new(&mut executor, &config);
//! sync.synchronize(&new, Some(&old)).await?;
//!
//! println!("{:?}", sync.report());
//! ```
//!
//! Nothing is committed by the engine: run it inside a transaction and discard the
//! transaction when an error comes back.
//!
//! ## Index errors
//!
//! Index problems do not abort index creation. They are gathered per index position into
//! [`IndexErrors`] and returned as [`SyncError::Indexes`] after every index was attempted.

mod collection;
mod config;
mod create;
mod dialect;
mod diff;
mod error;
mod executor;
mod field;
mod index;
mod migrate;
mod normalize;
mod random;
mod reconcile;
mod sync;

pub use collection::*;
pub use config::*;
pub use dialect::*;
pub use diff::*;
pub use error::*;
pub use executor::*;
pub use field::*;
pub use index::*;
pub use migrate::*;
pub use random::*;
pub use sync::*;
