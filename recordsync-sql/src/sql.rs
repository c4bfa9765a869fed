//! Pool level entry points of the synchronization engine.

use recordsync_core::{Collection, Dialect, Result, SyncConfig, SyncError, SyncReport, Synchronizer};
use sqlx::{Database, Pool};

use crate::executor::SqlExecutor;

/// Type alias for MySQL.
///
/// Equivalent to `Sql<sqlx::MySql>`.
#[cfg(feature = "mysql")]
pub type MySql = Sql<sqlx::MySql>;

/// Type alias for SQLite.
///
/// Equivalent to `Sql<sqlx::Sqlite>`.
#[cfg(feature = "sqlite")]
pub type Sqlite = Sql<sqlx::Sqlite>;

/// One column of a record table as reported by the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct TableInfoRow {
    pub position: i64,
    pub name: String,
    pub data_type: String,
    pub not_null: i64,
    pub default_value: Option<String>,
    pub pk: i64,
}

impl TableInfoRow {
    pub fn is_not_null(&self) -> bool {
        self.not_null != 0
    }

    pub fn is_primary_key(&self) -> bool {
        self.pk != 0
    }
}

/// Record table synchronization over a SQLx connection pool.
///
/// # Example
///
/// ```rust,ignore
/// use sqlx::sqlite::SqlitePoolOptions;
///
/// let pool = SqlitePoolOptions::new().connect(":memory:").await?;
/// let sql: recordsync_sql::Sqlite = pool.into();
///
/// // first version of the collection
/// sql.sync(&posts, None).await?;
///
/// // later edits
/// sql.sync(&edited, Some(&posts)).await?;
/// ```
///
/// Every [`Sql::sync`] call runs in its own transaction which is committed only when the
/// whole transition succeeded. MySQL commits DDL statements implicitly, so a failed run
/// may leave the statements issued before the failure applied there.
pub struct Sql<DB: Database> {
    pool: Pool<DB>,
    config: SyncConfig,
}

impl<DB: Database> Sql<DB> {
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool<DB> {
        &self.pool
    }

    /// Dialect matching `DB`.
    pub fn dialect() -> Result<Dialect> {
        Dialect::from_name(DB::NAME)
            .ok_or_else(|| SyncError::UnsupportedDatabase(DB::NAME.to_owned()))
    }
}

impl<DB> Sql<DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
    TableInfoRow: for<'r> sqlx::FromRow<'r, DB::Row>,
{
    /// Synchronizes the record table of `new` inside a dedicated transaction.
    ///
    /// With `old` set to `None` the table is created. On any error, index errors
    /// included, the transaction is rolled back.
    pub async fn sync(&self, new: &Collection, old: Option<&Collection>) -> Result<SyncReport> {
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        let result = self.sync_in(&mut *tx, new, old).await;

        match result {
            Ok(report) => {
                tx.commit().await.map_err(anyhow::Error::from)?;

                Ok(report)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(
                        collection = %new.name,
                        error = %rollback_err,
                        "failed to roll back synchronization"
                    );
                }

                tracing::warn!(collection = %new.name, error = %err, "synchronization rolled back");

                Err(err)
            }
        }
    }

    /// Synchronizes the record table of `new` on a connection owned by the caller.
    ///
    /// Nothing is committed or rolled back, which lets the caller persist the collection
    /// itself in the same transaction.
    pub async fn sync_in(
        &self,
        conn: &mut DB::Connection,
        new: &Collection,
        old: Option<&Collection>,
    ) -> Result<SyncReport> {
        let mut executor = SqlExecutor::<DB>::new(conn, Self::dialect()?);
        let mut synchronizer = Synchronizer::new(&mut executor, &self.config);
        synchronizer.synchronize(new, old).await?;

        Ok(synchronizer.into_report())
    }

    /// Drops and recreates the indexes of `collection`.
    ///
    /// The indexes that could be created are committed even when others failed; the
    /// failures are returned as [`SyncError::Indexes`].
    pub async fn reconcile_indexes(&self, collection: &Collection) -> Result<SyncReport> {
        let dialect = Self::dialect()?;
        let mut tx = self.pool.begin().await.map_err(anyhow::Error::from)?;

        let (result, report) = {
            let mut executor = SqlExecutor::<DB>::new(&mut *tx, dialect);
            let mut synchronizer = Synchronizer::new(&mut executor, &self.config);
            let result = synchronizer.create_indexes(collection).await;

            (result, synchronizer.into_report())
        };

        match result {
            Ok(()) => {
                tx.commit().await.map_err(anyhow::Error::from)?;

                Ok(report)
            }
            Err(err @ SyncError::Indexes(_)) => {
                tx.commit().await.map_err(anyhow::Error::from)?;

                Err(err)
            }
            Err(err) => {
                tx.rollback().await.map_err(anyhow::Error::from)?;

                Err(err)
            }
        }
    }

    /// Whether a table or view named `table` exists.
    pub async fn has_table(&self, table: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await.map_err(anyhow::Error::from)?;
        let mut executor = SqlExecutor::<DB>::new(&mut *conn, Self::dialect()?);

        Ok(recordsync_core::Executor::table_exists(&mut executor, table).await?)
    }

    /// Whether `table` has an index named `index`.
    pub async fn has_index(&self, table: &str, index: &str) -> Result<bool> {
        let mut conn = self.pool.acquire().await.map_err(anyhow::Error::from)?;
        let mut executor = SqlExecutor::<DB>::new(&mut *conn, Self::dialect()?);

        Ok(recordsync_core::Executor::index_exists(&mut executor, table, index).await?)
    }

    /// Columns of `table` in table order.
    pub async fn table_info(&self, table: &str) -> Result<Vec<TableInfoRow>> {
        let sql = Self::dialect()?.table_info_sql();
        let rows = sqlx::query_as::<DB, TableInfoRow>(sql)
            .bind(table.to_owned())
            .fetch_all(&self.pool)
            .await
            .map_err(anyhow::Error::from)?;

        Ok(rows)
    }

    /// Column names of `table` in table order.
    pub async fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let rows = self.table_info(table).await?;

        Ok(rows.into_iter().map(|row| row.name).collect())
    }
}

impl<DB: Database> Clone for Sql<DB> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            config: self.config.clone(),
        }
    }
}

impl<DB: Database> From<Pool<DB>> for Sql<DB> {
    fn from(pool: Pool<DB>) -> Self {
        Self {
            pool,
            config: SyncConfig::default(),
        }
    }
}
