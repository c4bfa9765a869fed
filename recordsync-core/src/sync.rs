//! Orchestration of a synchronization run.
//!
//! A [`Synchronizer`] borrows an [`Executor`] for the duration of one run and issues every
//! statement through it. It never commits anything itself: the executor is expected to
//! wrap a transaction which the caller commits when [`Synchronizer::synchronize`]
//! succeeds and rolls back otherwise.

use serde::Serialize;

use crate::{
    collection::Collection,
    config::SyncConfig,
    diff::SchemaDiff,
    error::{Result, SyncError},
    executor::Executor,
};

/// Everything a synchronization run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub created_table: Option<String>,
    pub renamed_table: Option<(String, String)>,
    pub dropped_columns: Vec<String>,
    pub added_columns: Vec<String>,
    pub renamed_columns: Vec<(String, String)>,
    pub normalized_fields: Vec<String>,
    pub dropped_indexes: Vec<String>,
    pub created_indexes: Vec<String>,
}

impl SyncReport {
    /// `true` when no table, column or index was touched.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Applies collection schema transitions through an [`Executor`].
pub struct Synchronizer<'a, E: Executor + ?Sized> {
    pub(crate) executor: &'a mut E,
    pub(crate) config: &'a SyncConfig,
    pub(crate) report: SyncReport,
}

impl<'a, E: Executor + ?Sized> Synchronizer<'a, E> {
    pub fn new(executor: &'a mut E, config: &'a SyncConfig) -> Self {
        Self {
            executor,
            config,
            report: SyncReport::default(),
        }
    }

    /// Brings the record table of `new` in line with the schema transition `old -> new`.
    ///
    /// Without `old` the table is created from scratch. Otherwise the steps run in this
    /// order: drop the old indexes, rename the table, migrate the columns, normalize the
    /// fields whose cardinality changed and finally recreate the indexes of `new`.
    pub async fn synchronize(&mut self, new: &Collection, old: Option<&Collection>) -> Result<()> {
        let Some(old) = old else {
            self.create_table(new).await?;

            tracing::info!(
                collection = %new.name,
                fields = new.fields.len(),
                indexes = self.report.created_indexes.len(),
                "record table created"
            );

            return Ok(());
        };

        self.drop_indexes(old).await?;

        let diff = SchemaDiff::new(old, new);
        self.migrate_columns(&diff, new.table_name()).await?;

        self.normalize_cardinality(new, Some(old)).await?;

        self.create_indexes(new).await?;

        tracing::info!(
            collection = %new.name,
            dropped = self.report.dropped_columns.len(),
            added = self.report.added_columns.len(),
            renamed = self.report.renamed_columns.len(),
            normalized = self.report.normalized_fields.len(),
            "record table synchronized"
        );

        Ok(())
    }

    pub fn report(&self) -> &SyncReport {
        &self.report
    }

    pub fn into_report(self) -> SyncReport {
        self.report
    }

    /// Runs one DDL statement, wrapping failures with what was being done to whom.
    pub(crate) async fn exec(
        &mut self,
        action: &'static str,
        target: &str,
        sql: &str,
    ) -> Result<()> {
        tracing::debug!(action, object = target, sql, "executing statement");

        self.executor
            .execute(sql)
            .await
            .map_err(|source| SyncError::Statement {
                action,
                target: target.to_owned(),
                source,
            })?;

        Ok(())
    }
}
