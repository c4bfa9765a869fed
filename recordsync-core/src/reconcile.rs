use crate::{
    collection::Collection,
    error::{IndexErrors, Result, SyncError},
    executor::Executor,
    index::ParsedIndex,
    sync::Synchronizer,
};

impl<E: Executor + ?Sized> Synchronizer<'_, E> {
    /// Drops the indexes of `collection` that currently exist on its table.
    ///
    /// Statements that cannot be parsed are ignored here; they are reported by
    /// [`Synchronizer::create_indexes`]. Views have no indexes.
    pub async fn drop_indexes(&mut self, collection: &Collection) -> Result<()> {
        if collection.is_view() {
            return Ok(());
        }

        let dialect = self.executor.dialect();
        let table = collection.table_name();

        for raw in collection.indexes.iter() {
            let mut parsed = ParsedIndex::parse(raw);
            parsed.table_name = table.to_owned();

            if !parsed.is_valid() {
                continue;
            }

            let exists = self
                .executor
                .index_exists(table, &parsed.index_name)
                .await
                .map_err(|source| SyncError::Statement {
                    action: "look up index",
                    target: parsed.index_name.to_owned(),
                    source,
                })?;

            if !exists {
                continue;
            }

            let sql = dialect.drop_index_sql(table, &parsed.index_name);
            self.exec("drop index", &parsed.index_name, &sql).await?;
            self.report.dropped_indexes.push(parsed.index_name);
        }

        Ok(())
    }

    /// (Re)creates every index of `collection`.
    ///
    /// Each index is attempted independently. Statements that do not parse and statements the
    /// backend rejects are collected and returned together as [`SyncError::Indexes`] once
    /// all indexes were attempted; the indexes that could be created stay in place.
    pub async fn create_indexes(&mut self, collection: &Collection) -> Result<()> {
        if collection.is_view() {
            return Ok(());
        }

        // an index may reuse the name of one that is still around
        self.drop_indexes(collection).await?;

        let dialect = self.executor.dialect();
        let mut errors = IndexErrors::new();

        for (position, raw) in collection.indexes.iter().enumerate() {
            let mut parsed = ParsedIndex::parse(raw);
            parsed.table_name = collection.table_name().to_owned();

            let Some(sql) = parsed.build(dialect) else {
                tracing::warn!(collection = %collection.name, position, "invalid index expression");
                errors.add(position, "Invalid CREATE INDEX expression.");
                continue;
            };

            tracing::debug!(index = %parsed.index_name, sql = %sql, "creating index");

            if let Err(err) = self.executor.execute(&sql).await {
                tracing::warn!(
                    collection = %collection.name,
                    index = %parsed.index_name,
                    error = %err,
                    "failed to create index"
                );
                errors.add(
                    position,
                    format!("Failed to create index {} - {err}.", parsed.index_name),
                );
                continue;
            }

            self.report.created_indexes.push(parsed.index_name);
        }

        errors.into_result()
    }
}
