use async_trait::async_trait;

use crate::dialect::Dialect;

/// Statement execution primitive the engine runs against.
///
/// An executor usually wraps an open transaction: every statement issued through it
/// belongs to the same unit of work, and committing or rolling it back is the job of
/// whoever created it.
#[async_trait]
pub trait Executor: Send {
    /// SQL dialect of the underlying backend.
    fn dialect(&self) -> Dialect;

    /// Executes an engine built statement.
    async fn execute(&mut self, sql: &str) -> anyhow::Result<()>;

    /// Runs a `SELECT COUNT(*)` style query with positional `?` parameters.
    async fn fetch_count(&mut self, sql: &str, params: Vec<String>) -> anyhow::Result<i64>;

    /// Whether the catalog knows an index named `index` on `table`.
    async fn index_exists(&mut self, table: &str, index: &str) -> anyhow::Result<bool> {
        let sql = self.dialect().index_exists_sql();
        let count = self
            .fetch_count(sql, vec![table.to_owned(), index.to_owned()])
            .await?;

        Ok(count > 0)
    }

    /// Whether the catalog knows a table or view named `table`.
    async fn table_exists(&mut self, table: &str) -> anyhow::Result<bool> {
        let sql = self.dialect().table_exists_sql();
        let count = self.fetch_count(sql, vec![table.to_owned()]).await?;

        Ok(count > 0)
    }
}
