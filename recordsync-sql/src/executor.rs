use recordsync_core::{Dialect, Executor};
use sqlx::Database;

/// [`Executor`] running statements on a borrowed sqlx connection.
///
/// Pass the connection of an open transaction to keep every statement of a run in the same
/// unit of work.
pub struct SqlExecutor<'c, DB: Database> {
    conn: &'c mut DB::Connection,
    dialect: Dialect,
}

impl<'c, DB: Database> SqlExecutor<'c, DB> {
    pub fn new(conn: &'c mut DB::Connection, dialect: Dialect) -> Self {
        Self { conn, dialect }
    }
}

#[async_trait::async_trait]
impl<DB> Executor for SqlExecutor<'_, DB>
where
    DB: Database,
    for<'e> &'e mut DB::Connection: sqlx::Executor<'e, Database = DB>,
    for<'q> DB::Arguments<'q>: sqlx::IntoArguments<'q, DB>,
    String: for<'q> sqlx::Encode<'q, DB> + sqlx::Type<DB>,
    (i64,): for<'r> sqlx::FromRow<'r, DB::Row>,
{
    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn execute(&mut self, sql: &str) -> anyhow::Result<()> {
        sqlx::query(sql).execute(&mut *self.conn).await?;

        Ok(())
    }

    async fn fetch_count(&mut self, sql: &str, params: Vec<String>) -> anyhow::Result<i64> {
        let mut query = sqlx::query_as::<DB, (i64,)>(sql);

        for param in params {
            query = query.bind(param);
        }

        let (count,) = query.fetch_one(&mut *self.conn).await?;

        Ok(count)
    }
}
