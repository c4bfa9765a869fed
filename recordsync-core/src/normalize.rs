use crate::{
    collection::Collection, diff::cardinality_changes, error::Result, executor::Executor,
    random::pseudorandom_string, sync::Synchronizer,
};

impl<E: Executor + ?Sized> Synchronizer<'_, E> {
    /// Converts the columns of fields that switched between single and multiple values.
    ///
    /// Each affected column is rebuilt as: add a temporary column with the new definition,
    /// copy the normalized values over, drop the original and rename the temporary column
    /// back. Going from multiple to single keeps only the first element of every array;
    /// values that are not JSON arrays are copied unchanged.
    ///
    /// Views and brand new collections are skipped.
    pub async fn normalize_cardinality(
        &mut self,
        new: &Collection,
        old: Option<&Collection>,
    ) -> Result<()> {
        let Some(old) = old else {
            return Ok(());
        };

        if new.is_view() {
            return Ok(());
        }

        let dialect = self.executor.dialect();
        let table = new.table_name();

        for change in cardinality_changes(old, new) {
            let original = change.new.name.as_str();
            let temp = format!(
                "_{original}{}",
                pseudorandom_string(self.config.temp_suffix_len.max(1))
            );

            let sql = dialect.add_column_sql(table, &temp, change.new.column_definition(dialect));
            self.exec("add column", &temp, &sql).await?;

            let source = dialect.quote(original);
            let value = if change.to_multiple() {
                dialect.to_multiple_expr(&source)
            } else {
                dialect.to_single_expr(&source)
            };

            let sql = format!(
                "UPDATE {} SET {} = ({value})",
                dialect.quote(table),
                dialect.quote(&temp)
            );
            self.exec("normalize column", original, &sql).await?;

            let sql = dialect.drop_column_sql(table, original);
            self.exec("drop column", original, &sql).await?;

            let sql = dialect.rename_column_sql(table, &temp, original);
            self.exec("rename column", &temp, &sql).await?;

            tracing::debug!(
                table,
                field = original,
                to_multiple = change.to_multiple(),
                "field cardinality normalized"
            );

            self.report.normalized_fields.push(original.to_owned());
        }

        Ok(())
    }
}
