use crate::{
    collection::Collection,
    error::{Result, SyncError},
    executor::Executor,
    field::{
        FIELD_NAME_CREATED, FIELD_NAME_EMAIL, FIELD_NAME_ID, FIELD_NAME_TOKEN_KEY,
        FIELD_NAME_UPDATED, FIELD_NAME_USERNAME, FIELD_NAME_VALUE,
    },
    sync::Synchronizer,
};

impl<E: Executor + ?Sized> Synchronizer<'_, E> {
    /// Creates the record table of a collection that has no previous version.
    ///
    /// The table starts with the system columns, followed by the auth columns for auth
    /// collections, the `value` column of the params collection and one column per field.
    /// Auth collections also get unique indexes on `username`, `email` and `tokenKey`
    /// whose names embed the collection id, so two auth collections never clash.
    pub async fn create_table(&mut self, collection: &Collection) -> Result<()> {
        if !collection.has_id() {
            return Err(SyncError::MissingId(collection.name.to_owned()));
        }

        let dialect = self.executor.dialect();
        let table = collection.table_name();

        let mut columns = vec![
            (FIELD_NAME_ID, dialect.id_column()),
            (FIELD_NAME_CREATED, dialect.timestamp_column()),
            (FIELD_NAME_UPDATED, dialect.timestamp_column()),
        ];

        if collection.is_auth() {
            columns.extend(dialect.auth_columns());
        }

        if collection.name == self.config.params_collection {
            columns.push((FIELD_NAME_VALUE, dialect.params_value_column()));
        }

        for field in collection.fields.iter() {
            columns.push((field.name.as_str(), field.column_definition(dialect)));
        }

        let definitions = columns
            .iter()
            .map(|(name, definition)| format!("{} {definition}", dialect.quote(name)))
            .collect::<Vec<_>>()
            .join(", ");

        let sql = format!("CREATE TABLE {} ({definitions})", dialect.quote(table));
        self.exec("create table", table, &sql).await?;
        self.report.created_table = Some(table.to_owned());

        if collection.is_auth() && self.config.auth_unique_indexes {
            for column in [FIELD_NAME_USERNAME, FIELD_NAME_EMAIL, FIELD_NAME_TOKEN_KEY] {
                let name = format!("_{}_{column}_idx", collection.id);
                let sql = format!(
                    "CREATE UNIQUE INDEX {} ON {} ({})",
                    dialect.quote(&name),
                    dialect.quote(table),
                    dialect.quote(column)
                );

                self.exec("create index", &name, &sql).await?;
                self.report.created_indexes.push(name);
            }
        }

        self.create_indexes(collection).await
    }
}
