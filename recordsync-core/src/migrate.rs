//! Column level migration with collision free renames.
//!
//! Added and renamed columns first receive a temporary name and only get their final name
//! once every drop, add and rename of the run has been issued. Direct renames would fail,
//! or silently hit the wrong column, when names are swapped (`name, title -> title, name`)
//! or a name that was just vacated is reused by another field.

use crate::{
    diff::SchemaDiff, error::Result, executor::Executor, random::pseudorandom_string,
    sync::Synchronizer,
};

/// Temporary to final column names of one migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenamePlan {
    entries: Vec<(String, String)>,
}

impl RenamePlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a fresh temporary name for `final_name` and returns it.
    ///
    /// The suffix is at least one character long so the temporary name never equals
    /// `final_name`.
    pub fn stage(&mut self, final_name: &str, suffix_len: usize) -> String {
        let suffix_len = suffix_len.max(1);

        loop {
            let temp = format!("{final_name}{}", pseudorandom_string(suffix_len));

            if !self.contains_temp(&temp) {
                self.entries.push((temp.to_owned(), final_name.to_owned()));

                return temp;
            }
        }
    }

    pub fn contains_temp(&self, temp: &str) -> bool {
        self.entries.iter().any(|(t, _)| t == temp)
    }

    /// `(temporary, final)` pairs in staging order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, f)| (t.as_str(), f.as_str()))
    }
}

impl<E: Executor + ?Sized> Synchronizer<'_, E> {
    /// Applies the table rename and the column changes of `diff` to `table`.
    ///
    /// `table` is the new table name; when the collection was renamed the table is renamed
    /// before any column is touched.
    pub async fn migrate_columns(&mut self, diff: &SchemaDiff<'_>, table: &str) -> Result<()> {
        let dialect = self.executor.dialect();
        let suffix_len = self.config.temp_suffix_len;

        if let Some((from, to)) = diff.table_rename {
            let sql = dialect.rename_table_sql(from, to);
            self.exec("rename table", from, &sql).await?;
            self.report.renamed_table = Some((from.to_owned(), to.to_owned()));
        }

        for field in diff.removed.iter() {
            let sql = dialect.drop_column_sql(table, &field.name);
            self.exec("drop column", &field.name, &sql).await?;
            self.report.dropped_columns.push(field.name.to_owned());
        }

        let mut plan = RenamePlan::new();

        for field in diff.added.iter() {
            let temp = plan.stage(&field.name, suffix_len);
            let sql = dialect.add_column_sql(table, &temp, field.column_definition(dialect));
            self.exec("add column", &field.name, &sql).await?;
            self.report.added_columns.push(field.name.to_owned());
        }

        for (old, new) in diff.renamed.iter() {
            let temp = plan.stage(&new.name, suffix_len);
            let sql = dialect.rename_column_sql(table, &old.name, &temp);
            self.exec("rename column", &old.name, &sql).await?;
            self.report
                .renamed_columns
                .push((old.name.to_owned(), new.name.to_owned()));
        }

        for (temp, final_name) in plan.iter() {
            let sql = dialect.rename_column_sql(table, temp, final_name);
            self.exec("rename column", temp, &sql).await?;
        }

        Ok(())
    }
}
