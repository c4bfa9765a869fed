//! Backend specific SQL vocabulary.
//!
//! The engine only ever builds statements through a [`Dialect`], which knows how to quote
//! identifiers, which column definitions the system columns use and how the catalog of the
//! backend is queried.

use std::fmt;

/// SQL backend family targeted by the generated statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    /// MySQL 8 and compatible servers.
    #[default]
    MySql,
    /// SQLite 3.35 or newer (`DROP COLUMN` and the JSON functions are required).
    Sqlite,
}

impl Dialect {
    /// Resolves a dialect from a sqlx `Database::NAME`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "MySQL" => Some(Self::MySql),
            "SQLite" => Some(Self::Sqlite),
            _ => None,
        }
    }

    /// Quotes an identifier with backticks, doubling any embedded backtick.
    ///
    /// SQLite reads an unknown double quoted name as a string literal, a backtick quoted one
    /// is always an identifier.
    pub fn quote(&self, ident: &str) -> String {
        format!("`{}`", ident.replace('`', "``"))
    }

    pub fn id_column(&self) -> &'static str {
        match self {
            Self::MySql => "VARCHAR(100) NOT NULL PRIMARY KEY",
            Self::Sqlite => "TEXT PRIMARY KEY DEFAULT ('r'||lower(hex(randomblob(7)))) NOT NULL",
        }
    }

    pub fn timestamp_column(&self) -> &'static str {
        match self {
            Self::MySql => "TIMESTAMP DEFAULT NOW() NOT NULL",
            Self::Sqlite => "TEXT DEFAULT (strftime('%Y-%m-%d %H:%M:%fZ')) NOT NULL",
        }
    }

    /// Column definitions added to every auth collection, in creation order.
    pub fn auth_columns(&self) -> [(&'static str, &'static str); 8] {
        use crate::field::*;

        match self {
            Self::MySql => [
                (FIELD_NAME_USERNAME, "VARCHAR(255) NOT NULL"),
                (FIELD_NAME_EMAIL, "VARCHAR(100) NOT NULL"),
                (FIELD_NAME_EMAIL_VISIBILITY, "TINYINT(1) NOT NULL DEFAULT 0"),
                (FIELD_NAME_VERIFIED, "TINYINT(1) NOT NULL DEFAULT 0"),
                (FIELD_NAME_TOKEN_KEY, "VARCHAR(255) NOT NULL"),
                (FIELD_NAME_PASSWORD_HASH, "TEXT NOT NULL"),
                (FIELD_NAME_LAST_RESET_SENT_AT, "TEXT NOT NULL"),
                (FIELD_NAME_LAST_VERIFICATION_SENT_AT, "TEXT NOT NULL"),
            ],
            Self::Sqlite => [
                (FIELD_NAME_USERNAME, "TEXT NOT NULL"),
                (FIELD_NAME_EMAIL, "TEXT DEFAULT '' NOT NULL"),
                (FIELD_NAME_EMAIL_VISIBILITY, "BOOLEAN DEFAULT FALSE NOT NULL"),
                (FIELD_NAME_VERIFIED, "BOOLEAN DEFAULT FALSE NOT NULL"),
                (FIELD_NAME_TOKEN_KEY, "TEXT NOT NULL"),
                (FIELD_NAME_PASSWORD_HASH, "TEXT NOT NULL"),
                (FIELD_NAME_LAST_RESET_SENT_AT, "TEXT DEFAULT '' NOT NULL"),
                (FIELD_NAME_LAST_VERIFICATION_SENT_AT, "TEXT DEFAULT '' NOT NULL"),
            ],
        }
    }

    /// Definition of the `value` column of the params collection.
    pub fn params_value_column(&self) -> &'static str {
        match self {
            Self::MySql => "JSON NOT NULL",
            Self::Sqlite => "JSON DEFAULT NULL",
        }
    }

    /// Counts the indexes named `?2` on table `?1`.
    pub fn index_exists_sql(&self) -> &'static str {
        match self {
            Self::MySql => {
                "SELECT COUNT(*) FROM information_schema.STATISTICS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? AND INDEX_NAME = ?"
            }
            Self::Sqlite => {
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type = 'index' AND LOWER(tbl_name) = LOWER(?) AND LOWER(name) = LOWER(?)"
            }
        }
    }

    /// Counts the tables or views named `?1`.
    pub fn table_exists_sql(&self) -> &'static str {
        match self {
            Self::MySql => {
                "SELECT COUNT(*) FROM information_schema.TABLES \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ?"
            }
            Self::Sqlite => {
                "SELECT COUNT(*) FROM sqlite_master \
                 WHERE type IN ('table', 'view') AND LOWER(name) = LOWER(?)"
            }
        }
    }

    /// Lists the columns of table `?1` as `position, name, data_type, not_null, default_value, pk`.
    pub fn table_info_sql(&self) -> &'static str {
        match self {
            Self::MySql => {
                "SELECT CAST(ORDINAL_POSITION AS SIGNED) AS position, CAST(COLUMN_NAME AS CHAR) AS name, \
                 CAST(DATA_TYPE AS CHAR) AS data_type, CAST(IS_NULLABLE = 'NO' AS SIGNED) AS not_null, \
                 CAST(COLUMN_DEFAULT AS CHAR) AS default_value, CAST(COLUMN_KEY = 'PRI' AS SIGNED) AS pk \
                 FROM information_schema.COLUMNS \
                 WHERE TABLE_SCHEMA = DATABASE() AND TABLE_NAME = ? ORDER BY ORDINAL_POSITION"
            }
            Self::Sqlite => {
                "SELECT cid AS position, name, type AS data_type, `notnull` AS not_null, \
                 dflt_value AS default_value, pk FROM pragma_table_info(?) ORDER BY cid"
            }
        }
    }

    pub fn rename_table_sql(&self, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME TO {}",
            self.quote(from),
            self.quote(to)
        )
    }

    pub fn add_column_sql(&self, table: &str, column: &str, definition: &str) -> String {
        format!(
            "ALTER TABLE {} ADD COLUMN {} {definition}",
            self.quote(table),
            self.quote(column)
        )
    }

    pub fn drop_column_sql(&self, table: &str, column: &str) -> String {
        format!(
            "ALTER TABLE {} DROP COLUMN {}",
            self.quote(table),
            self.quote(column)
        )
    }

    pub fn rename_column_sql(&self, table: &str, from: &str, to: &str) -> String {
        format!(
            "ALTER TABLE {} RENAME COLUMN {} TO {}",
            self.quote(table),
            self.quote(from),
            self.quote(to)
        )
    }

    pub fn drop_index_sql(&self, table: &str, index: &str) -> String {
        match self {
            Self::MySql => format!("DROP INDEX {} ON {}", self.quote(index), self.quote(table)),
            Self::Sqlite => format!("DROP INDEX {}", self.quote(index)),
        }
    }

    /// Whether `CREATE INDEX IF NOT EXISTS` is understood by the backend.
    pub fn supports_optional_index(&self) -> bool {
        matches!(self, Self::Sqlite)
    }

    fn json_array_type(&self) -> &'static str {
        match self {
            Self::MySql => "ARRAY",
            Self::Sqlite => "array",
        }
    }

    fn text_cast(&self, column: &str) -> String {
        match self {
            Self::MySql => format!("CAST({column} AS CHAR)"),
            Self::Sqlite => format!("CAST({column} AS TEXT)"),
        }
    }

    /// Expression converting the quoted single value `column` into a JSON array.
    ///
    /// Empty values become `[]`, values that already are JSON arrays are kept and anything
    /// else is wrapped into a one element array.
    pub fn to_multiple_expr(&self, column: &str) -> String {
        let (valid, kind, array) = match self {
            Self::MySql => ("JSON_VALID", "JSON_TYPE", "JSON_ARRAY"),
            Self::Sqlite => ("json_valid", "json_type", "json_array"),
        };
        let array_type = self.json_array_type();
        let text = self.text_cast(column);

        format!(
            "CASE \
                WHEN COALESCE({text}, '') = '' THEN '[]' \
                ELSE (CASE \
                    WHEN {valid}({column}) THEN (CASE \
                        WHEN {kind}({column}) = '{array_type}' THEN {column} \
                        ELSE {array}({column}) \
                    END) \
                    ELSE {array}({column}) \
                END) \
            END"
        )
    }

    /// Expression converting the quoted JSON array `column` into its first element.
    ///
    /// Empty arrays become an empty string and values that are not JSON arrays are copied
    /// unchanged.
    pub fn to_single_expr(&self, column: &str) -> String {
        let array_type = self.json_array_type();
        let text = self.text_cast(column);
        let (valid, kind, first) = match self {
            Self::MySql => (
                "JSON_VALID",
                "JSON_TYPE",
                format!("JSON_UNQUOTE(JSON_EXTRACT({column}, '$[0]'))"),
            ),
            Self::Sqlite => (
                "json_valid",
                "json_type",
                format!("json_extract({column}, '$[0]')"),
            ),
        };

        format!(
            "CASE \
                WHEN COALESCE({text}, '[]') = '[]' THEN '' \
                ELSE (CASE \
                    WHEN {valid}({column}) THEN (CASE \
                        WHEN {kind}({column}) = '{array_type}' THEN COALESCE({first}, '') \
                        ELSE {column} \
                    END) \
                    ELSE {column} \
                END) \
            END"
        )
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MySql => f.write_str("MySQL"),
            Self::Sqlite => f.write_str("SQLite"),
        }
    }
}
