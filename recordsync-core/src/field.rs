use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;

pub const FIELD_NAME_ID: &str = "id";
pub const FIELD_NAME_CREATED: &str = "created";
pub const FIELD_NAME_UPDATED: &str = "updated";
pub const FIELD_NAME_USERNAME: &str = "username";
pub const FIELD_NAME_EMAIL: &str = "email";
pub const FIELD_NAME_EMAIL_VISIBILITY: &str = "emailVisibility";
pub const FIELD_NAME_VERIFIED: &str = "verified";
pub const FIELD_NAME_TOKEN_KEY: &str = "tokenKey";
pub const FIELD_NAME_PASSWORD_HASH: &str = "passwordHash";
pub const FIELD_NAME_LAST_RESET_SENT_AT: &str = "lastResetSentAt";
pub const FIELD_NAME_LAST_VERIFICATION_SENT_AT: &str = "lastVerificationSentAt";

/// Column holding the JSON payload of the params collection.
pub const FIELD_NAME_VALUE: &str = "value";

/// Data type of a collection field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Bool,
    Email,
    Url,
    Editor,
    Date,
    Select,
    Json,
    File,
    Relation,
}

impl FieldType {
    /// Select, file and relation fields may hold several values.
    pub fn supports_multiple(&self) -> bool {
        matches!(self, Self::Select | Self::File | Self::Relation)
    }
}

/// Type specific options that influence the physical column.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_select: Option<u32>,
}

/// A typed column of a collection.
///
/// `id` is the stable identity used to correlate a field across schema versions, `name` is
/// the mutable column name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
    #[serde(default)]
    pub options: FieldOptions,
}

impl Field {
    pub fn new(id: impl Into<String>, name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type,
            options: FieldOptions::default(),
        }
    }

    pub fn max_select(mut self, max_select: u32) -> Self {
        self.options.max_select = Some(max_select);

        self
    }

    /// Whether the field stores an array of values.
    ///
    /// Relations without an explicit `maxSelect` are multiple, select and file fields need
    /// `maxSelect > 1`; every other type is always single.
    pub fn is_multiple(&self) -> bool {
        match (self.field_type, self.options.max_select) {
            (FieldType::Relation, None) => true,
            (t, Some(max)) if t.supports_multiple() => max > 1,
            _ => false,
        }
    }

    /// Backend specific column definition of the field.
    pub fn column_definition(&self, dialect: Dialect) -> &'static str {
        if self.is_multiple() {
            return match dialect {
                Dialect::MySql => "JSON DEFAULT NULL",
                Dialect::Sqlite => "JSON DEFAULT '[]' NOT NULL",
            };
        }

        match (self.field_type, dialect) {
            (FieldType::Number, Dialect::MySql) => "DOUBLE DEFAULT 0 NOT NULL",
            (FieldType::Number, Dialect::Sqlite) => "NUMERIC DEFAULT 0 NOT NULL",
            (FieldType::Bool, Dialect::MySql) => "TINYINT(1) DEFAULT 0 NOT NULL",
            (FieldType::Bool, Dialect::Sqlite) => "BOOLEAN DEFAULT FALSE NOT NULL",
            (FieldType::Json, _) => "JSON DEFAULT NULL",
            (FieldType::Editor, Dialect::MySql) => "LONGTEXT NULL",
            (_, Dialect::MySql) => "VARCHAR(255) DEFAULT '' NOT NULL",
            (_, Dialect::Sqlite) => "TEXT DEFAULT '' NOT NULL",
        }
    }
}
