use std::{borrow::Cow, collections::BTreeMap, fmt};

use serde::{ser::SerializeMap, Serialize, Serializer};
use validator::ValidationError;

/// Validation code attached to every index problem.
pub const INVALID_INDEX_EXPRESSION: &str = "validation_invalid_index_expression";

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("failed to {action} {target} - {source}")]
    Statement {
        action: &'static str,
        target: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("collection `{0}` has no id")]
    MissingId(String),

    #[error("indexes: {0}")]
    Indexes(IndexErrors),

    #[error("'{0}' not supported, consider using MySQL or SQLite")]
    UnsupportedDatabase(String),

    #[error("{0}")]
    Any(#[from] anyhow::Error),
}

impl SyncError {
    /// Aggregated index errors, if that is what this error is.
    pub fn index_errors(&self) -> Option<&IndexErrors> {
        match self {
            Self::Indexes(errors) => Some(errors),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Index validation failures keyed by the position of the index in the collection.
///
/// Serializes as `{"indexes": {"<position>": <error>}}`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexErrors(BTreeMap<usize, ValidationError>);

impl IndexErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for the index at `position`, replacing any previous one.
    pub fn add(&mut self, position: usize, message: impl Into<Cow<'static, str>>) {
        let mut error = ValidationError::new(INVALID_INDEX_EXPRESSION);
        error.message = Some(message.into());

        self.0.insert(position, error);
    }

    pub fn get(&self, position: usize) -> Option<&ValidationError> {
        self.0.get(&position)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ValidationError)> {
        self.0.iter().map(|(position, error)| (*position, error))
    }

    /// `Err` with the accumulated failures, `Ok` when there are none.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(SyncError::Indexes(self))
        }
    }
}

impl fmt::Display for IndexErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (position, error)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }

            write!(f, "{position}: {error}")?;
        }

        Ok(())
    }
}

impl Serialize for IndexErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("indexes", &self.0)?;
        map.end()
    }
}
