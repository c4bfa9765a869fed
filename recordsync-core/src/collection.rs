use serde::{Deserialize, Serialize};

use crate::{field::Field, random::pseudorandom_string};

/// Length of the identities assigned by [`Collection::refresh_id`].
pub const COLLECTION_ID_LEN: usize = 15;

/// Kind of a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Base,
    Auth,
    View,
}

/// Point in time snapshot of a collection schema.
///
/// The record table of a collection is named after the collection. Field order is the
/// column order used when the table is created.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CollectionKind,
    #[serde(rename = "schema", default)]
    pub fields: Vec<Field>,
    #[serde(default)]
    pub indexes: Vec<String>,
    #[serde(skip)]
    is_new: bool,
}

impl Collection {
    /// Creates a new, not yet persisted collection with a fresh identity.
    pub fn new(name: impl Into<String>, kind: CollectionKind) -> Self {
        let mut collection = Self {
            name: name.into(),
            kind,
            ..Default::default()
        };
        collection.refresh_id();
        collection.mark_as_new();

        collection
    }

    /// Replaces the identity, used to rebuild snapshots of persisted collections.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();

        self
    }

    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);

        self
    }

    pub fn index(mut self, index: impl Into<String>) -> Self {
        self.indexes.push(index.into());

        self
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }

    pub fn refresh_id(&mut self) {
        self.id = pseudorandom_string(COLLECTION_ID_LEN);
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn mark_as_new(&mut self) {
        self.is_new = true;
    }

    pub fn mark_as_not_new(&mut self) {
        self.is_new = false;
    }

    pub fn is_base(&self) -> bool {
        self.kind == CollectionKind::Base
    }

    pub fn is_auth(&self) -> bool {
        self.kind == CollectionKind::Auth
    }

    pub fn is_view(&self) -> bool {
        self.kind == CollectionKind::View
    }

    /// Name of the record table backing the collection.
    pub fn table_name(&self) -> &str {
        &self.name
    }

    pub fn field_by_id(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
