//! Structural comparison of two collection snapshots.
//!
//! Fields are correlated by their identity only. A field that kept its identity but got a
//! new name is a rename, never a drop followed by an add, and two fields swapping names
//! are simply two independent renames.

use crate::{collection::Collection, field::Field};

/// Changes between an old and a new snapshot of the same collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaDiff<'a> {
    /// `(old, new)` table names when the collection was renamed.
    pub table_rename: Option<(&'a str, &'a str)>,
    /// Old fields without a counterpart in the new snapshot.
    pub removed: Vec<&'a Field>,
    /// New fields without a counterpart in the old snapshot.
    pub added: Vec<&'a Field>,
    /// `(old, new)` pairs sharing an identity but not a name.
    pub renamed: Vec<(&'a Field, &'a Field)>,
}

impl<'a> SchemaDiff<'a> {
    /// Compares `old` against `new`.
    pub fn new(old: &'a Collection, new: &'a Collection) -> Self {
        let mut diff = Self::default();

        if !old.name.eq_ignore_ascii_case(&new.name) {
            diff.table_rename = Some((old.name.as_str(), new.name.as_str()));
        }

        for old_field in old.fields.iter() {
            if new.field_by_id(&old_field.id).is_none() {
                diff.removed.push(old_field);
            }
        }

        for new_field in new.fields.iter() {
            match old.field_by_id(&new_field.id) {
                None => diff.added.push(new_field),
                Some(old_field) if old_field.name != new_field.name => {
                    diff.renamed.push((old_field, new_field))
                }
                Some(_) => {}
            }
        }

        diff
    }

    /// `true` when neither the table nor any column changes.
    pub fn is_empty(&self) -> bool {
        self.table_rename.is_none()
            && self.removed.is_empty()
            && self.added.is_empty()
            && self.renamed.is_empty()
    }

    /// Number of column level changes.
    pub fn change_count(&self) -> usize {
        self.removed.len() + self.added.len() + self.renamed.len()
    }
}

/// A field whose single/multiple cardinality differs between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardinalityChange<'a> {
    pub old: &'a Field,
    pub new: &'a Field,
}

impl CardinalityChange<'_> {
    /// `true` for single to multiple, `false` for multiple to single.
    pub fn to_multiple(&self) -> bool {
        self.new.is_multiple()
    }
}

/// Fields present in both snapshots whose [`Field::is_multiple`] flag changed, in the
/// order of the new snapshot.
pub fn cardinality_changes<'a>(
    old: &'a Collection,
    new: &'a Collection,
) -> Vec<CardinalityChange<'a>> {
    new.fields
        .iter()
        .filter_map(|new_field| {
            let old_field = old.field_by_id(&new_field.id)?;

            (old_field.is_multiple() != new_field.is_multiple()).then_some(CardinalityChange {
                old: old_field,
                new: new_field,
            })
        })
        .collect()
}
