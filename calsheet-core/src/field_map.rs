//! Mapping between table header labels and canonical record fields.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, Row};

/// Canonical field keys, declared in reference header order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKey {
    Title,
    Description,
    Location,
    StartTime,
    EndTime,
    Guests,
    Id,
}

impl FieldKey {
    pub const ALL: [FieldKey; 7] = [
        FieldKey::Title,
        FieldKey::Description,
        FieldKey::Location,
        FieldKey::StartTime,
        FieldKey::EndTime,
        FieldKey::Guests,
        FieldKey::Id,
    ];

    /// Keys a header must carry for rows to be usable.
    pub const REQUIRED: [FieldKey; 3] = [FieldKey::Id, FieldKey::Title, FieldKey::StartTime];
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            FieldKey::Title => "title",
            FieldKey::Description => "description",
            FieldKey::Location => "location",
            FieldKey::StartTime => "starttime",
            FieldKey::EndTime => "endtime",
            FieldKey::Guests => "guests",
            FieldKey::Id => "id",
        };
        write!(f, "{key}")
    }
}

/// Display labels used in the table header for each canonical key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldLabels {
    pub title: String,
    pub description: String,
    pub location: String,
    pub starttime: String,
    pub endtime: String,
    pub guests: String,
    pub id: String,
}

impl Default for FieldLabels {
    fn default() -> Self {
        FieldLabels {
            title: "Title".into(),
            description: "Description".into(),
            location: "Location".into(),
            starttime: "Start Time".into(),
            endtime: "End Time".into(),
            guests: "Guests".into(),
            id: "Id".into(),
        }
    }
}

impl FieldLabels {
    pub fn label(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Title => &self.title,
            FieldKey::Description => &self.description,
            FieldKey::Location => &self.location,
            FieldKey::StartTime => &self.starttime,
            FieldKey::EndTime => &self.endtime,
            FieldKey::Guests => &self.guests,
            FieldKey::Id => &self.id,
        }
    }

    fn key_for(&self, text: &str) -> Option<FieldKey> {
        FieldKey::ALL.into_iter().find(|key| self.label(*key) == text)
    }

    /// Display labels for a set of keys, in reference order.
    pub fn labels_for<'a>(&self, keys: impl IntoIterator<Item = &'a FieldKey>) -> Vec<String> {
        keys.into_iter().map(|key| self.label(*key).to_string()).collect()
    }

    /// The reference header for a freshly initialized table.
    pub fn header_row(&self) -> Row {
        FieldKey::ALL
            .iter()
            .map(|key| Cell::text(self.label(*key)))
            .collect()
    }
}

/// Per-position mapping from header columns to canonical keys.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldMap {
    positions: Vec<Option<FieldKey>>,
}

impl FieldMap {
    /// Map each header cell to the key whose label matches it exactly.
    ///
    /// Returns the map together with the required keys that have no column.
    /// A label repeated in the header maps only its first occurrence.
    pub fn build(
        header: &[Cell],
        labels: &FieldLabels,
        required: &[FieldKey],
    ) -> (FieldMap, BTreeSet<FieldKey>) {
        let mut seen = BTreeSet::new();
        let positions = header
            .iter()
            .map(|cell| {
                let key = cell.as_text().and_then(|text| labels.key_for(text))?;
                seen.insert(key).then_some(key)
            })
            .collect();

        let map = FieldMap { positions };
        let missing = required
            .iter()
            .copied()
            .filter(|key| map.position(*key).is_none())
            .collect();

        (map, missing)
    }

    /// Number of header columns, mapped or not.
    pub fn width(&self) -> usize {
        self.positions.len()
    }

    pub fn key_at(&self, index: usize) -> Option<FieldKey> {
        self.positions.get(index).copied().flatten()
    }

    pub fn position(&self, key: FieldKey) -> Option<usize> {
        self.positions.iter().position(|k| *k == Some(key))
    }

    /// Mapped columns as `(position, key)` pairs.
    pub fn mapped(&self) -> impl Iterator<Item = (usize, FieldKey)> + '_ {
        self.positions
            .iter()
            .enumerate()
            .filter_map(|(i, key)| key.map(|k| (i, k)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(labels: &[&str]) -> Row {
        labels.iter().map(|l| Cell::text(*l)).collect()
    }

    #[test]
    fn test_build_reference_header_is_complete() {
        let labels = FieldLabels::default();
        let (map, missing) = FieldMap::build(&labels.header_row(), &labels, &FieldKey::REQUIRED);

        assert!(missing.is_empty());
        assert_eq!(map.width(), 7);
        assert_eq!(map.position(FieldKey::Title), Some(0));
        assert_eq!(map.position(FieldKey::StartTime), Some(3));
        assert_eq!(map.position(FieldKey::Id), Some(6));
    }

    #[test]
    fn test_unknown_columns_are_unmapped() {
        let labels = FieldLabels::default();
        let row = header(&["Notes", "Title", "Start Time", "Id"]);
        let (map, missing) = FieldMap::build(&row, &labels, &FieldKey::REQUIRED);

        assert!(missing.is_empty());
        assert_eq!(map.key_at(0), None);
        assert_eq!(map.key_at(1), Some(FieldKey::Title));
        assert_eq!(map.mapped().count(), 3);
    }

    #[test]
    fn test_matching_is_exact() {
        let labels = FieldLabels::default();
        let row = header(&["title", "Start Time ", "Id"]);
        let (_, missing) = FieldMap::build(&row, &labels, &FieldKey::REQUIRED);

        let expected: BTreeSet<_> = [FieldKey::Title, FieldKey::StartTime].into();
        assert_eq!(missing, expected);
        assert_eq!(labels.labels_for(&missing), vec!["Title", "Start Time"]);
    }

    #[test]
    fn test_duplicate_label_maps_first_only() {
        let labels = FieldLabels::default();
        let row = header(&["Title", "Title", "Start Time", "Id"]);
        let (map, _) = FieldMap::build(&row, &labels, &FieldKey::REQUIRED);

        assert_eq!(map.key_at(0), Some(FieldKey::Title));
        assert_eq!(map.key_at(1), None);
    }

    #[test]
    fn test_custom_labels() {
        let labels = FieldLabels {
            title: "Event".into(),
            ..FieldLabels::default()
        };
        let row = header(&["Event", "Start Time", "Id"]);
        let (map, missing) = FieldMap::build(&row, &labels, &FieldKey::REQUIRED);

        assert!(missing.is_empty());
        assert_eq!(map.position(FieldKey::Title), Some(0));
    }
}
