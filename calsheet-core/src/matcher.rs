//! Pairing of source and destination records by identifier.

use std::collections::HashMap;

use crate::record::Record;

/// Anything that may carry a record identifier.
pub trait Identified {
    /// The identifier, or `None` when the item is not linked yet.
    fn identifier(&self) -> Option<&str>;
}

impl Identified for Record {
    fn identifier(&self) -> Option<&str> {
        self.has_id().then_some(self.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Unchanged,
    Changed,
    SourceOnly,
}

/// The outcome for one source item. Indices point into the input slices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordMatch {
    pub kind: MatchKind,
    pub source: usize,
    pub dest: Option<usize>,
}

/// Every source item classified, in source order, plus the unclaimed
/// destination items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matches: Vec<RecordMatch>,
    pub dest_only: Vec<usize>,
}

impl MatchResult {
    fn of_kind(&self, kind: MatchKind) -> impl Iterator<Item = &RecordMatch> {
        self.matches.iter().filter(move |m| m.kind == kind)
    }

    pub fn matched_same(&self) -> impl Iterator<Item = &RecordMatch> {
        self.of_kind(MatchKind::Unchanged)
    }

    pub fn matched_changed(&self) -> impl Iterator<Item = &RecordMatch> {
        self.of_kind(MatchKind::Changed)
    }

    pub fn source_only(&self) -> impl Iterator<Item = &RecordMatch> {
        self.of_kind(MatchKind::SourceOnly)
    }
}

/// Pair `source` and `dest` items by identifier.
///
/// Source items without an identifier are always source-only, as is a
/// source item whose identifier an earlier source item already claimed.
/// Destination items without an identifier are never matched. `same`
/// decides between unchanged and changed for each matched pair.
pub fn match_records<S, D>(
    source: &[S],
    dest: &[D],
    same: impl Fn(&S, &D) -> bool,
) -> MatchResult
where
    S: Identified,
    D: Identified,
{
    let mut dest_by_id: HashMap<&str, usize> = HashMap::with_capacity(dest.len());
    for (i, item) in dest.iter().enumerate() {
        if let Some(id) = item.identifier() {
            dest_by_id.entry(id).or_insert(i);
        }
    }

    let mut claimed = vec![false; dest.len()];
    let matches = source
        .iter()
        .enumerate()
        .map(|(s, item)| {
            let found = item
                .identifier()
                .and_then(|id| dest_by_id.get(id).copied())
                .filter(|d| !claimed[*d]);

            match found {
                Some(d) => {
                    claimed[d] = true;
                    let kind = if same(item, &dest[d]) {
                        MatchKind::Unchanged
                    } else {
                        MatchKind::Changed
                    };
                    RecordMatch {
                        kind,
                        source: s,
                        dest: Some(d),
                    }
                }
                None => RecordMatch {
                    kind: MatchKind::SourceOnly,
                    source: s,
                    dest: None,
                },
            }
        })
        .collect();

    let dest_only = claimed
        .iter()
        .enumerate()
        .filter_map(|(d, taken)| (!taken).then_some(d))
        .collect();

    MatchResult { matches, dest_only }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item {
        id: &'static str,
        value: u32,
    }

    impl Identified for Item {
        fn identifier(&self) -> Option<&str> {
            (!self.id.is_empty()).then_some(self.id)
        }
    }

    fn item(id: &'static str, value: u32) -> Item {
        Item { id, value }
    }

    fn same(a: &Item, b: &Item) -> bool {
        a.value == b.value
    }

    #[test]
    fn test_classifies_all_four_ways() {
        let source = [item("a", 1), item("b", 2), item("", 3), item("z", 4)];
        let dest = [item("b", 20), item("a", 1), item("c", 5)];

        let result = match_records(&source, &dest, same);

        let same_ids: Vec<_> = result.matched_same().map(|m| m.source).collect();
        let changed: Vec<_> = result.matched_changed().map(|m| (m.source, m.dest)).collect();
        let source_only: Vec<_> = result.source_only().map(|m| m.source).collect();

        assert_eq!(same_ids, vec![0]);
        assert_eq!(changed, vec![(1, Some(0))]);
        assert_eq!(source_only, vec![2, 3]);
        assert_eq!(result.dest_only, vec![2]);
    }

    #[test]
    fn test_preserves_source_order() {
        let source = [item("c", 1), item("a", 1), item("b", 1)];
        let dest = [item("a", 1), item("b", 1), item("c", 1)];

        let result = match_records(&source, &dest, same);
        let order: Vec<_> = result.matches.iter().map(|m| m.source).collect();

        assert_eq!(order, vec![0, 1, 2]);
        assert!(result.dest_only.is_empty());
    }

    #[test]
    fn test_duplicate_source_id_matches_once() {
        let source = [item("a", 1), item("a", 1)];
        let dest = [item("a", 1)];

        let result = match_records(&source, &dest, same);

        assert_eq!(result.matches[0].kind, MatchKind::Unchanged);
        assert_eq!(result.matches[1].kind, MatchKind::SourceOnly);
    }

    #[test]
    fn test_blank_destination_ids_are_dest_only() {
        let source = [item("a", 1)];
        let dest = [item("", 1), item("", 2)];

        let result = match_records(&source, &dest, same);

        assert_eq!(result.source_only().count(), 1);
        assert_eq!(result.dest_only, vec![0, 1]);
    }

    #[test]
    fn test_large_collections() {
        let ids: Vec<&'static str> = (0..5000)
            .map(|i| &*Box::leak(format!("id{i}").into_boxed_str()))
            .collect();
        let source: Vec<_> = ids.iter().map(|id| item(*id, 1)).collect();
        let dest: Vec<_> = ids.iter().rev().map(|id| item(*id, 1)).collect();

        let result = match_records(&source, &dest, same);

        assert_eq!(result.matched_same().count(), 5000);
        assert!(result.dest_only.is_empty());
    }
}
