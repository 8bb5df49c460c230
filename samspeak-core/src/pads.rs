//! Pad mapping: index → text
//!
//! Keys need not be contiguous. Only index order matters; a `BTreeMap` keeps
//! iteration in that order so layout and reorder never have to sort.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Number of pads shown per page, and the minimum number of presentable slots.
pub const PADS_PER_PAGE: usize = 6;

/// Highest pad index a shared document may carry.
pub const MAX_PAD_INDEX: usize = 9_999;

/// Mapping from pad index to pad text.
///
/// Serializes as a JSON object with stringified integer keys, which is the
/// `rectangles` field of the shared document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PadMapping {
    pads: BTreeMap<usize, String>,
}

impl PadMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text stored at `index`, if the key exists (it may be empty).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.pads.get(&index).map(String::as_str)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.pads.contains_key(&index)
    }

    /// True when the key exists and its text is not empty.
    pub fn is_occupied(&self, index: usize) -> bool {
        self.get(index).map(|t| !t.is_empty()).unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.pads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pads.is_empty()
    }

    /// Highest key present, occupied or not.
    pub fn max_index(&self) -> Option<usize> {
        self.pads.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.pads.iter().map(|(i, t)| (*i, t.as_str()))
    }

    /// What a pad shows and speaks: its text, or its 1-based number when the
    /// text is empty or missing.
    pub fn label(&self, index: usize) -> String {
        match self.get(index) {
            Some(text) if !text.is_empty() => text.to_string(),
            _ => index.saturating_add(1).to_string(),
        }
    }

    /// Set the text of one pad. Empty text keeps the key.
    pub fn set_text(&mut self, index: usize, text: impl Into<String>) {
        self.pads.insert(index, text.into());
    }

    /// Append an empty pad after the highest index and return its index.
    /// An existing pad at `usize::MAX` is left untouched.
    pub fn add_pad(&mut self) -> usize {
        let next = self.max_index().map(|i| i.saturating_add(1)).unwrap_or(0);
        self.pads.entry(next).or_default();
        next
    }

    /// Reject mappings with a key above [`MAX_PAD_INDEX`].
    pub fn validate(&self) -> crate::Result<()> {
        match self.max_index() {
            Some(index) if index > MAX_PAD_INDEX => Err(crate::Error::InvalidPad(format!(
                "index {} exceeds {}",
                index, MAX_PAD_INDEX
            ))),
            _ => Ok(()),
        }
    }

    /// Remove exactly one key. Other keys keep their index and text.
    pub fn delete_pad(&mut self, index: usize) -> Option<String> {
        self.pads.remove(&index)
    }

    /// Move the entry at list position `from` to list position `to`.
    ///
    /// Positions refer to the index-sorted entry list, not to pad keys. After
    /// the move every entry is re-keyed contiguously from 0. Returns false and
    /// leaves the mapping untouched when `from == to` or `from` is out of range.
    /// A `to` past the end appends.
    pub fn reorder(&mut self, from: usize, to: usize) -> bool {
        if from == to || from >= self.pads.len() {
            return false;
        }

        let mut texts: Vec<String> = std::mem::take(&mut self.pads).into_values().collect();
        let moved = texts.remove(from);
        let to = to.min(texts.len());
        texts.insert(to, moved);

        self.pads = texts.into_iter().enumerate().collect();
        true
    }

    /// Texts in index order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pads.values().map(String::as_str)
    }
}

impl FromIterator<(usize, String)> for PadMapping {
    fn from_iter<T: IntoIterator<Item = (usize, String)>>(iter: T) -> Self {
        Self {
            pads: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<usize, String>> for PadMapping {
    fn from(pads: BTreeMap<usize, String>) -> Self {
        Self { pads }
    }
}

impl IntoIterator for PadMapping {
    type Item = (usize, String);
    type IntoIter = std::collections::btree_map::IntoIter<usize, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.pads.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(entries: &[(usize, &str)]) -> PadMapping {
        entries.iter().map(|(i, t)| (*i, t.to_string())).collect()
    }

    #[test]
    fn test_label_falls_back_to_number() {
        let pads = mapping(&[(0, "Hello"), (1, "")]);
        assert_eq!(pads.label(0), "Hello");
        assert_eq!(pads.label(1), "2");
        assert_eq!(pads.label(9), "10");
    }

    #[test]
    fn test_extreme_index_does_not_overflow() {
        let mut pads: PadMapping = serde_json::from_str(r#"{"18446744073709551615":"x"}"#).unwrap();
        assert_eq!(pads.label(usize::MAX), "x");
        assert_eq!(PadMapping::new().label(usize::MAX), usize::MAX.to_string());

        assert_eq!(pads.add_pad(), usize::MAX);
        assert_eq!(pads.get(usize::MAX), Some("x"));
        assert!(pads.validate().is_err());
    }

    #[test]
    fn test_validate_bounds_indices() {
        assert!(mapping(&[(0, "a"), (MAX_PAD_INDEX, "b")]).validate().is_ok());
        assert!(mapping(&[(MAX_PAD_INDEX + 1, "c")]).validate().is_err());
        assert!(PadMapping::new().validate().is_ok());
    }

    #[test]
    fn test_add_pad_uses_next_index() {
        let mut pads = PadMapping::new();
        assert_eq!(pads.add_pad(), 0);

        let mut pads = mapping(&[(0, "a"), (4, "b")]);
        assert_eq!(pads.add_pad(), 5);
        assert_eq!(pads.get(5), Some(""));
    }

    #[test]
    fn test_delete_keeps_other_keys() {
        let mut pads = mapping(&[(0, "a"), (1, "b"), (2, "c")]);
        assert_eq!(pads.delete_pad(1), Some("b".to_string()));
        assert_eq!(pads, mapping(&[(0, "a"), (2, "c")]));
        assert_eq!(pads.delete_pad(1), None);
    }

    #[test]
    fn test_reorder_moves_and_reindexes() {
        let mut pads = mapping(&[(0, "a"), (1, "b"), (2, "c")]);
        assert!(pads.reorder(0, 2));
        assert_eq!(pads, mapping(&[(0, "b"), (1, "c"), (2, "a")]));
    }

    #[test]
    fn test_reorder_compacts_sparse_keys() {
        let mut pads = mapping(&[(1, "a"), (5, "b"), (9, "c")]);
        assert!(pads.reorder(2, 0));
        assert_eq!(pads, mapping(&[(0, "c"), (1, "a"), (2, "b")]));
    }

    #[test]
    fn test_reorder_noop_cases() {
        let original = mapping(&[(3, "a"), (7, "b")]);

        let mut pads = original.clone();
        assert!(!pads.reorder(1, 1));
        assert_eq!(pads, original);

        assert!(!pads.reorder(5, 0));
        assert_eq!(pads, original);
    }

    #[test]
    fn test_reorder_target_past_end_appends() {
        let mut pads = mapping(&[(0, "a"), (1, "b"), (2, "c")]);
        assert!(pads.reorder(0, 10));
        assert_eq!(pads, mapping(&[(0, "b"), (1, "c"), (2, "a")]));
    }

    #[test]
    fn test_json_uses_string_keys() {
        let pads = mapping(&[(0, "Yes"), (10, "No")]);
        let json = serde_json::to_string(&pads).unwrap();
        assert_eq!(json, r#"{"0":"Yes","10":"No"}"#);

        let back: PadMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pads);
    }
}
