//! Whole-word ticker mention counting.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use tickerpulse_core::SearchTerms;

/// Candidate tokens: isolated runs of 3 to 5 uppercase ASCII letters.
///
/// `\b` is Unicode-aware, so a run touching a digit, underscore or any letter
/// is not a candidate. Multi-word terms can never match a single token.
static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z]{3,5}\b").expect("valid ticker token regex"));

/// Sparse per-post mention counts, keyed by search term in order of first
/// occurrence in the text. Every count is at least 1.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MentionCount {
    entries: Vec<(String, u32)>,
}

impl MentionCount {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn get(&self, term: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, count)| *count)
    }

    /// The first term mentioned in the text.
    #[must_use]
    pub fn primary(&self) -> Option<&str> {
        self.entries.first().map(|(t, _)| t.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c))
    }

    #[must_use]
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| u64::from(*c)).sum()
    }
}

impl Serialize for MentionCount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (term, count) in &self.entries {
            map.serialize_entry(term, count)?;
        }
        map.end()
    }
}

/// Count whole-word occurrences of `terms` in `text`.
///
/// The text is uppercased, split into candidate tokens, and every token that
/// is itself a search term is counted. Empty text yields an empty result.
#[must_use]
pub fn count_mentions(text: &str, terms: &SearchTerms) -> MentionCount {
    if text.is_empty() || terms.is_empty() {
        return MentionCount::default();
    }

    let upper = text.to_uppercase();
    let mut entries: Vec<(String, u32)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for token in TOKEN_RE.find_iter(&upper).map(|m| m.as_str()) {
        if !terms.contains(token) {
            continue;
        }
        if let Some(&slot) = index.get(token) {
            entries[slot].1 += 1;
        } else {
            index.insert(token, entries.len());
            entries.push((token.to_string(), 1));
        }
    }

    MentionCount { entries }
}
