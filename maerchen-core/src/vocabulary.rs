//! Grundwortschatz indexing and matching.
//!
//! The index maps every word of the base word list to its canonical
//! capitalization and carries one precompiled word-boundary prefix pattern
//! per entry. Matching scans the candidate text once per entry; exact
//! word-boundary semantics with suffix tolerance matter more than
//! asymptotic efficiency at this vocabulary size.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

/// The embedded base word list.
pub const GRUNDWORTSCHATZ: &str = include_str!("data/grundwortschatz.md");

lazy_static! {
    static ref BULLET_WORD: Regex = Regex::new(r"^\s*-\s+(\S+)").unwrap();
}

struct VocabEntry {
    canonical: String,
    pattern: Regex,
}

/// Read-only lookup table over the base word list.
///
/// Built once at startup; safe for unsynchronized concurrent reads.
pub struct VocabularyIndex {
    entries: Vec<VocabEntry>,
}

impl VocabularyIndex {
    /// Build an index from a word-list text.
    ///
    /// Lines of the form `- Wort` contribute entries, keyed by the
    /// lowercase form; the first occurrence of a word wins.
    pub fn new(source: &str) -> Self {
        let mut seen = HashSet::new();
        let mut entries = Vec::new();

        for line in source.lines() {
            let Some(cap) = BULLET_WORD.captures(line) else {
                continue;
            };
            let word = &cap[1];
            let key = word.to_lowercase();
            if !seen.insert(key.clone()) {
                continue;
            }
            if let Some(entry) = VocabEntry::compile(word, &key) {
                entries.push(entry);
            }
        }

        Self { entries }
    }

    /// Words of the list that occur in `text`.
    ///
    /// A word matches at a word boundary together with any attached suffix
    /// ("Haus" matches "Hauses"), case-insensitively. Returns canonical
    /// forms, deduplicated and lexicographically sorted.
    pub fn find_in_text(&self, text: &str) -> Vec<String> {
        let mut found = BTreeSet::new();
        for entry in &self.entries {
            if entry.pattern.is_match(text) {
                found.insert(entry.canonical.clone());
            }
        }
        found.into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for VocabularyIndex {
    /// Index over the embedded word list.
    fn default() -> Self {
        Self::new(GRUNDWORTSCHATZ)
    }
}

impl VocabEntry {
    fn compile(word: &str, key: &str) -> Option<Self> {
        let pattern = Regex::new(&format!(r"(?i)\b{}\w*", regex::escape(key))).ok()?;
        Some(Self {
            canonical: word.to_string(),
            pattern,
        })
    }
}
