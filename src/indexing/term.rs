//! Generated terms and the per-document term set.
//!
//! A term is stored under its full name (`prefix + text`). Each entry keeps
//! a within-document frequency (the accumulated weight) and, optionally,
//! the word positions it occurred at.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// One indexed term with its prefix, weight and positional data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedTerm {
    /// Field prefix (`X` + uppercased field name), possibly with the `Z` stem marker.
    pub prefix: Option<String>,
    /// Term text following the prefix.
    pub text: String,
    /// Accumulated weight (within-document frequency).
    pub weight: u32,
    /// Word positions; empty when no positional data is attached.
    pub positions: Vec<u32>,
}

impl GeneratedTerm {
    /// The full term as handed to the index engine.
    pub fn term(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}{}", self.text),
            None => self.text.clone(),
        }
    }

    /// Whether position information is attached.
    pub fn has_positions(&self) -> bool {
        !self.positions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TermEntry {
    prefix: String,
    wdf: u32,
    positions: BTreeSet<u32>,
}

/// The set of terms generated for one document, ordered by term name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermSet {
    entries: BTreeMap<String, TermEntry>,
}

impl TermSet {
    /// Create an empty term set.
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, prefix: &str, text: &str) -> &mut TermEntry {
        self.entries
            .entry(format!("{prefix}{text}"))
            .or_insert_with(|| TermEntry {
                prefix: prefix.to_string(),
                wdf: 0,
                positions: BTreeSet::new(),
            })
    }

    /// Add a term without positional data, increasing its weight by `weight`.
    pub fn add_term(&mut self, prefix: &str, text: &str, weight: u32) {
        let entry = self.entry(prefix, text);
        entry.wdf = entry.wdf.saturating_add(weight);
    }

    /// Add one positional occurrence of a term, increasing its weight by `weight`.
    pub fn add_posting(&mut self, prefix: &str, text: &str, position: u32, weight: u32) {
        let entry = self.entry(prefix, text);
        entry.wdf = entry.wdf.saturating_add(weight);
        entry.positions.insert(position);
    }

    /// Add a zero-weight, position-free filtering term.
    pub fn add_boolean_term(&mut self, prefix: &str, text: &str) {
        self.entry(prefix, text);
    }

    /// Whether the full term name is present.
    pub fn contains(&self, term: &str) -> bool {
        self.entries.contains_key(term)
    }

    /// Look a term up by its full name.
    pub fn get(&self, term: &str) -> Option<GeneratedTerm> {
        self.entries.get(term).map(|entry| to_generated(term, entry))
    }

    /// Iterate over all terms in name order.
    pub fn iter(&self) -> impl Iterator<Item = GeneratedTerm> + '_ {
        self.entries
            .iter()
            .map(|(term, entry)| to_generated(term, entry))
    }

    /// Iterate over the full term names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of distinct terms.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every term.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn to_generated(term: &str, entry: &TermEntry) -> GeneratedTerm {
    let text = &term[entry.prefix.len()..];
    GeneratedTerm {
        prefix: if entry.prefix.is_empty() {
            None
        } else {
            Some(entry.prefix.clone())
        },
        text: text.to_string(),
        weight: entry.wdf,
        positions: entry.positions.iter().copied().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_postings_accumulate() {
        let mut terms = TermSet::new();
        terms.add_posting("XNAME", "john", 0, 1);
        terms.add_posting("XNAME", "john", 3, 2);

        let term = terms.get("XNAMEjohn").unwrap();
        assert_eq!(term.prefix.as_deref(), Some("XNAME"));
        assert_eq!(term.text, "john");
        assert_eq!(term.weight, 3);
        assert_eq!(term.positions, vec![0, 3]);
        assert_eq!(term.term(), "XNAMEjohn");
    }

    #[test]
    fn test_boolean_term_has_no_weight() {
        let mut terms = TermSet::new();
        terms.add_boolean_term("XSTATUS", "active");

        let term = terms.get("XSTATUSactive").unwrap();
        assert_eq!(term.weight, 0);
        assert!(!term.has_positions());
    }

    #[test]
    fn test_unprefixed_and_ordering() {
        let mut terms = TermSet::new();
        terms.add_term("", "zebra", 1);
        terms.add_term("", "apple", 1);

        let names: Vec<_> = terms.names().collect();
        assert_eq!(names, vec!["apple", "zebra"]);
        assert_eq!(terms.get("apple").unwrap().prefix, None);

        terms.clear();
        assert!(terms.is_empty());
    }
}
