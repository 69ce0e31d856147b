//! Query resolution.
//!
//! A [`Resolver`] maps free text to the canonical key of an indexed item.
//! [`NameIndex`] is the bundled one: an n-gram inverted index over item
//! keys that prefers exact matches, then prefixes, then substrings.

use affinity_core::{normalize, ItemKey};
use std::collections::{BTreeSet, HashMap};

/// Minimum n-gram length for indexing.
const MIN_NGRAM_LEN: usize = 2;

/// Maximum n-gram length for indexing.
const MAX_NGRAM_LEN: usize = 4;

/// Maps free text to an item key.
pub trait Resolver {
    fn resolve(&self, query: &str) -> Option<ItemKey>;
}

impl<F> Resolver for F
where
    F: Fn(&str) -> Option<ItemKey>,
{
    fn resolve(&self, query: &str) -> Option<ItemKey> {
        self(query)
    }
}

/// Resolves a query only when it normalizes to a key in the set.
#[derive(Debug, Clone, Default)]
pub struct ExactResolver {
    keys: BTreeSet<ItemKey>,
}

impl ExactResolver {
    pub fn new<I: IntoIterator<Item = ItemKey>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }
}

impl Resolver for ExactResolver {
    fn resolve(&self, query: &str) -> Option<ItemKey> {
        let key = ItemKey::new(query);
        self.keys.contains(&key).then_some(key)
    }
}

/// An inverted index for fast name lookup.
///
/// Uses n-gram indexing to support substring matching. When a key is added,
/// we break it into overlapping n-grams and index each one. During lookup,
/// we intersect the query's n-grams and verify the survivors.
#[derive(Debug, Default, Clone)]
pub struct NameIndex {
    /// All indexed keys, ordered for prefix range scans.
    keys: BTreeSet<ItemKey>,
    /// Maps n-grams to the keys containing them.
    ngram_index: HashMap<String, BTreeSet<ItemKey>>,
}

impl NameIndex {
    /// Creates a new empty name index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a key into the index.
    pub fn insert(&mut self, key: &ItemKey) {
        if !self.keys.insert(key.clone()) {
            return;
        }
        for ngram in generate_ngrams(key.as_str()) {
            self.ngram_index.entry(ngram).or_default().insert(key.clone());
        }
    }

    /// Removes a key from the index.
    pub fn remove(&mut self, key: &ItemKey) {
        if !self.keys.remove(key) {
            return;
        }
        for ngram in generate_ngrams(key.as_str()) {
            if let Some(keys) = self.ngram_index.get_mut(&ngram) {
                keys.remove(key);
                if keys.is_empty() {
                    self.ngram_index.remove(&ngram);
                }
            }
        }
    }

    /// Keys matching `query`, best first.
    ///
    /// The exact key leads, followed by keys starting with the query and
    /// then keys merely containing it. Within each group shorter keys come
    /// first, ties broken alphabetically.
    pub fn suggestions(&self, query: &str, limit: usize) -> Vec<ItemKey> {
        let query = normalize(query);
        if query.is_empty() || limit == 0 {
            return Vec::new();
        }

        let exact = ItemKey::new(&query);
        let mut results = Vec::new();
        if self.keys.contains(&exact) {
            results.push(exact.clone());
        }

        let mut prefixed: Vec<&ItemKey> = self
            .keys
            .range(exact.clone()..)
            .take_while(|key| key.as_str().starts_with(&query))
            .filter(|key| **key != exact)
            .collect();
        by_length(&mut prefixed);
        results.extend(prefixed.into_iter().cloned());

        if results.len() < limit {
            let mut containing: Vec<&ItemKey> = self
                .substring_matches(&query)
                .into_iter()
                .filter(|key| !key.as_str().starts_with(&query))
                .collect();
            by_length(&mut containing);
            results.extend(containing.into_iter().cloned());
        }

        results.truncate(limit);
        results
    }

    /// Returns the number of indexed keys.
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    fn substring_matches(&self, query: &str) -> Vec<&ItemKey> {
        // Too short for n-grams: scan everything.
        if query.chars().count() < MIN_NGRAM_LEN {
            return self
                .keys
                .iter()
                .filter(|key| key.as_str().contains(query))
                .collect();
        }

        let mut candidates: Option<BTreeSet<&ItemKey>> = None;
        for ngram in generate_ngrams(query) {
            let Some(keys) = self.ngram_index.get(&ngram) else {
                // If any n-gram has no matches, the query has no results
                return Vec::new();
            };
            match &mut candidates {
                None => candidates = Some(keys.iter().collect()),
                Some(c) => c.retain(|key| keys.contains(*key)),
            }
        }

        // n-gram intersection can have false positives
        candidates
            .unwrap_or_default()
            .into_iter()
            .filter(|key| key.as_str().contains(query))
            .collect()
    }
}

impl Resolver for NameIndex {
    fn resolve(&self, query: &str) -> Option<ItemKey> {
        self.suggestions(query, 1).into_iter().next()
    }
}

fn by_length(keys: &mut [&ItemKey]) {
    keys.sort_by(|a, b| a.as_str().len().cmp(&b.as_str().len()).then_with(|| a.cmp(b)));
}

/// Generates n-grams for a normalized string.
fn generate_ngrams(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut ngrams = Vec::new();

    for n in MIN_NGRAM_LEN..=MAX_NGRAM_LEN {
        if chars.len() >= n {
            for i in 0..=(chars.len() - n) {
                ngrams.push(chars[i..i + n].iter().collect());
            }
        }
    }

    ngrams
}
