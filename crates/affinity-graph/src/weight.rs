//! Pairwise weight functions.
//!
//! A weight is a distance: 0 for identical items, larger for less similar
//! ones. Functions are expected to be deterministic and must not return
//! negative values; the index rejects those.

use affinity_core::Item;

/// Scores the dissimilarity of two items.
pub trait WeightFunction: Send + Sync {
    fn weight(&self, a: &Item, b: &Item) -> f64;
}

impl<F> WeightFunction for F
where
    F: Fn(&Item, &Item) -> f64 + Send + Sync,
{
    fn weight(&self, a: &Item, b: &Item) -> f64 {
        self(a, b)
    }
}

/// Jaccard distance over tag sets: `1 - |A ∩ B| / |A ∪ B|`.
///
/// Two untagged items are considered identical (distance 0).
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardDistance;

impl WeightFunction for JaccardDistance {
    fn weight(&self, a: &Item, b: &Item) -> f64 {
        let shared = a.shared_tags(b);
        let union = a.tags.len() + b.tags.len() - shared;
        if union == 0 {
            return 0.0;
        }
        1.0 - shared as f64 / union as f64
    }
}

/// `ceiling - shared tag count`.
///
/// Goes negative when two items share more than `ceiling` tags, which the
/// index reports as an invariant violation, so pick a ceiling at least as
/// large as the biggest tag set.
#[derive(Debug, Clone, Copy)]
pub struct SharedTagDistance {
    pub ceiling: f64,
}

impl SharedTagDistance {
    pub fn new(ceiling: f64) -> Self {
        Self { ceiling }
    }
}

impl WeightFunction for SharedTagDistance {
    fn weight(&self, a: &Item, b: &Item) -> f64 {
        self.ceiling - a.shared_tags(b) as f64
    }
}
