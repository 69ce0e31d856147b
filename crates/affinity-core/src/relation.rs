//! Weighted relations between items.
//!
//! Relations are undirected: the pair is stored smaller key first, so
//! `Relation::new(a, b, w) == Relation::new(b, a, w)`.

use crate::error::{Error, Result};
use crate::item::ItemKey;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An undirected connection between two items. The weight is a distance:
/// smaller means more similar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RelationRepr", into = "RelationRepr")]
pub struct Relation {
    lo: ItemKey,
    hi: ItemKey,
    weight: f64,
}

impl Relation {
    /// Creates a relation.
    ///
    /// Fails with [`Error::InvariantViolation`] when both endpoints are the
    /// same item, or when the weight is negative or NaN. Infinity is allowed.
    pub fn new(a: ItemKey, b: ItemKey, weight: f64) -> Result<Self> {
        if a == b {
            return Err(Error::InvariantViolation(format!(
                "relation from `{a}` to itself"
            )));
        }
        check_weight(weight, &a, &b)?;
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        Ok(Self { lo, hi, weight })
    }

    /// The endpoints in canonical order.
    pub fn endpoints(&self) -> (&ItemKey, &ItemKey) {
        (&self.lo, &self.hi)
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Whether `key` is one of the endpoints.
    pub fn touches(&self, key: &ItemKey) -> bool {
        &self.lo == key || &self.hi == key
    }

    /// Returns the opposite endpoint, or `None` if `key` is not on this relation.
    pub fn other(&self, key: &ItemKey) -> Option<&ItemKey> {
        if key == &self.lo {
            Some(&self.hi)
        } else if key == &self.hi {
            Some(&self.lo)
        } else {
            None
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {} ({})", self.lo, self.hi, self.weight)
    }
}

/// Wire form of a relation. Decoding goes back through [`Relation::new`].
#[derive(Serialize, Deserialize)]
struct RelationRepr {
    a: ItemKey,
    b: ItemKey,
    weight: f64,
}

impl TryFrom<RelationRepr> for Relation {
    type Error = Error;

    fn try_from(repr: RelationRepr) -> Result<Self> {
        Relation::new(repr.a, repr.b, repr.weight)
    }
}

impl From<Relation> for RelationRepr {
    fn from(relation: Relation) -> Self {
        Self {
            a: relation.lo,
            b: relation.hi,
            weight: relation.weight,
        }
    }
}

/// Rejects weights the shortest-path ranking cannot order correctly.
fn check_weight(weight: f64, a: &ItemKey, b: &ItemKey) -> Result<()> {
    if weight.is_nan() || weight < 0.0 {
        return Err(Error::InvariantViolation(format!(
            "weight {weight} between `{a}` and `{b}` must be a non-negative number"
        )));
    }
    Ok(())
}
