//! Indexed entities.
//!
//! An item is identified solely by its canonical key. Tags, score and
//! payload are attributes that may change without changing identity, so
//! equality and hashing look at the key and nothing else.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Canonical form of a free-text name: trimmed, inner whitespace runs
/// collapsed to one space, lower-cased.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical identity of an item.
///
/// Deserialization re-normalizes, so keys read from a snapshot are always
/// canonical.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ItemKey(String);

impl ItemKey {
    /// Builds a key from free text, normalizing it.
    pub fn new(text: &str) -> Self {
        Self(normalize(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemKey {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for ItemKey {
    fn from(text: String) -> Self {
        Self::new(&text)
    }
}

impl From<ItemKey> for String {
    fn from(key: ItemKey) -> Self {
        key.0
    }
}

impl Borrow<str> for ItemKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ItemKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Opaque payload carried by an item.
///
/// Stored as raw bytes so snapshots stay self-describing-format agnostic.
/// JSON helpers cover the common case of structured metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Encodes any serializable value as a JSON payload.
    pub fn from_json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        serde_json::to_vec(value).map(Self)
    }

    /// Decodes a JSON payload.
    pub fn to_json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An indexed entity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Canonical identity, derived from `name`.
    pub key: ItemKey,

    /// Display name as supplied by the caller.
    pub name: String,

    /// Descriptive tags (genres, topics, labels).
    pub tags: BTreeSet<String>,

    /// Optional numeric score, e.g. a rating.
    pub score: Option<f64>,

    /// Caller-defined data.
    pub payload: Payload,
}

impl Item {
    /// Creates an item with no tags, score or payload.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            key: ItemKey::new(&name),
            name,
            tags: BTreeSet::new(),
            score: None,
            payload: Payload::default(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Number of tags this item shares with `other`.
    pub fn shared_tags(&self, other: &Item) -> usize {
        self.tags.intersection(&other.tags).count()
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Item {}

impl Hash for Item {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}
