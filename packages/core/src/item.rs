//! Item domain types for entries in the list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use ulid::Ulid;

/// Maximum length of an item's text, in characters.
pub const MAX_ITEM_LEN: usize = 100;

/// Unique identifier for an item, using ULID for chronological sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub Ulid);

impl ItemId {
    /// Create a new unique item ID.
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Parse an item ID from a string.
    pub fn parse(s: &str) -> Result<Self, ulid::DecodeError> {
        Ok(Self(Ulid::from_string(s)?))
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Reasons an item's text is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Item text must not be empty")]
    Empty,
    #[error("Item text is {len} characters, maximum is {max}")]
    TooLong { len: usize, max: usize },
}

/// Validated item text: trimmed, 1 to [`MAX_ITEM_LEN`] characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ItemText(String);

impl ItemText {
    /// Validate raw input. Surrounding whitespace is trimmed first.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty);
        }

        let len = trimmed.chars().count();
        if len > MAX_ITEM_LEN {
            return Err(ValidationError::TooLong {
                len,
                max: MAX_ITEM_LEN,
            });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for ItemText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored list entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier for this item.
    pub id: ItemId,
    /// The item's text.
    pub text: String,
    /// When the item was stored.
    pub created_at: DateTime<Utc>,
}
