//! Raw change-feed records, as emitted by the store on every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of mutation a change record describes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeOperation {
    Insert,
    Replace,
    Update,
    Delete,
    /// Anything the feed emits that we don't model (drop, invalidate, ...).
    Other(String),
}

impl ChangeOperation {
    pub fn parse(s: &str) -> Self {
        match s {
            "insert" => Self::Insert,
            "replace" => Self::Replace,
            "update" => Self::Update,
            "delete" => Self::Delete,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Insert => "insert",
            Self::Replace => "replace",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other(s) => s,
        }
    }

    /// Whether this operation makes a new item text visible.
    pub fn adds_item(&self) -> bool {
        matches!(self, Self::Insert | Self::Replace)
    }
}

impl std::fmt::Display for ChangeOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Document carried by a change record. Every field is optional because
/// feeds may deliver partial or malformed documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One notification from the change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub operation_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_document: Option<ItemDocument>,
}

impl ChangeRecord {
    pub fn new(operation: ChangeOperation, full_document: Option<ItemDocument>) -> Self {
        Self {
            operation_type: operation.as_str().to_string(),
            full_document,
        }
    }

    /// Shorthand for an insert of a document with the given text.
    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(
            ChangeOperation::Insert,
            Some(ItemDocument {
                text: Some(text.into()),
                ..Default::default()
            }),
        )
    }

    pub fn operation(&self) -> ChangeOperation {
        ChangeOperation::parse(&self.operation_type)
    }
}
