use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category;

/// Marker prefix for identifiers generated client-side before the backend
/// has ever accepted the document.
pub const LOCAL_ID_PREFIX: &str = "local-";

/// A document identifier: either a temporary local id minted on creation or
/// the permanent id the backend assigned on first remote save.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum DocumentId {
    Local(Uuid),
    Remote(u64),
}

impl DocumentId {
    pub fn new_local() -> Self {
        Self::Local(Uuid::new_v4())
    }

    /// True while the document has never been confirmed persisted remotely.
    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local(_))
    }

    pub fn remote(&self) -> Option<u64> {
        match self {
            Self::Remote(n) => Some(*n),
            Self::Local(_) => None,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(uuid) => write!(f, "{}{}", LOCAL_ID_PREFIX, uuid),
            Self::Remote(n) => write!(f, "{}", n),
        }
    }
}

impl FromStr for DocumentId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = s.strip_prefix(LOCAL_ID_PREFIX) {
            let uuid = Uuid::parse_str(rest)
                .map_err(|e| format!("invalid local document id '{}': {}", s, e))?;
            return Ok(Self::Local(uuid));
        }
        s.parse::<u64>()
            .map(Self::Remote)
            .map_err(|_| format!("invalid document id '{}'", s))
    }
}

impl From<DocumentId> for String {
    fn from(id: DocumentId) -> Self {
        id.to_string()
    }
}

impl TryFrom<String> for DocumentId {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub name: String,
    pub category: String,
    pub content: String,
    /// Assigned by the backend on first remote save; absent for purely
    /// local documents.
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: DocumentId::new_local(),
            name: name.into(),
            category: category::GENERAL.to_string(),
            content: String::new(),
            created_at: None,
            updated_at: None,
        }
    }

    /// True once the document carries a backend-assigned identifier.
    pub fn is_synced(&self) -> bool {
        !self.id.is_local()
    }

    /// Whether two documents occupy the same logical slot during sync
    /// reconciliation (matching name and category).
    pub fn same_slot(&self, other: &Document) -> bool {
        self.name == other.name && self.category == other.category
    }
}
