use serde::{Deserialize, Serialize};

/// Longest title accepted, counted in characters.
pub const TITLE_MAX_CHARS: usize = 150;

/// A persisted book information record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookInformation {
    /// Store-assigned identifier
    pub id: i64,
    /// Unique title
    pub title: String,
    /// Total copies owned
    pub stock: i64,
    /// Copies currently available; never exceeds `stock`
    pub available: i64,
}

/// The replaceable fields of a record, as proposed by Create or Update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookInformationDraft {
    pub title: String,
    pub stock: i64,
    pub available: i64,
}

impl BookInformationDraft {
    pub fn new(title: impl Into<String>, stock: i64, available: i64) -> Self {
        Self {
            title: title.into(),
            stock,
            available,
        }
    }

    /// Attach a store-assigned id.
    pub fn with_id(self, id: i64) -> BookInformation {
        BookInformation {
            id,
            title: self.title,
            stock: self.stock,
            available: self.available,
        }
    }
}
