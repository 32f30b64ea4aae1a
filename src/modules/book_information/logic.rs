//! Business rules for book information records.
//!
//! Every draft is validated before the store is touched. Checks run in a fixed
//! order (title, stock, availability) and stop at the first failure, so a given
//! bad input always yields the same error.

use async_trait::async_trait;
use bookinfo_db::StoreError;
use thiserror::Error;

use super::data::BookInformationStore;
use super::models::{BookInformation, BookInformationDraft, TITLE_MAX_CHARS};

/// Domain outcomes of book information operations
#[derive(Error, Debug)]
pub enum BookInformationError {
    #[error("{field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error("book information {id} not found")]
    NotFound { id: i64 },

    #[error("a book titled '{title}' already exists")]
    DuplicateTitle { title: String },

    #[error("book information store failed")]
    Store(#[source] StoreError),
}

impl BookInformationError {
    fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Translate a store failure for the record `id` / `title` being worked on.
    fn from_store(err: StoreError, id: Option<i64>, title: Option<&str>) -> Self {
        match (err, id, title) {
            (StoreError::NotFound(_), Some(id), _) => Self::NotFound { id },
            (StoreError::UniqueViolation { .. }, _, Some(title)) => Self::DuplicateTitle {
                title: title.to_string(),
            },
            (err, _, _) => Self::Store(err),
        }
    }
}

/// Check a proposed record against the domain invariants.
pub fn validate(draft: &BookInformationDraft) -> Result<(), BookInformationError> {
    if draft.title.trim().is_empty() {
        return Err(BookInformationError::validation("Title", "title is required"));
    }

    let title_chars = draft.title.chars().count();
    if title_chars > TITLE_MAX_CHARS {
        return Err(BookInformationError::validation(
            "Title",
            format!(
                "title must be at most {} characters, got {}",
                TITLE_MAX_CHARS, title_chars
            ),
        ));
    }

    if draft.stock < 0 {
        return Err(BookInformationError::validation(
            "Stock",
            "stock must not be negative",
        ));
    }

    if draft.available < 0 {
        return Err(BookInformationError::validation(
            "Available",
            "available must not be negative",
        ));
    }

    if draft.available > draft.stock {
        return Err(BookInformationError::validation(
            "Available",
            format!(
                "available ({}) must not exceed stock ({})",
                draft.available, draft.stock
            ),
        ));
    }

    Ok(())
}

/// Validated operations on book information records
#[async_trait]
pub trait BookInformationService: Send + Sync {
    async fn list(&self) -> Result<Vec<BookInformation>, BookInformationError>;

    async fn get(&self, id: i64) -> Result<BookInformation, BookInformationError>;

    async fn create(
        &self,
        draft: BookInformationDraft,
    ) -> Result<BookInformation, BookInformationError>;

    async fn update(
        &self,
        id: i64,
        draft: BookInformationDraft,
    ) -> Result<BookInformation, BookInformationError>;

    async fn delete(&self, id: i64) -> Result<(), BookInformationError>;
}

/// [`BookInformationService`] over any [`BookInformationStore`]
pub struct BookInformationManager<S> {
    store: S,
}

impl<S: BookInformationStore> BookInformationManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn check(
        &self,
        operation: &'static str,
        draft: &BookInformationDraft,
    ) -> Result<(), BookInformationError> {
        validate(draft).inspect_err(|e| {
            tracing::info!(operation, error = %e, "book information rejected");
        })
    }
}

#[async_trait]
impl<S: BookInformationStore> BookInformationService for BookInformationManager<S> {
    async fn list(&self) -> Result<Vec<BookInformation>, BookInformationError> {
        tracing::debug!("listing book information");
        self.store
            .list()
            .await
            .map_err(|e| BookInformationError::from_store(e, None, None))
    }

    async fn get(&self, id: i64) -> Result<BookInformation, BookInformationError> {
        tracing::debug!(id, "getting book information");
        self.store
            .get(id)
            .await
            .map_err(|e| BookInformationError::from_store(e, Some(id), None))
    }

    async fn create(
        &self,
        draft: BookInformationDraft,
    ) -> Result<BookInformation, BookInformationError> {
        self.check("create", &draft)?;

        let record = self
            .store
            .create(&draft)
            .await
            .map_err(|e| BookInformationError::from_store(e, None, Some(&draft.title)))?;

        tracing::debug!(id = record.id, title = %record.title, "book information created");
        Ok(record)
    }

    async fn update(
        &self,
        id: i64,
        draft: BookInformationDraft,
    ) -> Result<BookInformation, BookInformationError> {
        self.check("update", &draft)?;

        let record = self
            .store
            .update(id, &draft)
            .await
            .map_err(|e| BookInformationError::from_store(e, Some(id), Some(&draft.title)))?;

        tracing::debug!(id, "book information updated");
        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<(), BookInformationError> {
        self.store
            .delete(id)
            .await
            .map_err(|e| BookInformationError::from_store(e, Some(id), None))?;

        tracing::debug!(id, "book information deleted");
        Ok(())
    }
}
