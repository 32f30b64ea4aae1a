//! Wire shapes for book information and their translation to the domain.
//!
//! The facade owns the versioned contract: request/response structs and the
//! mapping from [`BookInformationError`] to [`AppError`].

use async_trait::async_trait;
use bookinfo_http::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use super::logic::{BookInformationError, BookInformationService};
use super::models::{BookInformation, BookInformationDraft};

/// Request body for Create and Update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct BookInformationRequest {
    /// Unique title, at most 150 characters
    #[serde(alias = "title")]
    pub title: String,
    /// Total copies owned
    #[serde(alias = "stock")]
    pub stock: i64,
    /// Copies currently available, at most `Stock`
    #[serde(alias = "available")]
    pub available: i64,
}

/// A book information record as returned to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct BookInformationResponse {
    pub id: i64,
    pub title: String,
    pub stock: i64,
    pub available: i64,
}

impl From<BookInformationRequest> for BookInformationDraft {
    fn from(request: BookInformationRequest) -> Self {
        BookInformationDraft::new(request.title, request.stock, request.available)
    }
}

impl From<BookInformation> for BookInformationResponse {
    fn from(record: BookInformation) -> Self {
        Self {
            id: record.id,
            title: record.title,
            stock: record.stock,
            available: record.available,
        }
    }
}

impl From<BookInformationError> for AppError {
    fn from(err: BookInformationError) -> Self {
        match err {
            BookInformationError::Validation { field, ref message } => AppError::validation(
                vec![json!({ "field": field, "error": message })],
                err.to_string(),
            ),
            BookInformationError::NotFound { .. } => AppError::not_found(err.to_string()),
            BookInformationError::DuplicateTitle { ref title } => AppError::conflict(
                vec![json!({ "field": "Title", "error": "duplicate", "value": title })],
                err.to_string(),
            ),
            BookInformationError::Store(_) => AppError::Internal(anyhow::Error::new(err)),
        }
    }
}

/// Boundary operations consumed by the HTTP endpoints
#[async_trait]
pub trait BookInformationFacade: Send + Sync {
    async fn list(&self) -> Result<Vec<BookInformationResponse>, AppError>;

    async fn get(&self, id: i64) -> Result<BookInformationResponse, AppError>;

    async fn create(
        &self,
        request: BookInformationRequest,
    ) -> Result<BookInformationResponse, AppError>;

    async fn update(
        &self,
        id: i64,
        request: BookInformationRequest,
    ) -> Result<BookInformationResponse, AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}

/// [`BookInformationFacade`] that delegates to a [`BookInformationService`]
pub struct ServiceFacade<B> {
    service: B,
}

impl<B: BookInformationService> ServiceFacade<B> {
    pub fn new(service: B) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<B: BookInformationService> BookInformationFacade for ServiceFacade<B> {
    async fn list(&self) -> Result<Vec<BookInformationResponse>, AppError> {
        let records = self.service.list().await?;
        Ok(records.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: i64) -> Result<BookInformationResponse, AppError> {
        Ok(self.service.get(id).await?.into())
    }

    async fn create(
        &self,
        request: BookInformationRequest,
    ) -> Result<BookInformationResponse, AppError> {
        Ok(self.service.create(request.into()).await?.into())
    }

    async fn update(
        &self,
        id: i64,
        request: BookInformationRequest,
    ) -> Result<BookInformationResponse, AppError> {
        Ok(self.service.update(id, request.into()).await?.into())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        Ok(self.service.delete(id).await?)
    }
}
