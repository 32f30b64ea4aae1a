//! Data access: single-statement operations against `book_information`.
//!
//! No business rules live here. Title uniqueness is left to the
//! `ix_book_information_title` index and surfaces as
//! [`StoreError::UniqueViolation`].

use async_trait::async_trait;
use bookinfo_db::{DbPool, Migration, StoreError};

use super::models::{BookInformation, BookInformationDraft};

pub(crate) const MIGRATIONS: &[Migration] = &[Migration {
    id: "001_init",
    up: r#"
        CREATE TABLE book_information (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            title     TEXT    NOT NULL,
            stock     INTEGER NOT NULL CHECK (stock >= 0),
            available INTEGER NOT NULL CHECK (available >= 0 AND available <= stock)
        );
        CREATE UNIQUE INDEX ix_book_information_title ON book_information (title);
        "#,
}];

/// Persisted-store operations for book information records
#[async_trait]
pub trait BookInformationStore: Send + Sync {
    /// Every record, ordered by id
    async fn list(&self) -> Result<Vec<BookInformation>, StoreError>;

    async fn get(&self, id: i64) -> Result<BookInformation, StoreError>;

    /// Insert a record; the store assigns the id
    async fn create(&self, draft: &BookInformationDraft) -> Result<BookInformation, StoreError>;

    /// Replace every mutable field of record `id`
    async fn update(
        &self,
        id: i64,
        draft: &BookInformationDraft,
    ) -> Result<BookInformation, StoreError>;

    async fn delete(&self, id: i64) -> Result<(), StoreError>;
}

/// SQLite-backed [`BookInformationStore`]
#[derive(Debug, Clone)]
pub struct SqliteBookInformationStore {
    pool: DbPool,
}

impl SqliteBookInformationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn not_found(id: i64) -> StoreError {
    StoreError::NotFound(format!("book information {}", id))
}

#[async_trait]
impl BookInformationStore for SqliteBookInformationStore {
    async fn list(&self) -> Result<Vec<BookInformation>, StoreError> {
        let records = sqlx::query_as::<_, BookInformation>(
            "SELECT id, title, stock, available FROM book_information ORDER BY id",
        )
        .fetch_all(self.pool.inner())
        .await?;
        Ok(records)
    }

    async fn get(&self, id: i64) -> Result<BookInformation, StoreError> {
        sqlx::query_as::<_, BookInformation>(
            "SELECT id, title, stock, available FROM book_information WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn create(&self, draft: &BookInformationDraft) -> Result<BookInformation, StoreError> {
        let record = sqlx::query_as::<_, BookInformation>(
            r#"
            INSERT INTO book_information (title, stock, available)
            VALUES (?, ?, ?)
            RETURNING id, title, stock, available
            "#,
        )
        .bind(&draft.title)
        .bind(draft.stock)
        .bind(draft.available)
        .fetch_one(self.pool.inner())
        .await?;
        Ok(record)
    }

    async fn update(
        &self,
        id: i64,
        draft: &BookInformationDraft,
    ) -> Result<BookInformation, StoreError> {
        sqlx::query_as::<_, BookInformation>(
            r#"
            UPDATE book_information
            SET title = ?, stock = ?, available = ?
            WHERE id = ?
            RETURNING id, title, stock, available
            "#,
        )
        .bind(&draft.title)
        .bind(draft.stock)
        .bind(draft.available)
        .bind(id)
        .fetch_optional(self.pool.inner())
        .await?
        .ok_or_else(|| not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM book_information WHERE id = ?")
            .bind(id)
            .execute(self.pool.inner())
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}
