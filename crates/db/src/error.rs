use thiserror::Error;

/// Store operation errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    /// A unique index rejected the write.
    #[error("unique constraint violated: {message}")]
    UniqueViolation { message: String },

    #[error("database error: {0}")]
    Sqlx(#[source] sqlx::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },
}

impl StoreError {
    /// Returns true when the error came from a unique index.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return Self::UniqueViolation {
                    message: db_err.message().to_string(),
                };
            }
        }
        Self::Sqlx(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_not_found_is_a_plain_sqlx_error() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Sqlx(_)));
        assert!(!err.is_unique_violation());
    }

    #[tokio::test]
    async fn unique_index_rejection_is_classified() {
        let pool = crate::DbPool::in_memory().await.unwrap();
        sqlx::raw_sql(
            "CREATE TABLE t (name TEXT NOT NULL);
             CREATE UNIQUE INDEX ix_t_name ON t (name);
             INSERT INTO t (name) VALUES ('a');",
        )
        .execute(pool.inner())
        .await
        .unwrap();

        let err: StoreError = sqlx::query("INSERT INTO t (name) VALUES ('a')")
            .execute(pool.inner())
            .await
            .unwrap_err()
            .into();

        assert!(err.is_unique_violation());
    }
}
