//! SQLite persistence plumbing shared by every module.
//!
//! - [`pool`] - connection pool factory
//! - [`migrate`] - module-contributed migrations and the runner that applies them
//! - [`error`] - store error taxonomy

pub mod error;
pub mod migrate;
pub mod pool;

pub use error::StoreError;
pub use migrate::Migration;
pub use pool::DbPool;

/// Result type alias
pub type Result<T> = std::result::Result<T, StoreError>;
