//! Storage port for user records.
//!
//! The store only knows single-predicate queries; anything compound is built
//! on top of it by [`crate::users::services::UserUseCase`].

use async_trait::async_trait;
use thiserror::Error;

use crate::users::repo_types::{FetchOutcome, NewUser, UserRecord};

/// Errors raised by user store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Query or mutation failed in the database.
    #[error("user store query failed: {0}")]
    Query(#[from] sqlx::Error),
    /// Insert rejected because the contact number is already stored.
    #[error("user with phone {phone} is already stored")]
    DuplicatePhone { phone: String },
    /// Store could not serve the request at all.
    #[error("user store unavailable: {message}")]
    Unavailable { message: String },
}

impl StoreError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn exists_by_id(&self, id: i64) -> Result<bool, StoreError>;

    /// Logical AND of [`UserStore::exists_by_id`] over `ids`, stopping at the
    /// first missing id.
    async fn exists_all_by_ids(&self, ids: &[i64]) -> Result<bool, StoreError>;

    async fn exists_by_phone(&self, phone: &str) -> Result<bool, StoreError>;

    /// Point lookup. `Ok(None)` when no row has this id.
    async fn fetch_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;

    /// One outcome per requested id, in request order.
    async fn fetch_many_by_ids(&self, ids: &[i64]) -> Vec<FetchOutcome>;

    /// Case-insensitive substring match on the locality, ordered by id.
    async fn scan_by_city(&self, city: &str) -> Result<Vec<UserRecord>, StoreError>;

    /// Exact match on the contact number, ordered by id.
    async fn scan_by_phone(&self, phone: &str) -> Result<Vec<UserRecord>, StoreError>;

    /// Every record with the given marital flag, ordered by id.
    async fn scan_by_married(&self, married: bool) -> Result<Vec<UserRecord>, StoreError>;

    /// Persist a new user and return it with its assigned id.
    async fn insert(&self, user: &NewUser) -> Result<UserRecord, StoreError>;
}
