use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{Listing, User};
use crate::filter::ListingFilter;

/// Errors surfaced by any store backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Email already registered: {0}")]
    DuplicateEmail(String),

    #[error("Corrupt document {id}: {reason}")]
    CorruptDocument { id: String, reason: String },

    #[error("Query error: {0}")]
    QueryError(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Credential records keyed by email
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with [`StoreError::DuplicateEmail`] if the email is taken
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user(&self, email: &str) -> Result<Option<User>, StoreError>;
}

/// Listing documents. Each call is atomic per document; nothing spans
/// multiple documents.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn insert_listing(&self, listing: &Listing) -> Result<(), StoreError>;

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError>;

    async fn listings_by_owner(&self, owner_email: &str) -> Result<Vec<Listing>, StoreError>;

    async fn search_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError>;

    /// Overwrite the stored document. Returns false if it no longer exists.
    async fn replace_listing(&self, listing: &Listing) -> Result<bool, StoreError>;

    /// Returns false if nothing was deleted
    async fn delete_listing(&self, id: Uuid) -> Result<bool, StoreError>;
}

/// Everything the API needs from persistence
#[async_trait]
pub trait Store: UserStore + ListingStore {
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;
}
