use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::models::{Listing, User};
use crate::database::store::{ListingStore, Store, StoreError, UserStore};
use crate::filter::ListingFilter;

/// Process-local store used when no `DATABASE_URL` is configured.
/// Contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    users: Arc<RwLock<HashMap<String, User>>>,
    /// Insertion order is creation order
    listings: Arc<RwLock<Vec<Listing>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::DuplicateEmail(user.email.clone()));
        }
        users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    async fn find_user(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn insert_listing(&self, listing: &Listing) -> Result<(), StoreError> {
        self.listings.write().await.push(listing.clone());
        Ok(())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, StoreError> {
        Ok(self.listings.read().await.iter().find(|l| l.id == id).cloned())
    }

    async fn listings_by_owner(&self, owner_email: &str) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().filter(|l| l.is_owned_by(owner_email)).cloned().collect())
    }

    async fn search_listings(&self, filter: &ListingFilter) -> Result<Vec<Listing>, StoreError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().filter(|l| filter.matches(l)).cloned().collect())
    }

    async fn replace_listing(&self, listing: &Listing) -> Result<bool, StoreError> {
        let mut listings = self.listings.write().await;
        match listings.iter_mut().find(|l| l.id == listing.id) {
            Some(slot) => {
                *slot = listing.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_listing(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut listings = self.listings.write().await;
        let before = listings.len();
        listings.retain(|l| l.id != id);
        Ok(listings.len() != before)
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Role;
    use chrono::Utc;

    fn user(email: &str) -> User {
        User {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn rejects_duplicate_email() {
        let store = MemoryStore::new();
        store.insert_user(&user("a@example.com")).await.unwrap();
        let err = store.insert_user(&user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail(ref e) if e == "a@example.com"));
    }

    #[tokio::test]
    async fn missing_listing_is_not_replaced_or_deleted() {
        let store = MemoryStore::new();
        assert!(store.find_listing(Uuid::new_v4()).await.unwrap().is_none());
        assert!(!store.delete_listing(Uuid::new_v4()).await.unwrap());
    }
}
