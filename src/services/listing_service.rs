use std::sync::Arc;
use uuid::Uuid;

use crate::api::{ListingPatch, NewListing, RawFields};
use crate::database::models::Listing;
use crate::database::Store;
use crate::error::{ApiError, ApiResult};
use crate::filter::ListingFilter;
use crate::middleware::auth::AuthUser;
use crate::upload::{UploadError, UploadStore, UploadedFile};

const NOT_FOUND: &str = "Listing not found";

/// Owner-scoped listing operations. Every read or write of a single listing
/// requires the caller's email to equal the stored `ownerEmail`.
pub struct ListingService {
    store: Arc<dyn Store>,
    uploads: UploadStore,
    max_files: usize,
}

impl ListingService {
    pub fn new(store: Arc<dyn Store>, uploads: UploadStore, max_files: usize) -> Self {
        Self {
            store,
            uploads,
            max_files,
        }
    }

    /// Any authenticated role may create. Fields are validated before any file
    /// is written, so a rejected request leaves nothing behind.
    pub async fn create(
        &self,
        caller: &AuthUser,
        fields: &RawFields,
        files: Vec<UploadedFile>,
    ) -> ApiResult<Listing> {
        let new_listing = NewListing::from_fields(fields)?;
        if files.len() > self.max_files {
            return Err(UploadError::TooManyFiles { max: self.max_files }.into());
        }

        let images = self.uploads.save_all(files).await?;
        let listing = new_listing.into_listing(caller.email.clone(), images);
        self.store.insert_listing(&listing).await?;

        tracing::info!(
            "Created listing {} for {} with {} image(s)",
            listing.id,
            listing.owner_email,
            listing.images.len()
        );
        Ok(listing)
    }

    pub async fn list_own(&self, caller: &AuthUser) -> ApiResult<Vec<Listing>> {
        Ok(self.store.listings_by_owner(&caller.email).await?)
    }

    /// Owner-only, including plain reads
    pub async fn get(&self, caller: &AuthUser, id: &str) -> ApiResult<Listing> {
        self.owned(caller, id, "Unauthorized to view this listing").await
    }

    /// Malformed nested fields are rejected here the same way create rejects them
    pub async fn update(&self, caller: &AuthUser, id: &str, fields: &RawFields) -> ApiResult<Listing> {
        let mut listing = self.owned(caller, id, "Unauthorized to update this listing").await?;
        let patch = ListingPatch::from_fields(fields)?;
        patch.apply(&mut listing);

        if !self.store.replace_listing(&listing).await? {
            // Deleted between the read and the write
            return Err(ApiError::not_found(NOT_FOUND));
        }
        tracing::info!("Updated listing {}", listing.id);
        Ok(listing)
    }

    pub async fn delete(&self, caller: &AuthUser, id: &str) -> ApiResult<()> {
        let listing = self.owned(caller, id, "Unauthorized to delete this listing").await?;
        if !self.store.delete_listing(listing.id).await? {
            return Err(ApiError::not_found(NOT_FOUND));
        }
        tracing::info!("Deleted listing {}", listing.id);
        Ok(())
    }

    /// Public search, no identity involved
    pub async fn search(&self, filter: &ListingFilter) -> ApiResult<Vec<Listing>> {
        Ok(self.store.search_listings(filter).await?)
    }

    async fn owned(&self, caller: &AuthUser, id: &str, forbidden: &str) -> ApiResult<Listing> {
        // An id that cannot exist is reported like any other missing listing
        let id = Uuid::parse_str(id).map_err(|_| ApiError::not_found(NOT_FOUND))?;
        let listing = self
            .store
            .find_listing(id)
            .await?
            .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

        if !listing.is_owned_by(&caller.email) {
            tracing::warn!("{} denied access to listing {} owned by another user", caller.email, id);
            return Err(ApiError::forbidden(forbidden));
        }
        Ok(listing)
    }
}
