// handlers/public/search.rs - GET /api/search/listings

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};

use crate::database::models::Listing;
use crate::error::{ApiError, ApiResult};
use crate::filter::ListingFilter;
use crate::state::AppState;

/// GET /api/search/listings?location=&rent=&facility=&type= - Browse all listings
///
/// - `location`: case-insensitive substring of `locationString`
/// - `rent`: maximum rent, inclusive
/// - `facility`: tag present in `facilities` or `amenities`
/// - `type`: case-insensitive match on the listing type
pub async fn search_get(
    State(state): State<AppState>,
    query: Result<Query<ListingFilter>, QueryRejection>,
) -> ApiResult<Json<Vec<Listing>>> {
    let Query(filter) = query
        .map_err(|e| ApiError::bad_request(format!("Invalid search query: {}", e.body_text())))?;
    let listings = state.listing_service().search(&filter).await?;
    tracing::debug!("Search {:?} matched {} listing(s)", filter, listings.len());
    Ok(Json(listings))
}
