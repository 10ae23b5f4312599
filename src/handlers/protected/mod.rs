// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`, which injects the
// caller's `AuthUser` into request extensions before the handler runs.
pub mod listings;

pub use listings::{listing_create, listing_delete, listing_get, listing_list, listing_update};
