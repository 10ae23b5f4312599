pub mod listing;
pub mod user;

pub use listing::{LatLng, Listing, Location, OwnerContact};
pub use user::{Role, User};
