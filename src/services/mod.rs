pub mod auth_service;
pub mod listing_service;

pub use auth_service::{AuthResponse, AuthService, LoginRequest, SignupRequest};
pub use listing_service::ListingService;
