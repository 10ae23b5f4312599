// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Token acquisition, service status and listing search. No caller identity
// is available here, so every input is validated from scratch.
pub mod auth;
pub mod search;
pub mod system;

pub use auth::{login_post, signup_post};
pub use search::search_get;
pub use system::{health, root};
