use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers;
use crate::middleware::auth::jwt_auth_middleware;
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let uploads = &state.config().uploads;
    let serve_uploads = ServeDir::new(uploads.dir.clone());
    let upload_prefix = uploads.public_prefix.clone();
    let cors = cors_layer(&state.config().security.cors_origins);

    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        .merge(auth_routes())
        .merge(search_routes())
        // Protected
        .merge(listing_routes(state.clone()))
        // Static image files
        .nest_service(&upload_prefix, serve_uploads)
        // Global middleware
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes() -> Router<AppState> {
    use handlers::public::{login_post, signup_post};

    Router::new()
        .route("/api/auth/signup", post(signup_post))
        .route("/api/auth/login", post(login_post))
}

fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search/listings", get(handlers::public::search_get))
}

fn listing_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::{listing_create, listing_delete, listing_get, listing_list, listing_update};

    let body_limit = state.config().uploads.max_request_bytes;

    Router::new()
        .route("/api/listings", get(listing_list).post(listing_create))
        .route(
            "/api/listings/:id",
            get(listing_get).put(listing_update).delete(listing_delete),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .route_layer(from_fn_with_state(state, jwt_auth_middleware))
}

/// `*` (or an empty list) allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin {:?}", o);
                None
            }
        })
        .collect();
    layer.allow_origin(parsed)
}
