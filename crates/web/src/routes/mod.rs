//! HTTP route handlers for the sweet shop.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Catalog dashboard (search + filters)
//! GET  /health                  - Liveness check
//! GET  /health/ready            - Readiness check (probes Supabase)
//!
//! # Sweets (admin only unless noted)
//! GET  /sweets/new              - Add sweet form
//! POST /sweets                  - Create sweet
//! GET  /sweets/{id}/edit        - Edit sweet form
//! POST /sweets/{id}             - Update sweet
//! POST /sweets/{id}/delete      - Delete sweet
//! POST /sweets/{id}/purchase    - Purchase one unit (any signed-in user)
//! GET  /sweets/{id}/restock     - Restock form
//! POST /sweets/{id}/restock     - Restock sweet
//!
//! # Auth
//! GET  /auth/login              - Login page
//! POST /auth/login              - Login action
//! GET  /auth/register           - Register page
//! POST /auth/register           - Register action
//! POST /auth/logout             - Logout action
//! ```
//!
//! Every sweet mutation follows the same write-then-reload cycle: one
//! Supabase write, then a full catalog refresh, then a redirect back to
//! the dashboard. Handlers never patch the in-memory catalog directly.

pub mod auth;
pub mod dashboard;
pub mod sweets;

use axum::{
    Router,
    http::Uri,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::error::{AppError, clear_sentry_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Signed-in user data shared by every authenticated template.
#[derive(Debug, Clone)]
pub struct UserView {
    pub email: String,
    pub is_admin: bool,
}

impl From<&CurrentUser> for UserView {
    fn from(user: &CurrentUser) -> Self {
        Self {
            email: user.email.to_string(),
            is_admin: user.is_admin,
        }
    }
}

/// Tear down the session after Supabase rejects the stored access token.
///
/// Tokens expire server side; the session may outlive them. Flushing and
/// bouncing to the login page beats serving an endless string of 401s.
pub async fn expire_session(session: &Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush expired session: {e}");
    }
    clear_sentry_user();
    Redirect::to("/auth/login?error=session_expired").into_response()
}

/// Fallback handler for unmatched paths.
pub async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", post(auth::logout))
}

/// Create the sweet management routes router.
pub fn sweet_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(sweets::create))
        .route("/new", get(sweets::new_sweet_page))
        .route("/{id}", post(sweets::update))
        .route("/{id}/edit", get(sweets::edit_sweet_page))
        .route("/{id}/delete", post(sweets::delete))
        .route("/{id}/purchase", post(sweets::purchase))
        .route(
            "/{id}/restock",
            get(sweets::restock_page).post(sweets::restock),
        )
}

/// Create all routes for the sweet shop.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog dashboard
        .route("/", get(dashboard::dashboard))
        // Sweet management
        .nest("/sweets", sweet_routes())
        // Auth routes
        .nest("/auth", auth_routes())
}
