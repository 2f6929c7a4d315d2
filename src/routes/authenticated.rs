use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Routes for any caller holding a valid token, whatever their roles.
///
/// Every handler here extracts `CurrentUser`, which only exists once the gate layered
/// on this router in `create_router` has accepted the request.
pub fn authenticated_routes() -> Router<AppState> {
    Router::new()
        // POST /api/changePassword
        // Re-verifies the old password of the caller before storing the new one.
        .route("/changePassword", post(handlers::change_password))
        // GET /api/me
        // The identity embedded in the caller's token.
        .route("/me", get(handlers::get_me))
}
