use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Routes restricted to identities holding the `ADMIN` role. The role check happens in
/// the gate layered on this router, not inside the handlers.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/user/{id}
        // Any stored identity by id, password stripped.
        .route("/user/{id}", get(handlers::get_user))
}
