use crate::{AppState, handlers};
use axum::{Router, routing::post};

/// Public Router Module
///
/// Endpoints reachable without a token. Login in particular must stay outside every
/// role gate, otherwise no client could ever obtain a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // POST /api/login
        // Exchanges {username, password} for the identity plus a signed token.
        .route("/login", post(handlers::login))
        // POST /api/verifyToken
        // Decodes {token} and echoes the embedded identity; 403 when the token is not valid.
        .route("/verifyToken", post(handlers::verify_token))
}
