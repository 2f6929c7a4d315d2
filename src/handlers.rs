use crate::{
    auth::{Authenticator, CurrentUser},
    error::{AuthError, StoreError},
    extract::LenientJson,
    models::{ChangePasswordRequest, Identity, LoginRequest, VerifyTokenRequest},
    repository::CredentialStoreState,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

// --- Handlers ---

/// login
///
/// [Public Route] Exchanges a username/password pair for a signed session token.
///
/// The response is the matched identity with its password cleared and `token` set.
/// Any mismatch, including an unknown username or an unparseable body, is a bare 401.
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = Identity),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn login(
    State(auth): State<Authenticator>,
    LenientJson(body): LenientJson<LoginRequest>,
) -> Result<Json<Identity>, AuthError> {
    let identity = auth.login(&body.username, &body.password).await?;
    Ok(Json(identity))
}

/// verify_token
///
/// [Public Route] Decodes a token supplied in the body and returns the embedded identity.
/// An empty, tampered or malformed token is answered with 403 and the default (blank)
/// identity as body.
#[utoipa::path(
    post,
    path = "/api/verifyToken",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token valid", body = Identity),
        (status = 403, description = "Token not valid", body = Identity)
    )
)]
pub async fn verify_token(
    State(auth): State<Authenticator>,
    LenientJson(body): LenientJson<VerifyTokenRequest>,
) -> Result<Json<Identity>, (StatusCode, Json<Identity>)> {
    auth.resolve_token(&body.token)
        .map(Json)
        .map_err(|_| (StatusCode::FORBIDDEN, Json(Identity::default())))
}

/// change_password
///
/// [Authenticated Route] Replaces the caller's password after re-checking the old one.
///
/// *Note*: The caller is the `CurrentUser` placed in the request by the role gate, so
/// this handler is only reachable with a valid token.
#[utoipa::path(
    post,
    path = "/api/changePassword",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Old password not valid")
    )
)]
pub async fn change_password(
    CurrentUser(user): CurrentUser,
    State(auth): State<Authenticator>,
    LenientJson(body): LenientJson<ChangePasswordRequest>,
) -> Result<StatusCode, AuthError> {
    auth.change_password(&user, &body.password_old, &body.password_new)
        .await?;
    Ok(StatusCode::OK)
}

/// get_me
///
/// [Authenticated Route] Returns the identity resolved from the caller's token.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current identity", body = Identity),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<Identity> {
    Json(user.without_secret())
}

/// get_user
///
/// [Admin Route] Looks up any identity by id. The stored password is never returned.
#[utoipa::path(
    get,
    path = "/api/user/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = Identity),
        (status = 401, description = "Not an administrator"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_user(
    State(repo): State<CredentialStoreState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Identity>, StatusCode> {
    match repo.find_by_id(id).await {
        Ok(identity) => Ok(Json(identity.without_secret())),
        Err(StoreError::NotFound) => Err(StatusCode::NOT_FOUND),
        Err(StoreError::Backend(e)) => {
            tracing::error!("get_user error: {}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
