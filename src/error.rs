use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// AuthError
///
/// Every way an authentication or authorization step can fail. All of them are terminal
/// for the current request: nothing is retried and nothing escalates past the handler.
///
/// The rendered HTTP response never carries a body, so callers cannot tell an unknown
/// username apart from a wrong password.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Credential mismatch at login, missing or bad token at a gate, or a role mismatch.
    #[error("unauthorized")]
    Unauthorized,

    /// The caller's current password did not match during a password change.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no token provided")]
    NoToken,

    #[error("token not valid")]
    InvalidToken,

    /// The credential store could not be reached or failed mid-query.
    #[error("credential store failure: {0}")]
    Store(String),

    /// An identity could not be turned into a token.
    #[error("token encoding failure: {0}")]
    Encoding(String),
}

impl AuthError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::Unauthorized | AuthError::NoToken | AuthError::InvalidToken => {
                StatusCode::UNAUTHORIZED
            }
            AuthError::InvalidCredentials => StatusCode::FORBIDDEN,
            AuthError::Store(_) | AuthError::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "authentication layer failure");
        }
        status.into_response()
    }
}

/// StoreError
///
/// Failure modes of a `CredentialStore`. `NotFound` is the only "no match" signal;
/// anything else is a backend fault.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<StoreError> for AuthError {
    /// Maps a store failure on the login path. Callers that need a different
    /// mismatch signal (password change) match on `NotFound` themselves.
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => AuthError::Unauthorized,
            StoreError::Backend(message) => AuthError::Store(message),
        }
    }
}
