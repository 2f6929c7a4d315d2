use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use std::{collections::BTreeSet, sync::Arc};

use crate::{
    error::{AuthError, StoreError},
    models::{Identity, Role},
    repository::CredentialStoreState,
    token::TokenCodec,
};

/// Authenticator
///
/// Checks submitted credentials against the credential store, issues tokens for
/// successful logins and resolves presented tokens back into identities.
/// Holds no per-request state; cloning it is cheap (the store is behind an `Arc`).
#[derive(Clone)]
pub struct Authenticator {
    store: CredentialStoreState,
    codec: TokenCodec,
}

impl Authenticator {
    pub fn new(store: CredentialStoreState, codec: TokenCodec) -> Self {
        Self { store, codec }
    }

    /// login
    ///
    /// Exact match on `(username, password)`. Unknown user and wrong password both fail
    /// with `Unauthorized`. On success the password is cleared and `token` is populated.
    pub async fn login(&self, username: &str, password: &str) -> Result<Identity, AuthError> {
        let mut identity = self
            .store
            .find_by_credentials(username, password)
            .await
            .map_err(|e| {
                if e == StoreError::NotFound {
                    tracing::info!("login rejected");
                }
                AuthError::from(e)
            })?;

        identity.clear_secret();
        identity.token = Some(self.codec.encode(&identity)?);

        tracing::info!(user_id = %identity.id, "login succeeded");
        Ok(identity)
    }

    /// resolve_token
    ///
    /// `NoToken` for an empty string, otherwise whatever `TokenCodec::decode` yields.
    pub fn resolve_token(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::NoToken);
        }
        self.codec.decode(token)
    }

    /// change_password
    ///
    /// Re-verifies `old_password` against the stored username of `current`, then updates
    /// the password of the matched record. A mismatch is `InvalidCredentials` and leaves
    /// the store untouched.
    pub async fn change_password(
        &self,
        current: &Identity,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let stored = match self
            .store
            .find_by_credentials(&current.username, old_password)
            .await
        {
            Ok(identity) => identity,
            Err(StoreError::NotFound) => {
                tracing::warn!(user_id = %current.id, "password change rejected: old password not valid");
                return Err(AuthError::InvalidCredentials);
            }
            Err(StoreError::Backend(message)) => return Err(AuthError::Store(message)),
        };

        match self.store.update_password(stored.id, new_password).await {
            Ok(()) => {
                tracing::info!(user_id = %stored.id, "password changed");
                Ok(())
            }
            // Record vanished between the check and the update.
            Err(StoreError::NotFound) => Err(AuthError::InvalidCredentials),
            Err(StoreError::Backend(message)) => Err(AuthError::Store(message)),
        }
    }
}

/// bearer_token
///
/// Strips the literal, case-sensitive `"Bearer "` prefix. A header without the prefix is
/// taken whole as the token.
pub fn bearer_token(header_value: &str) -> &str {
    header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value)
}

/// RoleGate
///
/// Authorization policy for one group of routes, fixed at router construction.
/// An empty requirement admits any authenticated identity; holders of `ADMIN` pass
/// every gate.
#[derive(Clone)]
pub struct RoleGate {
    auth: Authenticator,
    required: Arc<BTreeSet<Role>>,
}

impl RoleGate {
    pub fn new(auth: Authenticator, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            auth,
            required: Arc::new(roles.into_iter().collect()),
        }
    }

    /// A gate with no role requirement beyond a valid token.
    pub fn any_authenticated(auth: Authenticator) -> Self {
        Self::new(auth, Vec::<Role>::new())
    }

    pub fn required_roles(&self) -> &BTreeSet<Role> {
        &self.required
    }

    /// allows
    ///
    /// Admin bypass first, then the empty requirement, then set intersection.
    pub fn allows(&self, identity: &Identity) -> bool {
        if identity.is_admin() {
            return true;
        }
        if self.required.is_empty() {
            return true;
        }
        !identity.roles.is_disjoint(&self.required)
    }

    /// authorize
    ///
    /// Resolves the `Authorization` header and applies `allows`. Every failure collapses
    /// to `Unauthorized`.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let header_value = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        let identity = self
            .auth
            .resolve_token(bearer_token(header_value))
            .map_err(|e| {
                tracing::debug!(reason = %e, "request rejected at role gate");
                AuthError::Unauthorized
            })?;

        if !self.allows(&identity) {
            tracing::warn!(
                user_id = %identity.id,
                required = ?self.required,
                "request rejected: role requirement not met"
            );
            return Err(AuthError::Unauthorized);
        }

        tracing::debug!(user_id = %identity.id, "request authorized");
        Ok(identity)
    }
}

/// require_roles
///
/// Middleware running a `RoleGate` in front of a route group. On success the resolved
/// identity is stored in request extensions as `CurrentUser`; on rejection the inner
/// handler never runs.
pub async fn require_roles(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let identity = gate.authorize(request.headers())?;
    request.extensions_mut().insert(CurrentUser(identity));
    Ok(next.run(request).await)
}

/// CurrentUser
///
/// The identity resolved by a `RoleGate` for this request. Extracting it on a route
/// that is not behind a gate rejects with 401.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AuthError::Unauthorized)
    }
}
