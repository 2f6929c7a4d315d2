use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

/// LenientJson
///
/// JSON body extractor that never rejects. A missing, unreadable or malformed body
/// yields `T::default()`, so an empty login attempt is simply a credential mismatch
/// rather than a 4xx from the framework.
#[derive(Debug, Clone, Default)]
pub struct LenientJson<T>(pub T);

impl<S, T> FromRequest<S> for LenientJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = match Bytes::from_request(req, state).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(error = %e, "request body unreadable, using empty payload");
                return Ok(Self(T::default()));
            }
        };

        let payload = serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "request body malformed, using empty payload");
            T::default()
        });

        Ok(Self(payload))
    }
}
