use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{error::AuthError, models::Identity};

/// Claims
///
/// Payload carried inside every session token. The identity is serialized to a JSON
/// string and stored under the single `user` claim. No `exp`/`iat` claims are issued,
/// so tokens stay valid for as long as the signing secret does.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: String,
}

/// TokenCodec
///
/// Signs identities into HS256 tokens and validates them back. The secret is supplied
/// once at construction from `AppConfig::jwt_secret`; any instance built from the same
/// secret accepts tokens issued by any other.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens carry no registered claims at all.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// encode
    ///
    /// Serializes the identity with its password and token cleared and signs it.
    /// Failure here means the identity itself could not be serialized, which well-formed
    /// input never triggers; it surfaces as `AuthError::Encoding` (HTTP 500).
    pub fn encode(&self, identity: &Identity) -> Result<String, AuthError> {
        let user = serde_json::to_string(&identity.without_secret())
            .map_err(|e| AuthError::Encoding(e.to_string()))?;

        encode(&Header::new(Algorithm::HS256), &Claims { user }, &self.encoding_key)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// decode
    ///
    /// Verifies structure and signature, then parses the embedded identity.
    /// Every failure, including an inner payload that is not an identity, is `InvalidToken`.
    pub fn decode(&self, token: &str) -> Result<Identity, AuthError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(reason = ?e.kind(), "token rejected");
            AuthError::InvalidToken
        })?;

        let mut identity: Identity = serde_json::from_str(&data.claims.user).map_err(|e| {
            tracing::debug!(error = %e, "token payload is not an identity");
            AuthError::InvalidToken
        })?;

        identity.clear_secret();
        identity.token = None;
        Ok(identity)
    }
}
