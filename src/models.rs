use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Roles ---

/// Role
///
/// A role label attached to an identity. `ADMIN` is the only label with built-in meaning
/// (it passes every role gate); every other label is carried verbatim.
///
/// Labels are case-sensitive. Build roles through `Role::from` so that the literal
/// `"ADMIN"` always maps onto `Role::Admin`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    Named(String),
}

impl Role {
    pub const ADMIN_LABEL: &'static str = "ADMIN";

    pub fn as_str(&self) -> &str {
        match self {
            Role::Admin => Self::ADMIN_LABEL,
            Role::Named(label) => label,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl From<String> for Role {
    fn from(label: String) -> Self {
        if label == Self::ADMIN_LABEL {
            Role::Admin
        } else {
            Role::Named(label)
        }
    }
}

impl From<&str> for Role {
    fn from(label: &str) -> Self {
        Role::from(label.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Admin => Role::ADMIN_LABEL.to_string(),
            Role::Named(label) => label,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- Identity ---

/// Identity
///
/// The authenticated principal as stored in the `users` table.
///
/// `password` is only populated on records coming straight out of the credential store.
/// Every value handed back to a caller goes through `without_secret()` first, and the
/// field is skipped during serialization once cleared. `token` is only set on the
/// login response and is never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub password: Option<String>,

    // Unordered; serialized as a sorted array of labels.
    #[serde(default)]
    #[ts(type = "Array<string>")]
    #[schema(value_type = Vec<String>)]
    pub roles: BTreeSet<Role>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub token: Option<String>,
}

impl Identity {
    pub fn new<I, R>(username: impl Into<String>, password: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Role>,
    {
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            password: Some(password.into()),
            roles: roles.into_iter().map(Into::into).collect(),
            token: None,
        }
    }

    /// Drops the stored password in place.
    pub fn clear_secret(&mut self) {
        self.password = None;
    }

    /// Returns a copy safe to hand outward: no password, no token.
    pub fn without_secret(&self) -> Self {
        Self {
            password: None,
            token: None,
            ..self.clone()
        }
    }

    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(Role::is_admin)
    }
}

// --- Request Payloads ---
// All payloads default every field: a malformed body decodes as the empty payload.

/// LoginRequest
///
/// Body of `POST /api/login`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// VerifyTokenRequest
///
/// Body of `POST /api/verifyToken`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default)]
#[ts(export)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// ChangePasswordRequest
///
/// Body of `POST /api/changePassword`. Field names are camelCase on the wire
/// (`passwordOld`, `passwordNew`). No complexity policy is applied to either value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(default, rename_all = "camelCase")]
#[ts(export)]
pub struct ChangePasswordRequest {
    pub password_old: String,
    pub password_new: String,
}
