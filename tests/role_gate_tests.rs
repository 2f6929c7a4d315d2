use axum::http::{HeaderMap, HeaderValue, header};
use film_manager::{
    auth::{Authenticator, RoleGate, bearer_token},
    error::AuthError,
    models::{Identity, Role},
    repository::InMemoryCredentialStore,
    token::TokenCodec,
};
use std::sync::Arc;

// --- Helper Functions ---

const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

fn authenticator() -> Authenticator {
    Authenticator::new(
        Arc::new(InMemoryCredentialStore::new()),
        TokenCodec::new(TEST_JWT_SECRET),
    )
}

fn gate(roles: &[&str]) -> RoleGate {
    RoleGate::new(authenticator(), roles.iter().map(|r| Role::from(*r)))
}

fn identity_with(roles: &[&str]) -> Identity {
    Identity::new("someone", "pw", roles.iter().copied())
}

fn headers_with(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    headers
}

fn token_for(identity: &Identity) -> String {
    TokenCodec::new(TEST_JWT_SECRET).encode(identity).unwrap()
}

// --- Policy ---

#[test]
fn test_admin_bypasses_any_requirement() {
    let admin = identity_with(&["ADMIN"]);

    assert!(gate(&["EDITOR"]).allows(&admin));
    assert!(gate(&["EDITOR", "VIEWER"]).allows(&admin));
    assert!(gate(&[]).allows(&admin));
}

#[test]
fn test_viewer_rejected_by_editor_gate_but_passes_open_gate() {
    let viewer = identity_with(&["VIEWER"]);

    assert!(!gate(&["EDITOR"]).allows(&viewer));
    assert!(gate(&[]).allows(&viewer));
}

#[test]
fn test_any_intersecting_role_is_enough() {
    let user = identity_with(&["VIEWER", "EDITOR"]);

    assert!(gate(&["EDITOR", "PUBLISHER"]).allows(&user));
}

#[test]
fn test_role_less_identity_only_passes_open_gate() {
    let nobody = identity_with(&[]);

    assert!(gate(&[]).allows(&nobody));
    assert!(!gate(&["VIEWER"]).allows(&nobody));
}

#[test]
fn test_role_labels_are_case_sensitive() {
    let lowercase_admin = identity_with(&["admin"]);

    assert!(!lowercase_admin.is_admin());
    assert!(!gate(&["EDITOR"]).allows(&lowercase_admin));
    assert!(!gate(&["Editor"]).allows(&identity_with(&["EDITOR"])));
}

#[test]
fn test_any_authenticated_gate_has_no_requirement() {
    let gate = RoleGate::any_authenticated(authenticator());

    assert!(gate.required_roles().is_empty());
    assert!(gate.allows(&identity_with(&["VIEWER"])));
}

// --- Header Handling ---

#[test]
fn test_bearer_prefix_is_stripped() {
    assert_eq!(bearer_token("Bearer abc.def.ghi"), "abc.def.ghi");
    assert_eq!(bearer_token("abc.def.ghi"), "abc.def.ghi");
    assert_eq!(bearer_token(""), "");
    // Prefix match is literal.
    assert_eq!(bearer_token("bearer abc"), "bearer abc");
}

#[test]
fn test_authorize_with_bearer_token() {
    let viewer = identity_with(&["VIEWER"]);
    let headers = headers_with(&format!("Bearer {}", token_for(&viewer)));

    let resolved = gate(&["VIEWER"]).authorize(&headers).unwrap();

    assert_eq!(resolved.id, viewer.id);
    assert_eq!(resolved.password, None);
}

#[test]
fn test_authorize_accepts_header_without_prefix() {
    let viewer = identity_with(&["VIEWER"]);
    let headers = headers_with(&token_for(&viewer));

    assert!(gate(&[]).authorize(&headers).is_ok());
}

#[test]
fn test_authorize_rejects_missing_header() {
    assert_eq!(
        gate(&[]).authorize(&HeaderMap::new()),
        Err(AuthError::Unauthorized)
    );
}

#[test]
fn test_authorize_rejects_empty_bearer() {
    assert_eq!(
        gate(&[]).authorize(&headers_with("Bearer ")),
        Err(AuthError::Unauthorized)
    );
}

#[test]
fn test_authorize_rejects_invalid_token() {
    assert_eq!(
        gate(&[]).authorize(&headers_with("Bearer not.a.token")),
        Err(AuthError::Unauthorized)
    );
}

#[test]
fn test_authorize_rejects_role_mismatch() {
    let viewer = identity_with(&["VIEWER"]);
    let headers = headers_with(&format!("Bearer {}", token_for(&viewer)));

    assert_eq!(
        gate(&["EDITOR"]).authorize(&headers),
        Err(AuthError::Unauthorized)
    );
}
