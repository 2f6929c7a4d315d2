use film_manager::models::{
    ChangePasswordRequest, Identity, LoginRequest, Role, VerifyTokenRequest,
};
use serde_json::json;
use std::collections::BTreeSet;

#[test]
fn test_admin_label_maps_to_admin_variant() {
    assert_eq!(Role::from("ADMIN"), Role::Admin);
    assert_eq!(Role::from("EDITOR"), Role::Named("EDITOR".to_string()));
    assert_eq!(Role::from("admin"), Role::Named("admin".to_string()));
    assert!(Role::Admin.is_admin());
    assert_eq!(Role::Admin.to_string(), "ADMIN");
}

#[test]
fn test_roles_serialize_as_bare_labels() {
    let identity = Identity::new("alice", "p1", ["VIEWER", "ADMIN"]);

    let value = serde_json::to_value(identity.without_secret()).unwrap();

    // Set semantics: sorted, Admin first by variant order.
    assert_eq!(value["roles"], json!(["ADMIN", "VIEWER"]));
}

#[test]
fn test_duplicate_roles_collapse() {
    let identity: Identity = serde_json::from_value(json!({
        "id": "00000000-0000-0000-0000-000000000001",
        "username": "alice",
        "roles": ["EDITOR", "EDITOR", "ADMIN"]
    }))
    .unwrap();

    assert_eq!(
        identity.roles,
        BTreeSet::from([Role::Admin, Role::from("EDITOR")])
    );
}

#[test]
fn test_cleared_identity_omits_password_and_token() {
    let mut identity = Identity::new("alice", "p1", ["ADMIN"]);
    identity.token = Some("t".to_string());

    let json_output = serde_json::to_string(&identity.without_secret()).unwrap();

    assert!(!json_output.contains("password"));
    assert!(!json_output.contains("token"));
}

#[test]
fn test_clear_secret_keeps_token() {
    let mut identity = Identity::new("alice", "p1", ["ADMIN"]);
    identity.token = Some("t".to_string());

    identity.clear_secret();

    let value = serde_json::to_value(&identity).unwrap();
    assert!(value.get("password").is_none());
    assert_eq!(value["token"], "t");
}

#[test]
fn test_identity_requires_id_and_username() {
    assert!(serde_json::from_value::<Identity>(json!({ "username": "alice" })).is_err());
    assert!(
        serde_json::from_value::<Identity>(json!({
            "id": "00000000-0000-0000-0000-000000000001"
        }))
        .is_err()
    );
}

#[test]
fn test_change_password_request_uses_camel_case() {
    let body: ChangePasswordRequest =
        serde_json::from_value(json!({ "passwordOld": "p1", "passwordNew": "p2" })).unwrap();

    assert_eq!(body.password_old, "p1");
    assert_eq!(body.password_new, "p2");
}

#[test]
fn test_payloads_default_missing_fields() {
    let login: LoginRequest = serde_json::from_value(json!({ "username": "alice" })).unwrap();
    let verify: VerifyTokenRequest = serde_json::from_value(json!({})).unwrap();

    assert_eq!(login.username, "alice");
    assert_eq!(login.password, "");
    assert_eq!(verify.token, "");
}
