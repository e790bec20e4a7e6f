//! Unit tests for user entity

use chrono::Utc;

use crate::domain::entities::user::{AuthProvider, User, UserPublic};

#[test]
fn test_new_user_normalizes_email() {
    let user = User::new("  Ada@Example.COM ", "Ada", "hash".to_string());

    assert_eq!(user.email, "ada@example.com");
    assert_eq!(user.auth_provider, AuthProvider::Password);
    assert_eq!(user.password_hash.as_deref(), Some("hash"));
    assert!(user.last_login_at.is_none());
}

#[test]
fn test_external_user_has_no_password() {
    let user = User::new_external("grace@example.com", "Grace", AuthProvider::Google);

    assert!(user.password_hash.is_none());
    assert_eq!(user.auth_provider, AuthProvider::Google);
}

#[test]
fn test_record_login() {
    let mut user = User::new("a@example.com", "A", "hash".to_string());
    let at = Utc::now();

    user.record_login(at);

    assert_eq!(user.last_login_at, Some(at));
    assert_eq!(user.updated_at, at);
}

#[test]
fn test_public_projection_has_no_hash() {
    let user = User::new("a@example.com", "A", "secret-hash".to_string());
    let public = UserPublic::from(&user);

    let json = serde_json::to_string(&public).unwrap();
    assert!(!json.contains("secret-hash"));
    assert_eq!(public.id, user.id.to_string());
    assert!(json.contains("\"auth_provider\":\"password\""));
}

#[test]
fn test_auth_provider_parsing() {
    assert_eq!("GitHub".parse::<AuthProvider>().unwrap(), AuthProvider::Github);
    assert_eq!("google".parse::<AuthProvider>().unwrap(), AuthProvider::Google);
    assert!("myspace".parse::<AuthProvider>().is_err());
}
