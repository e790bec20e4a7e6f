//! Tests for bcrypt password helpers

use crate::services::auth::{hash_password, verify_password};

#[tokio::test]
async fn test_hash_and_verify() {
    let hash = hash_password("correct horse", 4).await.unwrap();

    assert_ne!(hash, "correct horse");
    assert!(verify_password("correct horse", &hash).await.unwrap());
    assert!(!verify_password("battery staple", &hash).await.unwrap());
}

#[tokio::test]
async fn test_malformed_hash_is_mismatch() {
    assert!(!verify_password("anything", "not-a-bcrypt-hash").await.unwrap());
}
