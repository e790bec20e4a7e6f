//! Tests for the in-memory user repository

use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RefreshTokenRecord, RotationOutcome};
use crate::domain::entities::user::User;
use crate::errors::{AuthError, DomainError};
use crate::repositories::{InMemoryUserRepository, UserRepository};

fn record(jti: &str) -> RefreshTokenRecord {
    let now = Utc::now();
    RefreshTokenRecord::new(jti, now, now + Duration::days(7))
}

async fn seeded() -> (InMemoryUserRepository, User) {
    let repo = InMemoryUserRepository::new();
    let user = repo
        .create(User::new("ada@example.com", "Ada", "hash".to_string()))
        .await
        .unwrap();
    (repo, user)
}

#[tokio::test]
async fn test_create_and_find() {
    let (repo, user) = seeded().await;

    let by_id = repo.find_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(by_id, user);

    let by_email = repo.find_by_email(" ADA@example.com ").await.unwrap().unwrap();
    assert_eq!(by_email.id, user.id);

    let session = repo.find_session(user.id).await.unwrap().unwrap();
    assert!(session.records().is_empty());
}

#[tokio::test]
async fn test_duplicate_email_rejected() {
    let (repo, _) = seeded().await;

    let result = repo
        .create(User::new("ada@example.com", "Other Ada", "hash".to_string()))
        .await;

    assert!(matches!(
        result,
        Err(DomainError::Auth(AuthError::UserAlreadyExists))
    ));
    assert_eq!(repo.len().await, 1);
}

#[tokio::test]
async fn test_update_unknown_user() {
    let repo = InMemoryUserRepository::new();
    let result = repo
        .update(User::new("ghost@example.com", "Ghost", "hash".to_string()))
        .await;

    assert!(matches!(result, Err(DomainError::Auth(AuthError::UserNotFound))));
}

#[tokio::test]
async fn test_append_to_unknown_user() {
    let repo = InMemoryUserRepository::new();
    let stored = repo
        .append_refresh_token(Uuid::new_v4(), record("a"), Utc::now())
        .await
        .unwrap();
    assert!(!stored);
}

#[tokio::test]
async fn test_rotate_outcomes() {
    let (repo, user) = seeded().await;
    let now = Utc::now();
    repo.append_refresh_token(user.id, record("r1"), now).await.unwrap();

    assert_eq!(
        repo.rotate_refresh_token(user.id, "r1", record("r2"), now).await.unwrap(),
        RotationOutcome::Rotated
    );
    assert_eq!(
        repo.rotate_refresh_token(user.id, "r1", record("r3"), now).await.unwrap(),
        RotationOutcome::NoActiveRecord
    );
    assert_eq!(
        repo.rotate_refresh_token(Uuid::new_v4(), "r2", record("r4"), now)
            .await
            .unwrap(),
        RotationOutcome::UserNotFound
    );
    assert_eq!(repo.count_active_sessions(user.id, now).await.unwrap(), 1);
}

#[tokio::test]
async fn test_concurrent_rotation_has_single_winner() {
    let (repo, user) = seeded().await;
    let repo = Arc::new(repo);
    let now = Utc::now();
    repo.append_refresh_token(user.id, record("shared"), now).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let repo = repo.clone();
        let user_id = user.id;
        handles.push(tokio::spawn(async move {
            repo.rotate_refresh_token(user_id, "shared", record(&format!("next-{}", i)), now)
                .await
                .unwrap()
        }));
    }

    let mut rotated = 0;
    for handle in handles {
        if handle.await.unwrap() == RotationOutcome::Rotated {
            rotated += 1;
        }
    }

    assert_eq!(rotated, 1);
    assert_eq!(repo.count_active_sessions(user.id, now).await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalidate_operations() {
    let (repo, user) = seeded().await;
    let now = Utc::now();
    for jti in ["a", "b", "c"] {
        repo.append_refresh_token(user.id, record(jti), now).await.unwrap();
    }

    assert!(repo.invalidate_refresh_token(user.id, "a").await.unwrap());
    assert!(!repo.invalidate_refresh_token(user.id, "a").await.unwrap());
    assert_eq!(repo.invalidate_all_refresh_tokens(user.id).await.unwrap(), 2);
    assert_eq!(repo.count_active_sessions(user.id, now).await.unwrap(), 0);
    assert_eq!(
        repo.invalidate_all_refresh_tokens(Uuid::new_v4()).await.unwrap(),
        0
    );
}
