//! Unit tests for refresh token records and the session collection

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::session::{RefreshTokenRecord, RotationOutcome, UserSession};

fn record(jti: &str, ttl: Duration) -> RefreshTokenRecord {
    let now = Utc::now();
    RefreshTokenRecord::new(jti, now, now + ttl)
}

#[test]
fn test_new_record_is_active() {
    let record = record("a", Duration::days(7));
    assert!(!record.is_invalidated());
    assert!(record.is_active(Utc::now()));
}

#[test]
fn test_invalidate_is_one_way() {
    let mut record = record("a", Duration::days(7));

    assert!(record.invalidate());
    assert!(record.is_invalidated());

    // A second invalidation reports no change and the flag stays set
    assert!(!record.invalidate());
    assert!(record.is_invalidated());
    assert!(!record.is_active(Utc::now()));
}

#[test]
fn test_expired_record_is_not_active() {
    let record = record("a", Duration::seconds(-1));
    assert!(record.is_expired(Utc::now()));
    assert!(!record.is_active(Utc::now()));
}

#[test]
fn test_rotate_consumes_and_appends() {
    let now = Utc::now();
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("r1", Duration::days(7)));

    let outcome = session.rotate("r1", record("r2", Duration::days(7)), now);

    assert_eq!(outcome, RotationOutcome::Rotated);
    // r1 was consumed and pruned, r2 is the only active record
    assert!(session.find_active("r1", now).is_none());
    assert!(session.find_active("r2", now).is_some());
    assert_eq!(session.records().len(), 1);
}

#[test]
fn test_rotate_unknown_jti_leaves_session_untouched() {
    let now = Utc::now();
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("r1", Duration::days(7)));
    let before = session.clone();

    let outcome = session.rotate("forged", record("r2", Duration::days(7)), now);

    assert_eq!(outcome, RotationOutcome::NoActiveRecord);
    assert_eq!(session, before);
}

#[test]
fn test_rotate_consumed_jti_is_rejected() {
    let now = Utc::now();
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("r1", Duration::days(7)));

    assert_eq!(
        session.rotate("r1", record("r2", Duration::days(7)), now),
        RotationOutcome::Rotated
    );
    assert_eq!(
        session.rotate("r1", record("r3", Duration::days(7)), now),
        RotationOutcome::NoActiveRecord
    );
}

#[test]
fn test_rotate_record_expired_before_token_is_rejected() {
    let now = Utc::now();
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("r1", Duration::seconds(-5)));

    let outcome = session.rotate("r1", record("r2", Duration::days(7)), now);
    assert_eq!(outcome, RotationOutcome::NoActiveRecord);
}

#[test]
fn test_rotate_prunes_dead_records() {
    let now = Utc::now();
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("expired", Duration::seconds(-60)));
    let mut revoked = record("revoked", Duration::days(7));
    revoked.invalidate();
    session.push(revoked);
    session.push(record("other-device", Duration::days(7)));
    session.push(record("r1", Duration::days(7)));

    session.rotate("r1", record("r2", Duration::days(7)), now);

    let jtis: Vec<&str> = session.records().iter().map(|r| r.jti.as_str()).collect();
    assert_eq!(jtis, vec!["other-device", "r2"]);
}

#[test]
fn test_invalidate_all_counts_changes() {
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("a", Duration::days(7)));
    session.push(record("b", Duration::days(7)));
    let mut c = record("c", Duration::days(7));
    c.invalidate();
    session.push(c);

    assert_eq!(session.invalidate_all(), 2);
    assert!(session.records().iter().all(|r| r.is_invalidated()));
    assert_eq!(session.active_count(Utc::now()), 0);
    // Mass revocation keeps the records
    assert_eq!(session.records().len(), 3);
}

#[test]
fn test_invalidate_single_record() {
    let now = Utc::now();
    let mut session = UserSession::new(Uuid::new_v4());
    session.push(record("a", Duration::days(7)));
    session.push(record("b", Duration::days(7)));

    assert!(session.invalidate("a"));
    assert!(!session.invalidate("a"));
    assert!(!session.invalidate("missing"));
    assert_eq!(session.active_count(now), 1);
    assert!(session.find_active("b", now).is_some());
}

#[test]
fn test_records_keep_issuance_order() {
    let mut session = UserSession::new(Uuid::new_v4());
    for jti in ["first", "second", "third"] {
        session.push(record(jti, Duration::days(7)));
    }

    let jtis: Vec<&str> = session.records().iter().map(|r| r.jti.as_str()).collect();
    assert_eq!(jtis, vec!["first", "second", "third"]);
}
