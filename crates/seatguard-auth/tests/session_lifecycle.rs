//! Session ledger, expiry sweeper and audit consistency.

mod common;

use seatguard_auth::AllocationOutcome;
use seatguard_core::types::UserId;
use seatguard_database::SeatStore;
use seatguard_entity::audit::SeatAuditAction;
use seatguard_entity::organization::Organization;
use seatguard_entity::session::{Session, SessionToken};

use common::Fixture;

async fn admit(fx: &Fixture, org: &Organization, user_id: UserId) -> (SessionToken, Session) {
    match fx.engine.allocator.try_allocate(org.id, user_id).await.unwrap() {
        AllocationOutcome::Admitted { token, session } => (token, session),
        other => panic!("expected admission, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sweep_reclaims_45_minute_session_and_keeps_29_minute_one() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let users = fx.users(&org, 2).await;

    let (_, stale) = admit(&fx, &org, users[0].id).await;
    fx.advance_minutes(16);
    let (_, fresh) = admit(&fx, &org, users[1].id).await;
    fx.advance_minutes(29);

    let report = fx.engine.sweeper.sweep_once().await.unwrap();
    assert_eq!(report.sessions_reclaimed, 1);
    assert_eq!(report.organizations_swept, 1);
    assert!(report.is_clean());

    let active = fx.engine.ledger.list_active(org.id).await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, fresh.id);

    let deallocations: Vec<_> = fx
        .engine
        .audit
        .query(org.id, 100)
        .await
        .unwrap()
        .into_iter()
        .filter(|r| r.action == SeatAuditAction::SeatDeallocated)
        .collect();
    assert_eq!(deallocations.len(), 1);
    assert_eq!(deallocations[0].session_id, Some(stale.id));
    assert_eq!(deallocations[0].details["reason"], "expired");
}

#[tokio::test]
async fn test_sweep_is_idempotent() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let user = fx.users(&org, 1).await.remove(0);

    admit(&fx, &org, user.id).await;
    fx.advance_minutes(31);

    assert_eq!(fx.engine.sweeper.sweep_once().await.unwrap().sessions_reclaimed, 1);
    let again = fx.engine.sweeper.sweep_once().await.unwrap();
    assert_eq!(again.sessions_reclaimed, 0);
    assert_eq!(again.organizations_swept, 0);

    let summary = fx.engine.audit.summarize(org.id).await.unwrap();
    assert_eq!(summary.deallocated, 1);
}

#[tokio::test]
async fn test_session_at_exact_timeout_is_expired() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let user = fx.users(&org, 1).await.remove(0);

    let (token, _) = admit(&fx, &org, user.id).await;
    fx.advance_minutes(30);

    assert_eq!(fx.engine.ledger.count_active(org.id).await.unwrap(), 0);
    assert!(!fx.engine.ledger.touch(&token).await.unwrap());
    assert_eq!(fx.engine.sweeper.sweep_once().await.unwrap().sessions_reclaimed, 1);
}

#[tokio::test]
async fn test_expired_seat_is_reusable_before_sweep() {
    let fx = Fixture::new();
    let org = fx.organization("Tiny Co", 1).await;
    let users = fx.users(&org, 2).await;

    admit(&fx, &org, users[0].id).await;
    fx.advance_minutes(45);

    // The idle session no longer counts, so the seat is free immediately.
    admit(&fx, &org, users[1].id).await;
    assert_eq!(fx.engine.ledger.count_active(org.id).await.unwrap(), 1);
    assert_eq!(fx.store.count_stored_sessions(org.id).await.unwrap(), 2);

    fx.engine.sweeper.sweep_once().await.unwrap();
    assert_eq!(fx.store.count_stored_sessions(org.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_double_destroy() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let user = fx.users(&org, 1).await.remove(0);

    let (token, _) = admit(&fx, &org, user.id).await;
    assert!(fx.engine.ledger.destroy(&token).await.unwrap());
    assert!(!fx.engine.ledger.destroy(&token).await.unwrap());

    let summary = fx.engine.audit.summarize(org.id).await.unwrap();
    assert_eq!(summary.allocated, 1);
    assert_eq!(summary.deallocated, 1);

    let trail = fx.engine.audit.query(org.id, 1).await.unwrap();
    assert_eq!(trail[0].details["reason"], "logout");
}

#[tokio::test]
async fn test_destroy_unknown_token_writes_nothing() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;

    let stranger = SessionToken::generate();
    assert!(!fx.engine.ledger.destroy(&stranger).await.unwrap());
    assert!(fx.engine.audit.query(org.id, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_touch_updates_only_last_activity() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let user = fx.users(&org, 1).await.remove(0);

    let (token, created) = admit(&fx, &org, user.id).await;
    let before = fx.engine.ledger.count_active(org.id).await.unwrap();

    fx.advance_minutes(10);
    assert!(fx.engine.ledger.touch(&token).await.unwrap());

    assert_eq!(fx.engine.ledger.count_active(org.id).await.unwrap(), before);
    let touched = fx.engine.ledger.resolve(&token).await.unwrap().unwrap();
    assert_eq!(touched.id, created.id);
    assert_eq!(touched.created_at, created.created_at);
    assert_eq!(touched.user_id, created.user_id);
    assert_eq!(touched.token_hash, created.token_hash);
    assert!(touched.last_activity > created.last_activity);

    // Heartbeats keep a session alive past the original window.
    fx.advance_minutes(25);
    assert_eq!(fx.engine.ledger.count_active(org.id).await.unwrap(), 1);
    assert_eq!(fx.engine.sweeper.sweep_once().await.unwrap().sessions_reclaimed, 0);
}

#[tokio::test]
async fn test_resolve_hides_expired_sessions() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let user = fx.users(&org, 1).await.remove(0);

    let (token, _) = admit(&fx, &org, user.id).await;
    assert!(fx.engine.ledger.resolve(&token).await.unwrap().is_some());

    fx.advance_minutes(31);
    assert!(fx.engine.ledger.resolve(&token).await.unwrap().is_none());
}

#[tokio::test]
async fn test_failed_sweep_batch_rolls_back_and_retries() {
    let fx = Fixture::new();
    let acme = fx.organization("Acme Corp", 10).await;
    let techstart = fx.organization("TechStart Inc", 10).await;
    let acme_user = fx.users(&acme, 1).await.remove(0);
    let tech_user = fx.users(&techstart, 1).await.remove(0);

    admit(&fx, &acme, acme_user.id).await;
    admit(&fx, &techstart, tech_user.id).await;
    fx.advance_minutes(40);

    fx.store.fail_audit_action(Some(SeatAuditAction::SeatDeallocated));
    let report = fx.engine.sweeper.sweep_once().await.unwrap();
    assert_eq!(report.failed_batches.len(), 2);
    assert_eq!(report.sessions_reclaimed, 0);
    // Nothing deleted without its audit record.
    assert_eq!(fx.store.count_stored_sessions(acme.id).await.unwrap(), 1);
    assert_eq!(fx.engine.audit.summarize(acme.id).await.unwrap().deallocated, 0);

    fx.store.fail_audit_action(None);
    let retry = fx.engine.sweeper.sweep_once().await.unwrap();
    assert!(retry.is_clean());
    assert_eq!(retry.sessions_reclaimed, 2);
    assert_eq!(fx.store.count_stored_sessions(acme.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_audit_trail_is_newest_first() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 10).await;
    let user = fx.users(&org, 1).await.remove(0);

    let (token, _) = admit(&fx, &org, user.id).await;
    fx.advance_minutes(1);
    fx.engine.ledger.destroy(&token).await.unwrap();

    let trail = fx.engine.audit.query(org.id, 100).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert_eq!(trail[0].action, SeatAuditAction::SeatDeallocated);
    assert_eq!(trail[1].action, SeatAuditAction::SeatAllocated);
    assert!(trail[0].created_at > trail[1].created_at);

    assert_eq!(fx.engine.audit.query(org.id, 0).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sweep_queued_behind_allocation_is_stamped_after_it() {
    let fx = Fixture::new();
    let org = fx.organization("Acme Corp", 5).await;
    let users = fx.users(&org, 2).await;

    admit(&fx, &org, users[0].id).await;
    fx.advance_minutes(45);

    let held = fx.store.begin(org.id).await.unwrap();

    let allocator = fx.engine.allocator.clone();
    let (org_id, user_id) = (org.id, users[1].id);
    let allocation = tokio::spawn(async move { allocator.try_allocate(org_id, user_id).await });
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    let sweeper = fx.engine.sweeper.clone();
    let sweep = tokio::spawn(async move { sweeper.sweep_once().await });
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }

    fx.advance_minutes(2);
    drop(held);

    assert!(allocation.await.unwrap().unwrap().is_admitted());
    assert_eq!(sweep.await.unwrap().unwrap().sessions_reclaimed, 1);

    let trail = fx.engine.audit.query(org.id, 10).await.unwrap();
    assert_eq!(trail.len(), 3);
    assert_eq!(trail[0].action, SeatAuditAction::SeatDeallocated);
    assert_eq!(trail[1].action, SeatAuditAction::SeatAllocated);
    assert_eq!(trail[1].user_id, Some(users[1].id));
    assert!(trail[0].created_at >= trail[1].created_at);
    assert!(trail[0].sequence > trail[1].sequence);
}
