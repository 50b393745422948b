//! Allocation races against a real PostgreSQL.
//!
//! Runs only when `SEATGUARD_TEST_DATABASE_URL` is set.

use std::sync::Arc;

use chrono::{Duration, Utc};
use futures::future::join_all;

use seatguard_auth::SeatEngine;
use seatguard_core::config::DatabaseConfig;
use seatguard_core::types::{ActivityWindow, ManualClock, SystemClock};
use seatguard_database::migration::run_migrations;
use seatguard_database::{DatabasePool, PgSeatStore, SeatStore};
use seatguard_entity::organization::{NewOrganization, Organization};
use seatguard_entity::user::{NewUser, User};

async fn connect() -> Option<PgSeatStore> {
    connect_pool().await.map(PgSeatStore::new)
}

async fn connect_pool() -> Option<DatabasePool> {
    let url = std::env::var("SEATGUARD_TEST_DATABASE_URL").ok()?;
    let config = DatabaseConfig {
        url,
        max_connections: 16,
        ..DatabaseConfig::default()
    };
    let db = DatabasePool::connect(&config).await.expect("connect");
    run_migrations(db.pool()).await.expect("migrate");
    Some(db)
}

async fn provision(store: &PgSeatStore, seat_limit: i32, users: usize) -> (Organization, Vec<User>) {
    let tag = seatguard_core::types::OrganizationId::new();
    let org = store
        .insert_organization(NewOrganization {
            name: format!("pg-test-{tag}"),
            seat_limit,
        })
        .await
        .unwrap();
    let mut created = Vec::new();
    for i in 0..users {
        created.push(
            store
                .insert_user(NewUser {
                    username: format!("pg-user-{tag}-{i}"),
                    email: None,
                    password_hash: "unused".into(),
                    organization_id: org.id,
                })
                .await
                .unwrap(),
        );
    }
    (org, created)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_pg_eight_concurrent_logins_against_five_seats() {
    let Some(store) = connect().await else {
        eprintln!("SEATGUARD_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let (org, users) = provision(&store, 5, 8).await;
    let engine = SeatEngine::with_window(
        Arc::new(store),
        Arc::new(SystemClock),
        ActivityWindow::from_minutes(30),
        0,
    );

    let attempts = users.iter().map(|user| {
        let allocator = Arc::clone(&engine.allocator);
        let (org_id, user_id) = (org.id, user.id);
        tokio::spawn(async move { allocator.try_allocate(org_id, user_id).await })
    });
    let admitted = join_all(attempts)
        .await
        .into_iter()
        .filter(|joined| joined.as_ref().unwrap().as_ref().unwrap().is_admitted())
        .count();

    assert_eq!(admitted, 5);
    assert_eq!(engine.ledger.count_active(org.id).await.unwrap(), 5);
    let summary = engine.audit.summarize(org.id).await.unwrap();
    assert_eq!(summary.allocated, 5);
    assert_eq!(summary.limit_exceeded, 3);
}

#[tokio::test]
async fn test_pg_sweep_and_logout_audit() {
    let Some(store) = connect().await else {
        eprintln!("SEATGUARD_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let (org, users) = provision(&store, 10, 2).await;
    // Sessions are created 45 minutes in the past so the sweep below only
    // reaches them, not rows of tests running concurrently on the same database.
    let clock = Arc::new(ManualClock::new(Utc::now() - Duration::minutes(45)));
    let engine = SeatEngine::with_window(
        Arc::new(store),
        clock.clone(),
        ActivityWindow::from_minutes(30),
        0,
    );

    let first = engine.allocator.try_allocate(org.id, users[0].id).await.unwrap();
    let second = engine.allocator.try_allocate(org.id, users[1].id).await.unwrap();
    let seatguard_auth::AllocationOutcome::Admitted { token, .. } = second else {
        panic!("expected admission");
    };
    assert!(first.is_admitted());

    assert!(engine.ledger.destroy(&token).await.unwrap());
    assert!(!engine.ledger.destroy(&token).await.unwrap());

    clock.set(Utc::now());
    let report = engine.sweeper.sweep_once().await.unwrap();
    assert!(report.sessions_reclaimed >= 1);

    let reconciliation = engine.reconciler.reconcile(org.id).await.unwrap();
    assert!(reconciliation.is_consistent());
    assert_eq!(reconciliation.stored_sessions, 0);
    assert_eq!(reconciliation.audit.deallocated, 2);
}

#[tokio::test]
async fn test_pg_audited_organization_and_user_cannot_be_deleted() {
    let Some(db) = connect_pool().await else {
        eprintln!("SEATGUARD_TEST_DATABASE_URL not set, skipping");
        return;
    };
    let store = PgSeatStore::new(db.clone());
    let (org, users) = provision(&store, 5, 1).await;
    let engine = SeatEngine::with_window(
        Arc::new(store),
        Arc::new(SystemClock),
        ActivityWindow::from_minutes(30),
        0,
    );
    let seatguard_auth::AllocationOutcome::Admitted { token, .. } =
        engine.allocator.try_allocate(org.id, users[0].id).await.unwrap()
    else {
        panic!("expected admission");
    };
    assert!(engine.ledger.destroy(&token).await.unwrap());

    let org_delete = sqlx::query("DELETE FROM organizations WHERE id = $1")
        .bind(org.id)
        .execute(db.pool())
        .await;
    assert!(org_delete.is_err());

    let user_delete = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(users[0].id)
        .execute(db.pool())
        .await;
    assert!(user_delete.is_err());

    let trail = engine.audit.query(org.id, 10).await.unwrap();
    assert_eq!(trail.len(), 2);
    assert!(trail.iter().all(|r| r.user_id == Some(users[0].id)));
}
