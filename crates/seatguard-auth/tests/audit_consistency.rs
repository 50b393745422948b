//! The audit trail always agrees with the stored sessions once work settles.

mod common;

use std::sync::Arc;

use futures::future::join_all;

use seatguard_auth::AllocationOutcome;
use seatguard_entity::session::SessionToken;

use common::Fixture;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_mixed_interleaving_stays_consistent() {
    let fx = Fixture::new();
    let org = fx.organization("TechStart Inc", 6).await;
    let users = fx.users(&org, 12).await;

    let mut held: Vec<SessionToken> = Vec::new();
    for round in 0..5 {
        let attempts = users.iter().map(|user| {
            let allocator = Arc::clone(&fx.engine.allocator);
            let (org_id, user_id) = (org.id, user.id);
            tokio::spawn(async move { allocator.try_allocate(org_id, user_id).await })
        });
        let released = held.len().min(3);
        let logouts = held.drain(..released).map(|token| {
            let ledger = Arc::clone(&fx.engine.ledger);
            tokio::spawn(async move { ledger.destroy(&token).await })
        });
        let sweeper = Arc::clone(&fx.engine.sweeper);
        let sweep = tokio::spawn(async move { sweeper.sweep_once().await });

        let (allocations, releases, swept) =
            futures::join!(join_all(attempts), join_all(logouts), sweep);
        swept.unwrap().unwrap();
        for release in releases {
            release.unwrap().unwrap();
        }
        for outcome in allocations {
            if let AllocationOutcome::Admitted { token, .. } = outcome.unwrap().unwrap() {
                held.push(token);
            }
        }

        assert!(fx.engine.ledger.count_active(org.id).await.unwrap() <= 6);
        if round % 2 == 1 {
            fx.advance_minutes(31);
        }

        let report = fx.engine.reconciler.reconcile(org.id).await.unwrap();
        assert!(
            report.is_consistent(),
            "round {round}: audit net {} vs stored {}",
            report.net_allocated,
            report.stored_sessions
        );
    }

    // After a final sweep the trail also matches the active window exactly.
    fx.engine.sweeper.sweep_once().await.unwrap();
    let report = fx.engine.reconciler.reconcile(org.id).await.unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.awaiting_sweep, 0);
    assert_eq!(
        report.net_allocated,
        i64::from(fx.engine.ledger.count_active(org.id).await.unwrap())
    );
}

#[tokio::test]
async fn test_reconcile_unknown_organization_is_not_found() {
    let fx = Fixture::new();
    let err = fx
        .engine
        .reconciler
        .reconcile(seatguard_core::types::OrganizationId::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind, seatguard_core::error::ErrorKind::NotFound);
}
