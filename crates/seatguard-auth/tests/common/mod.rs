//! Shared fixtures for seat engine integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::Duration;

use seatguard_auth::SeatEngine;
use seatguard_core::types::{ActivityWindow, ManualClock};
use seatguard_database::{MemorySeatStore, SeatStore};
use seatguard_entity::organization::{NewOrganization, Organization};
use seatguard_entity::user::{NewUser, User};

/// An in-process store, a manual clock and an engine wired over both.
pub struct Fixture {
    pub store: MemorySeatStore,
    pub clock: Arc<ManualClock>,
    pub engine: SeatEngine,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_user_cap(0)
    }

    pub fn with_user_cap(max_sessions_per_user: u32) -> Self {
        let store = MemorySeatStore::new();
        let clock = Arc::new(ManualClock::starting_now());
        let engine = SeatEngine::with_window(
            Arc::new(store.clone()),
            clock.clone(),
            ActivityWindow::from_minutes(30),
            max_sessions_per_user,
        );
        Self {
            store,
            clock,
            engine,
        }
    }

    pub async fn organization(&self, name: &str, seat_limit: i32) -> Organization {
        self.store
            .insert_organization(NewOrganization {
                name: name.to_string(),
                seat_limit,
            })
            .await
            .expect("insert organization")
    }

    pub async fn users(&self, organization: &Organization, count: usize) -> Vec<User> {
        let mut users = Vec::with_capacity(count);
        for i in 0..count {
            let user = self
                .store
                .insert_user(NewUser {
                    username: format!("{}-user-{i}", organization.name),
                    email: None,
                    password_hash: "unused".to_string(),
                    organization_id: organization.id,
                })
                .await
                .expect("insert user");
            users.push(user);
        }
        users
    }

    pub fn advance_minutes(&self, minutes: i64) {
        self.clock.advance(Duration::minutes(minutes));
    }
}
