//! Wiring of the seat engine components over one store and clock.

use std::sync::Arc;

use seatguard_core::config::SessionConfig;
use seatguard_core::types::{ActivityWindow, Clock};
use seatguard_database::SeatStore;

use crate::audit::AuditTrail;
use crate::seat::{SeatAllocator, SeatReconciler};
use crate::session::{SessionLedger, SessionSweeper};

/// All seat engine components, sharing one store, clock and activity window.
#[derive(Debug, Clone)]
pub struct SeatEngine {
    /// Admission control.
    pub allocator: Arc<SeatAllocator>,
    /// Session lifecycle.
    pub ledger: Arc<SessionLedger>,
    /// Expiry reclamation.
    pub sweeper: Arc<SessionSweeper>,
    /// Audit trail reads.
    pub audit: Arc<AuditTrail>,
    /// Drift reporting.
    pub reconciler: Arc<SeatReconciler>,
    /// The underlying store.
    pub store: Arc<dyn SeatStore>,
}

impl SeatEngine {
    /// Build every component from the `[session]` configuration.
    pub fn new(store: Arc<dyn SeatStore>, clock: Arc<dyn Clock>, config: &SessionConfig) -> Self {
        Self::with_window(
            store,
            clock,
            config.activity_window(),
            config.max_sessions_per_user,
        )
    }

    /// Build every component with an explicit window and per-user cap.
    pub fn with_window(
        store: Arc<dyn SeatStore>,
        clock: Arc<dyn Clock>,
        window: ActivityWindow,
        max_sessions_per_user: u32,
    ) -> Self {
        let audit = AuditTrail::new(Arc::clone(&store));
        let ledger = SessionLedger::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            window,
            audit.clone(),
        );
        let sweeper = SessionSweeper::new(Arc::clone(&store), clock, window, audit.clone());
        let allocator = SeatAllocator::new(
            Arc::clone(&store),
            ledger.clone(),
            audit.clone(),
            max_sessions_per_user,
        );
        let reconciler = SeatReconciler::new(Arc::clone(&store), ledger.clone(), audit.clone());

        Self {
            allocator: Arc::new(allocator),
            ledger: Arc::new(ledger),
            sweeper: Arc::new(sweeper),
            audit: Arc::new(audit),
            reconciler: Arc::new(reconciler),
            store,
        }
    }
}
