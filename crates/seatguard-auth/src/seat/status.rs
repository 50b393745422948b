//! Seat occupancy report.

use serde::{Deserialize, Serialize};

use seatguard_core::types::OrganizationId;
use seatguard_entity::organization::Organization;

/// Occupancy of one organization at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatStatus {
    /// Organization id.
    pub organization_id: OrganizationId,
    /// Organization name.
    pub organization: String,
    /// Configured seat limit.
    pub seat_limit: u32,
    /// Sessions currently holding a seat.
    pub active_seats: u32,
    /// `max(0, seat_limit - active_seats)`.
    pub available_seats: u32,
}

impl SeatStatus {
    /// Build the report from an organization and its active count.
    pub fn new(organization: &Organization, active_seats: u32) -> Self {
        Self {
            organization_id: organization.id,
            organization: organization.name.clone(),
            seat_limit: organization.capacity(),
            active_seats,
            available_seats: organization.available_seats(active_seats),
        }
    }

    /// Whether another session would be admitted right now.
    pub fn has_capacity(&self) -> bool {
        self.available_seats > 0
    }
}
