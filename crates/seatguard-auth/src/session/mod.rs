//! Session lifecycle: the ledger of seat-holding sessions and the sweeper
//! that reclaims idle ones.

pub mod ledger;
pub mod sweeper;

pub use ledger::SessionLedger;
pub use sweeper::{SessionSweeper, SweepReport};
