//! Job implementations.

pub mod session_sweep;

pub use session_sweep::SessionSweepJob;
