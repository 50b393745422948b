//! Organization entities.

pub mod model;

pub use model::{NewOrganization, Organization};
