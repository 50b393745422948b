//! User entities.

pub mod model;

pub use model::{NewUser, User};
