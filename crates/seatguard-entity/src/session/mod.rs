//! Session entities.

pub mod model;
pub mod token;

pub use model::{NewSession, Session};
pub use token::SessionToken;
