//! Password hashing for the login boundary.

pub mod hasher;

pub use hasher::PasswordHasher;
