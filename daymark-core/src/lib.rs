//! # Daymark Core Library
//!
//! This crate contains the shared types and business logic used by the
//! Daymark API server.
//!
//! ## Module Organization
//!
//! - `models`: Database models and their CRUD queries
//! - `services`: Multi-step operations (task lifecycle, habit tracking,
//!   aggregation views) and the ownership rules they enforce
//! - `auth`: Password hashing and JWT utilities
//! - `db`: Connection pool and migration runner

pub mod auth;
pub mod db;
pub mod models;
pub mod services;

/// Current version of the Daymark core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
