//! Repository Module
//!
//! Data access layer for the backend.
//! Each repository handles database operations for a specific domain entity.

pub mod user;

// Re-export for convenience
pub use user as user_repository;
