//! Service Module
//!
//! Business logic layer for the backend.
//! Services orchestrate between repositories, the task registry, the
//! dispatcher, and the filesystem.

pub mod auth;
pub mod install;
pub mod launch;
pub mod saves;

// Re-export for convenience
pub use auth as auth_service;
pub use install as install_service;
pub use launch as launch_service;
pub use saves as saves_service;
