//! Core domain types
//!
//! This module contains the core domain structures used across the Berth
//! backend. These types represent the fundamental business entities shared
//! between the API layer (which creates and queries them) and the dispatcher
//! workers (which update them).

pub mod task;
pub mod user;
