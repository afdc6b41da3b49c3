//! Berth Core
//!
//! Core types and abstractions for the Berth game-server hosting backend.
//!
//! This crate contains:
//! - Domain types: Core business entities (Task, User)
//! - DTOs: Request/response bodies for the HTTP API

pub mod domain;
pub mod dto;
