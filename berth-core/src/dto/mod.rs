//! Data Transfer Objects for the HTTP API
//!
//! This module contains the request and response bodies exchanged between
//! clients and the Berth backend. DTOs are lightweight representations of
//! domain entities optimized for the wire.

pub mod auth;
pub mod task;
