//! Authentication primitives
//!
//! Password hashing and access-token handling. The HTTP-facing pieces
//! (extractor, handlers) live in the API layer.

pub mod jwt;
pub mod password;
