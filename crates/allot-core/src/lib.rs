//! Core domain types for the ALLOT system.
//!
//! Domain models, typed product and pool attributes, error types, and
//! collaborator trait definitions shared across all crates.

pub mod error;
pub mod models;
pub mod repository;

pub use error::{AllotError, AllotResult};
