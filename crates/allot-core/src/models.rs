//! Domain models for ALLOT.
//!
//! These are the core types shared across all crates: subscriptions,
//! pools, products, entitlements, and the typed attribute structures
//! parsed out of free-form subscription attribute maps.

pub mod attributes;
pub mod entitlement;
pub mod owner;
pub mod pool;
pub mod product;
pub mod subscription;
