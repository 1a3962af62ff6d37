//! The pool reconciliation engine for the ALLOT system.
//!
//! Derives master, bonus, and stack-derived pools from subscription
//! data and produces idempotent diffs of existing pools against their
//! desired state.

pub mod bonus;
pub mod config;
pub mod error;
pub mod quantity;
pub mod reconcile;
pub mod service;
pub mod stack;
pub mod synthesize;
pub mod update;
pub mod virt;

pub use config::PoolConfig;
pub use error::PoolError;
pub use service::{PoolService, RefreshSummary};
pub use update::PoolUpdate;
