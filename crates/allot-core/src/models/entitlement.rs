//! Entitlement domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::pool::Pool;

/// A consumer's claim against a pool's quantity.
///
/// Entitlements are read-only inputs to this engine except for the
/// `dirty` flag, which reconciliation raises when the backing pool
/// changes so certificates get regenerated on next check-in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entitlement {
    pub id: Uuid,
    pub consumer_id: Uuid,
    pub owner_id: Uuid,
    /// Snapshot of the pool this entitlement draws from.
    pub pool: Pool,
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
    /// Stack membership, when the backing product stacks.
    pub stack_id: Option<String>,
    pub dirty: bool,
}
