//! Owner domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The organization that owns subscriptions and the pools derived
/// from them. Reconciliation is always scoped to a single owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    /// Stable, URL-safe key (e.g. `acme-corp`).
    pub key: String,
    /// Human-readable name.
    pub display_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
