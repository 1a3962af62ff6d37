//! Pool domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::attributes::PoolAttributes;
use super::product::{Branding, Product};

/// Sentinel quantity for pools with unlimited capacity.
pub const UNLIMITED_QUANTITY: i64 = -1;

/// How a pool came into existence.
///
/// Exactly one origin exists per pool; the sum type makes mixed or
/// absent origins unrepresentable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PoolSource {
    /// Direct 1:1 projection of a subscription.
    Master { subscription_id: Uuid },
    /// Virtualization bonus pool tied to a master pool's
    /// subscription, from which it can always be re-derived.
    Derived { subscription_id: Uuid },
    /// Aggregated from a consumer's stacked entitlements; never
    /// references a subscription.
    StackDerived { consumer_id: Uuid, stack_id: String },
}

impl PoolSource {
    /// The subscription this pool is anchored to, if any.
    pub fn subscription_id(&self) -> Option<Uuid> {
        match self {
            PoolSource::Master { subscription_id }
            | PoolSource::Derived { subscription_id } => Some(*subscription_id),
            PoolSource::StackDerived { .. } => None,
        }
    }
}

/// A concrete, allocatable capacity record consumers draw
/// entitlements from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pool {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub product: Product,
    pub derived_product: Option<Product>,
    pub provided_product_ids: BTreeSet<String>,
    pub derived_provided_product_ids: BTreeSet<String>,
    /// Allocatable capacity; [`UNLIMITED_QUANTITY`] or ≥ 0.
    pub quantity: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub attributes: PoolAttributes,
    pub source: PoolSource,
    pub contract_number: Option<String>,
    pub account_number: Option<String>,
    pub order_number: Option<String>,
    pub branding: Vec<Branding>,
    pub upstream_pool_id: Option<String>,
    /// Quantity already consumed by downstream exports of this pool.
    pub exported: i64,
    /// Set when reconciliation decides the pool must be removed
    /// (e.g. its governing virt_limit disappeared). Quantity is also
    /// forced to 0 for persistence layers that ignore the flag.
    pub marked_for_delete: bool,
}

impl Pool {
    pub fn is_master(&self) -> bool {
        matches!(self.source, PoolSource::Master { .. })
    }

    pub fn is_derived(&self) -> bool {
        matches!(self.source, PoolSource::Derived { .. })
    }

    pub fn is_stack_derived(&self) -> bool {
        matches!(self.source, PoolSource::StackDerived { .. })
    }

    pub fn is_unlimited(&self) -> bool {
        self.quantity == UNLIMITED_QUANTITY
    }

    /// The product virtualization-scoped consumers should see:
    /// the derived product when one is declared, else the pool's own.
    pub fn derived_or_own_product(&self) -> &Product {
        self.derived_product.as_ref().unwrap_or(&self.product)
    }
}
