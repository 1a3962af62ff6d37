//! Subscription domain model.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::{Branding, Product};

/// An upstream grant of capacity for a product, owned by an org.
///
/// Subscriptions are read-only inputs to reconciliation: the engine
/// derives pools from them but never writes them back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub product: Product,
    /// Product exposed to virtualization-scoped consumers instead of
    /// `product`, when the subscription declares one.
    pub derived_product: Option<Product>,
    /// IDs of engineering products provided by `product`.
    pub provided_product_ids: BTreeSet<String>,
    /// IDs of engineering products provided by `derived_product`.
    pub derived_provided_product_ids: BTreeSet<String>,
    /// Granted quantity; never negative.
    pub quantity: i64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub contract_number: Option<String>,
    pub account_number: Option<String>,
    pub order_number: Option<String>,
    pub branding: Vec<Branding>,
    /// Set when this subscription was imported from an upstream
    /// deployment, in which case instance-multiplier scaling has
    /// already been applied there.
    pub upstream_pool_id: Option<String>,
}

impl Subscription {
    /// Whether this subscription arrived via an upstream export.
    pub fn is_imported(&self) -> bool {
        self.upstream_pool_id.is_some()
    }
}
