//! Typed change-set produced by pool reconciliation.

use allot_core::models::pool::Pool;
use serde::{Deserialize, Serialize};

/// A typed diff describing what changed on one pool during a
/// reconciliation pass.
///
/// Carries the proposed next state of the pool rather than mutating
/// the persisted record in place; the caller decides whether and how
/// to apply it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolUpdate {
    /// The pool's proposed next state.
    pub pool: Pool,
    pub dates_changed: bool,
    pub quantity_changed: bool,
    pub products_changed: bool,
    pub derived_products_changed: bool,
    pub product_attributes_changed: bool,
    pub order_changed: bool,
    pub branding_changed: bool,
}

impl PoolUpdate {
    /// A no-op update: next state identical to the given pool.
    pub fn unchanged(pool: Pool) -> PoolUpdate {
        PoolUpdate {
            pool,
            dates_changed: false,
            quantity_changed: false,
            products_changed: false,
            derived_products_changed: false,
            product_attributes_changed: false,
            order_changed: false,
            branding_changed: false,
        }
    }

    /// True iff at least one change flag is set.
    pub fn changed(&self) -> bool {
        self.dates_changed
            || self.quantity_changed
            || self.products_changed
            || self.derived_products_changed
            || self.product_attributes_changed
            || self.order_changed
            || self.branding_changed
    }
}
