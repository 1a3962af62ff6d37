//! Product domain model.

use serde::{Deserialize, Serialize};

use super::attributes::ProductAttributes;

/// A marketed product (SKU) that subscriptions grant capacity for.
///
/// Products use upstream string identifiers rather than UUIDs because
/// they originate in external catalogs and are matched by SKU.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    /// Quantity multiplier applied when pools are created from a
    /// subscription for this product. Absent means 1.
    pub multiplier: Option<i64>,
    /// Typed policy attributes, parsed from the merged upstream map.
    pub attributes: ProductAttributes,
}

impl Product {
    /// The multiplier to apply, defaulting to 1 when unset.
    pub fn effective_multiplier(&self) -> i64 {
        self.multiplier.unwrap_or(1)
    }
}

/// A branding entry carried on subscriptions and synced onto pools.
///
/// Lets an owner re-brand an engineering product's name in issued
/// certificates without changing the product itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Branding {
    pub product_id: String,
    pub brand_type: String,
    pub name: String,
}
