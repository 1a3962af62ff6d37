//! Stack accumulation: folding a consumer's stacked entitlements
//! into the aggregate that drives a stack-derived pool.

use std::collections::BTreeSet;

use allot_core::models::attributes::ProductAttributes;
use allot_core::models::entitlement::Entitlement;
use chrono::{DateTime, Utc};

/// Aggregate folded from a stack of entitlements.
///
/// An empty input stack produces an accumulation with no usable
/// values; callers must check [`StackAccumulation::is_empty`] before
/// acting on it.
#[derive(Debug)]
pub struct StackAccumulation<'a> {
    /// Entitlement with the earliest creation timestamp.
    pub eldest: Option<&'a Entitlement>,
    /// Eldest entitlement whose pool's product declares a usable
    /// virtualization ratio.
    pub eldest_with_virt_limit: Option<&'a Entitlement>,
    /// Earliest pool start date across the stack.
    pub start_date: Option<DateTime<Utc>>,
    /// Latest pool end date across the stack.
    pub end_date: Option<DateTime<Utc>>,
    /// Union of provided product ids, preferring each pool's
    /// derived-provided set when a derived product is present.
    pub provided_product_ids: BTreeSet<String>,
    /// Name-keyed overlay of product attributes. Later entitlements
    /// in iteration order overwrite earlier ones for colliding names
    /// (last write wins, not a merge).
    pub product_attributes: ProductAttributes,
}

impl StackAccumulation<'_> {
    pub fn is_empty(&self) -> bool {
        self.eldest.is_none()
    }
}

/// Fold a collection of stacked entitlements in a single pass.
pub fn accumulate(stacked: &[Entitlement]) -> StackAccumulation<'_> {
    let mut acc = StackAccumulation {
        eldest: None,
        eldest_with_virt_limit: None,
        start_date: None,
        end_date: None,
        provided_product_ids: BTreeSet::new(),
        product_attributes: ProductAttributes::default(),
    };

    for ent in stacked {
        if acc.eldest.is_none_or(|e| ent.created_at < e.created_at) {
            acc.eldest = Some(ent);
        }

        let has_virt_limit = ent
            .pool
            .product
            .attributes
            .virt_limit
            .is_some_and(|limit| limit.is_usable());
        if has_virt_limit
            && acc
                .eldest_with_virt_limit
                .is_none_or(|e| ent.created_at < e.created_at)
        {
            acc.eldest_with_virt_limit = Some(ent);
        }

        if acc.start_date.is_none_or(|d| ent.pool.start_date < d) {
            acc.start_date = Some(ent.pool.start_date);
        }
        if acc.end_date.is_none_or(|d| ent.pool.end_date > d) {
            acc.end_date = Some(ent.pool.end_date);
        }

        let provided = if ent.pool.derived_product.is_some() {
            &ent.pool.derived_provided_product_ids
        } else {
            &ent.pool.provided_product_ids
        };
        acc.provided_product_ids.extend(provided.iter().cloned());

        acc.product_attributes
            .merge_from(&ent.pool.derived_or_own_product().attributes);
    }

    acc
}
