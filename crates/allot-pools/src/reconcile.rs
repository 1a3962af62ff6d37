//! Pool update reconciliation: diffing existing pools against the
//! state a subscription (or entitlement stack) says they should have.
//!
//! The reconciler never mutates its inputs. Each existing pool is
//! cloned into a proposed next state, the two are diffed field group
//! by field group, and the result is returned as a [`PoolUpdate`]
//! carrying both the flags and the next state. Applying the update
//! (and marking dependent entitlements dirty) is the caller's job.

use std::collections::BTreeSet;

use allot_core::models::attributes::VirtLimit;
use allot_core::models::entitlement::Entitlement;
use allot_core::models::pool::{Pool, UNLIMITED_QUANTITY};
use allot_core::models::product::{Branding, Product};
use allot_core::models::subscription::Subscription;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::PoolConfig;
use crate::quantity::calculate_quantity;
use crate::stack::accumulate;
use crate::update::PoolUpdate;
use crate::virt;

/// Reconcile all existing pools of a subscription against its
/// current data, returning an update for each pool that changed.
///
/// `changed_products` holds ids of products whose own metadata
/// changed upstream without the pool's product id changing; any pool
/// referencing one is treated as product-changed.
pub fn reconcile_subscription(
    sub: &Subscription,
    existing: &[Pool],
    changed_products: &BTreeSet<String>,
    config: &PoolConfig,
) -> Vec<PoolUpdate> {
    debug!(subscription_id = %sub.id, existing = existing.len(), "Refreshing pools for existing subscription");

    let mut updates = Vec::new();
    for pool in existing {
        debug!(pool_id = %pool.id, "Checking pool");
        let update = reconcile_pool(sub, pool, existing, changed_products, config);
        if update.changed() {
            updates.push(update);
        } else {
            debug!(pool_id = %pool.id, "No updates required");
        }
    }
    updates
}

fn reconcile_pool(
    sub: &Subscription,
    pool: &Pool,
    siblings: &[Pool],
    changed_products: &BTreeSet<String>,
    config: &PoolConfig,
) -> PoolUpdate {
    let mut update = PoolUpdate::unchanged(pool.clone());
    let next = &mut update.pool;

    // Subscription linkage details are maintained on the master pool.
    if next.is_master() {
        next.upstream_pool_id = sub.upstream_pool_id.clone();
    }

    update.dates_changed = sync_dates(next, sub.start_date, sub.end_date);
    update.quantity_changed = sync_quantity(next, pool, sub, siblings, config);

    if !next.marked_for_delete {
        // Derived pools graduate the subscription's derived product
        // to be the pool product.
        let use_derived = next.attributes.pool_derived && sub.derived_product.is_some();
        let (incoming_product, expected_provided) = if use_derived {
            (
                sub.derived_product.as_ref().unwrap_or(&sub.product),
                &sub.derived_provided_product_ids,
            )
        } else {
            (&sub.product, &sub.provided_product_ids)
        };

        update.products_changed =
            sync_products(next, incoming_product, expected_provided, changed_products);

        if !use_derived {
            update.derived_products_changed = sync_derived_products(next, sub, changed_products);
        }

        update.order_changed = sync_order_info(
            next,
            sub.contract_number.as_deref(),
            sub.account_number.as_deref(),
            sub.order_number.as_deref(),
        );

        update.branding_changed = sync_branding(next, &sub.branding);
    }

    update
}

/// Reconcile a stack-derived pool against the current state of the
/// stack's entitlements. An empty stack is nothing to reconcile and
/// yields a no-op update.
pub fn reconcile_from_stack(
    pool: &Pool,
    stacked: &[Entitlement],
    changed_products: &BTreeSet<String>,
) -> PoolUpdate {
    let mut update = PoolUpdate::unchanged(pool.clone());
    if stacked.is_empty() {
        return update;
    }

    let acc = accumulate(stacked);
    let Some(eldest) = acc.eldest else {
        return update;
    };
    let next = &mut update.pool;

    // The quantity only moves when some stack member's pool declares
    // a usable virt limit; it then tracks the eldest such pool.
    if let Some(eldest_virt) = acc.eldest_with_virt_limit {
        let virt_pool = &eldest_virt.pool;
        let quantity = match virt_pool.product.attributes.virt_limit {
            Some(VirtLimit::Unlimited) => UNLIMITED_QUANTITY,
            Some(VirtLimit::Limited(n)) => i64::from(n) * virt_pool.quantity,
            Some(VirtLimit::Invalid) | None => next.quantity,
        };
        if quantity != next.quantity {
            next.quantity = quantity;
            update.quantity_changed = true;
        }
    }

    // Non-empty stack, so the accumulated bounds are present.
    if let (Some(start), Some(end)) = (acc.start_date, acc.end_date) {
        update.dates_changed = sync_dates(next, start, end);
    }

    // The eldest entitlement is the master for values that could
    // have come from any of the stacked subscriptions.
    let eldest_pool = &eldest.pool;
    let product = eldest_pool.derived_or_own_product();

    if next.product.attributes != product.attributes {
        next.product.attributes = product.attributes.clone();
        update.product_attributes_changed = true;
    }

    update.products_changed =
        sync_products(next, product, &acc.provided_product_ids, changed_products);

    update.order_changed = sync_order_info(
        next,
        eldest_pool.contract_number.as_deref(),
        eldest_pool.account_number.as_deref(),
        eldest_pool.order_number.as_deref(),
    );

    update
}

fn sync_dates(next: &mut Pool, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
    let changed = next.start_date != start || next.end_date != end;
    if changed {
        next.start_date = start;
        next.end_date = end;
    }
    changed
}

fn sync_quantity(
    next: &mut Pool,
    existing: &Pool,
    sub: &Subscription,
    siblings: &[Pool],
    config: &PoolConfig,
) -> bool {
    // Expected quantity is normally the subscription's scaled
    // quantity; derived virt-only pools re-apply the virt ratio.
    let mut expected = calculate_quantity(sub.quantity, &sub.product, sub.is_imported());

    if virt::applies(existing, &sub.product.attributes) {
        let adjustment = virt::adjust_virt_limit_quantity(
            existing,
            siblings,
            &sub.product.attributes,
            expected,
            config,
        );
        expected = adjustment.quantity;
        if adjustment.mark_for_delete {
            next.marked_for_delete = true;
        }
    }

    let changed = expected != next.quantity;
    if changed {
        next.quantity = expected;
    }
    changed
}

fn sync_products(
    next: &mut Pool,
    incoming: &Product,
    expected_provided: &BTreeSet<String>,
    changed_products: &BTreeSet<String>,
) -> bool {
    let changed = incoming.id != next.product.id
        || changed_products.contains(&next.product.id)
        || next.provided_product_ids != *expected_provided;

    if changed {
        next.product = incoming.clone();
        next.provided_product_ids = expected_provided.clone();
    }
    changed
}

fn sync_derived_products(
    next: &mut Pool,
    sub: &Subscription,
    changed_products: &BTreeSet<String>,
) -> bool {
    // Null-vs-present transitions count as a change in both
    // directions.
    let id_changed = match (&sub.derived_product, &next.derived_product) {
        (Some(incoming), Some(current)) => {
            incoming.id != current.id || changed_products.contains(&current.id)
        }
        (None, None) => false,
        _ => true,
    };

    let changed = id_changed || next.derived_provided_product_ids != sub.derived_provided_product_ids;

    if changed {
        next.derived_product = sub.derived_product.clone();
        next.derived_provided_product_ids = sub.derived_provided_product_ids.clone();
    }
    changed
}

fn sync_order_info(
    next: &mut Pool,
    contract: Option<&str>,
    account: Option<&str>,
    order: Option<&str>,
) -> bool {
    let changed = next.contract_number.as_deref() != contract
        || next.account_number.as_deref() != account
        || next.order_number.as_deref() != order;

    if changed {
        next.contract_number = contract.map(str::to_owned);
        next.account_number = account.map(str::to_owned);
        next.order_number = order.map(str::to_owned);
    }
    changed
}

fn sync_branding(next: &mut Pool, incoming: &[Branding]) -> bool {
    let changed = incoming.len() != next.branding.len()
        || incoming.iter().any(|b| !next.branding.contains(b));

    if changed {
        next.branding = incoming.to_vec();
    }
    changed
}
