//! Pool synthesis: deciding which pools must be created for a
//! subscription-like source record.

use allot_core::models::pool::{Pool, PoolSource};
use allot_core::models::subscription::Subscription;
use tracing::info;
use uuid::Uuid;

use crate::bonus::derive_bonus_pool;
use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::quantity::calculate_quantity;

/// Project a subscription into its master pool, quantity left raw.
///
/// Callers normally go through [`synthesize_from_subscription`],
/// which also applies multiplier scaling.
pub fn master_pool_from(sub: &Subscription) -> Pool {
    Pool {
        id: Uuid::new_v4(),
        owner_id: sub.owner_id,
        product: sub.product.clone(),
        derived_product: sub.derived_product.clone(),
        provided_product_ids: sub.provided_product_ids.clone(),
        derived_provided_product_ids: sub.derived_provided_product_ids.clone(),
        quantity: sub.quantity,
        start_date: sub.start_date,
        end_date: sub.end_date,
        attributes: Default::default(),
        source: PoolSource::Master {
            subscription_id: sub.id,
        },
        contract_number: sub.contract_number.clone(),
        account_number: sub.account_number.clone(),
        order_number: sub.order_number.clone(),
        branding: sub.branding.clone(),
        upstream_pool_id: sub.upstream_pool_id.clone(),
        exported: 0,
        marked_for_delete: false,
    }
}

/// Decide which pools must be created for a subscription, given the
/// pools that already exist for it.
///
/// Pure function of its inputs: feeding the result back as `existing`
/// yields an empty second result, which makes retries safe.
pub fn synthesize_from_subscription(
    sub: &Subscription,
    existing: &[Pool],
    config: &PoolConfig,
) -> Result<Vec<Pool>, PoolError> {
    synthesize(master_pool_from(sub), existing, config)
}

/// Decide which pools must be created for a master-candidate pool.
///
/// Errors if the candidate is itself a derived source: a master pool
/// can only be rooted in a subscription.
pub fn synthesize(
    mut candidate: Pool,
    existing: &[Pool],
    config: &PoolConfig,
) -> Result<Vec<Pool>, PoolError> {
    candidate.quantity = calculate_quantity(
        candidate.quantity,
        &candidate.product,
        candidate.upstream_pool_id.is_some(),
    );

    // Graduate the product's virt_only flag to a pool attribute so
    // the restriction is explicit to downstream consumers.
    if let Some(virt_only) = &candidate.product.attributes.virt_only {
        candidate.attributes.virt_only = virt_only == "true";
    }

    info!(pool_id = %candidate.id, "Checking if pools need to be created");

    let mut pools = Vec::new();
    if !existing.iter().any(Pool::is_master) {
        if !candidate.is_master() {
            return Err(PoolError::MasterFromDerivedSource);
        }
        info!(pool_id = %candidate.id, quantity = candidate.quantity, "Creating new master pool");
        pools.push(candidate.clone());
    }

    if let Some(bonus) = derive_bonus_pool(&candidate, existing, config) {
        pools.push(bonus);
    }

    Ok(pools)
}
