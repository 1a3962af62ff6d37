//! Virtualization bonus pool derivation.

use allot_core::models::attributes::{PoolAttributes, VirtLimit};
use allot_core::models::pool::{Pool, PoolSource, UNLIMITED_QUANTITY};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PoolConfig;

/// Derive the virtualization bonus pool for a master pool, if one
/// must exist and does not already.
///
/// Returns `None` when the master has no durable subscription
/// linkage to anchor the derived pool to, when a derived pool already
/// exists among `existing`, or when the product's virt_limit is
/// absent or unusable.
pub fn derive_bonus_pool(master: &Pool, existing: &[Pool], config: &PoolConfig) -> Option<Pool> {
    let subscription_id = master.source.subscription_id()?;

    if existing.iter().any(Pool::is_derived) {
        debug!(%subscription_id, "Derived pool already exists, skipping bonus derivation");
        return None;
    }

    let quantity = virt_quantity(master.product.attributes.virt_limit, master.quantity)?;

    let unmapped_guests_only = master.product.attributes.host_limited || config.standalone;
    let product = master.derived_or_own_product().clone();
    let provided = if master.derived_product.is_some() {
        master.derived_provided_product_ids.clone()
    } else {
        master.provided_product_ids.clone()
    };

    let bonus = Pool {
        id: Uuid::new_v4(),
        owner_id: master.owner_id,
        product,
        derived_product: None,
        provided_product_ids: provided,
        derived_provided_product_ids: Default::default(),
        quantity,
        start_date: master.start_date,
        end_date: master.end_date,
        attributes: PoolAttributes::derived(unmapped_guests_only),
        source: PoolSource::Derived { subscription_id },
        contract_number: master.contract_number.clone(),
        account_number: master.account_number.clone(),
        order_number: master.order_number.clone(),
        branding: master.branding.clone(),
        upstream_pool_id: master.upstream_pool_id.clone(),
        exported: 0,
        marked_for_delete: false,
    };

    debug!(%subscription_id, quantity, "Creating new derived pool");
    Some(bonus)
}

/// Quantity a virt ratio yields against the master pool's quantity,
/// or `None` when no bonus pool should exist.
fn virt_quantity(virt_limit: Option<VirtLimit>, master_quantity: i64) -> Option<i64> {
    match virt_limit? {
        VirtLimit::Unlimited => Some(UNLIMITED_QUANTITY),
        VirtLimit::Limited(n) if n > 0 => {
            if master_quantity == UNLIMITED_QUANTITY {
                Some(UNLIMITED_QUANTITY)
            } else {
                Some(i64::from(n) * master_quantity)
            }
        }
        VirtLimit::Limited(_) | VirtLimit::Invalid => {
            warn!("Invalid virt_limit attribute specified, no bonus pool derived");
            None
        }
    }
}
