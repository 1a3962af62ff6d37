//! Virt-limit quantity adjustment for derived pools.

use allot_core::models::attributes::{ProductAttributes, VirtLimit};
use allot_core::models::pool::{Pool, UNLIMITED_QUANTITY};
use tracing::warn;

use crate::config::PoolConfig;

/// Outcome of re-applying a subscription's virtualization ratio to a
/// derived pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtAdjustment {
    pub quantity: i64,
    pub mark_for_delete: bool,
}

/// Whether the virt-limit adjustment applies to this pool at all:
/// derived, virt-only, and carrying virt-limit metadata either on the
/// incoming attributes or on the pool's own product.
pub fn applies(pool: &Pool, attrs: &ProductAttributes) -> bool {
    pool.attributes.pool_derived
        && pool.attributes.virt_only
        && (attrs.virt_limit.is_some() || pool.product.attributes.virt_limit.is_some())
}

/// Recompute a derived pool's quantity from the controlling
/// subscription's current virtualization ratio.
///
/// `provisional` is the already multiplier-scaled subscription
/// quantity. `siblings` are the other pools of the same subscription;
/// the export count of the non-derived (physical) sibling reduces the
/// capacity the ratio applies to in hosted mode. Exactly one such
/// sibling is assumed; with none, no adjustment is made.
pub fn adjust_virt_limit_quantity(
    existing: &Pool,
    siblings: &[Pool],
    attrs: &ProductAttributes,
    provisional: i64,
    config: &PoolConfig,
) -> VirtAdjustment {
    let Some(virt_limit) = attrs.virt_limit else {
        // The ratio was removed from the product: this pool must go.
        // Quantity is also zeroed for persistence layers that do not
        // honor the deletion flag.
        warn!(
            pool_id = %existing.id,
            "virt_limit attribute has been removed from subscription, flagging pool for deletion"
        );
        return VirtAdjustment {
            quantity: 0,
            mark_for_delete: true,
        };
    };

    match virt_limit {
        VirtLimit::Unlimited => {
            // A zero quantity was set deliberately; do not resurrect.
            let quantity = if existing.quantity == 0 {
                0
            } else {
                UNLIMITED_QUANTITY
            };
            VirtAdjustment {
                quantity,
                mark_for_delete: false,
            }
        }
        VirtLimit::Limited(n) if n > 0 => {
            let quantity = if config.standalone && !existing.attributes.unmapped_guests_only {
                // Standalone consumes exported data where the ratio
                // is already the full answer.
                i64::from(n)
            } else {
                let exported = siblings
                    .iter()
                    .find(|p| !p.attributes.pool_derived)
                    .map_or(0, |p| p.exported);
                (provisional - exported) * i64::from(n)
            };
            VirtAdjustment {
                quantity,
                mark_for_delete: false,
            }
        }
        VirtLimit::Limited(_) | VirtLimit::Invalid => {
            // Lenient path: this runs on every refresh and must not
            // fail outright on bad operator data, so the pool's
            // current quantity stands.
            warn!(pool_id = %existing.id, "Invalid virt_limit attribute specified, leaving quantity unchanged");
            VirtAdjustment {
                quantity: existing.quantity,
                mark_for_delete: false,
            }
        }
    }
}
