//! Pool quantity calculation.

use allot_core::models::product::Product;
use tracing::debug;

/// Compute a pool's base capacity from the raw subscription quantity
/// and the product's multiplier attributes.
///
/// The product multiplier always applies. The instance multiplier
/// only applies when the subscription did not arrive via an upstream
/// export: upstream deployments scale quantities before exporting,
/// and applying the multiplier again would double-count.
///
/// Infallible here because a malformed instance multiplier is
/// rejected when the product's attributes are parsed.
pub fn calculate_quantity(raw_quantity: i64, product: &Product, imported_from_upstream: bool) -> i64 {
    let mut quantity = raw_quantity * product.effective_multiplier();

    if !imported_from_upstream {
        if let Some(instance_multiplier) = product.attributes.instance_multiplier {
            debug!(
                instance_multiplier,
                product_id = %product.id,
                "Increasing pool quantity for instance multiplier"
            );
            quantity *= i64::from(instance_multiplier);
        }
    }

    quantity
}
