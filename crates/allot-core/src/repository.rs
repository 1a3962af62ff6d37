//! Collaborator trait definitions for data access abstraction.
//!
//! The reconciliation engine performs no I/O of its own: entity
//! lookups and persistence go through these traits, implemented by
//! the host environment. All operations are async.

use uuid::Uuid;

use crate::error::AllotResult;
use crate::models::entitlement::Entitlement;
use crate::models::pool::Pool;

/// Lookup of pools and the entitlements drawing from them.
pub trait PoolRepository: Send + Sync {
    /// All pools whose origin references the given subscription
    /// (master and derived alike).
    fn find_by_subscription(
        &self,
        subscription_id: Uuid,
    ) -> impl Future<Output = AllotResult<Vec<Pool>>> + Send;

    /// All entitlements currently drawing from the given pool.
    fn find_entitlements(
        &self,
        pool_id: Uuid,
    ) -> impl Future<Output = AllotResult<Vec<Entitlement>>> + Send;
}

/// Lookup of stacked entitlements.
pub trait EntitlementRepository: Send + Sync {
    /// All of a consumer's entitlements sharing the given stack id.
    fn find_by_stack(
        &self,
        consumer_id: Uuid,
        stack_id: &str,
    ) -> impl Future<Output = AllotResult<Vec<Entitlement>>> + Send;
}

/// Persistence sink for pools produced or modified by reconciliation.
pub trait PoolSink: Send + Sync {
    fn create_pools(&self, pools: Vec<Pool>) -> impl Future<Output = AllotResult<()>> + Send;

    fn update_pool(&self, pool: Pool) -> impl Future<Output = AllotResult<()>> + Send;

    fn delete_pool(&self, pool_id: Uuid) -> impl Future<Output = AllotResult<()>> + Send;
}

/// Sink for entitlements whose certificates must be regenerated
/// because their pool changed materially.
pub trait DirtyEntitlementSink: Send + Sync {
    fn mark_dirty(
        &self,
        entitlement_ids: Vec<Uuid>,
    ) -> impl Future<Output = AllotResult<()>> + Send;
}
