//! Subscription and stack refresh orchestration.
//!
//! Ties the pure engine functions to the collaborator traits: entity
//! lookup, persistence, and dirty-entitlement notification. Generic
//! over the trait implementations so the engine has no dependency on
//! any storage crate.
//!
//! Callers must ensure at most one concurrent refresh per
//! subscription or per (consumer, stack) key; the engine is
//! idempotent but provides no mutual exclusion of its own.

use std::collections::BTreeSet;

use allot_core::error::AllotResult;
use allot_core::models::pool::{Pool, PoolSource};
use allot_core::models::subscription::Subscription;
use allot_core::repository::{
    DirtyEntitlementSink, EntitlementRepository, PoolRepository, PoolSink,
};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::PoolConfig;
use crate::error::PoolError;
use crate::reconcile::{reconcile_from_stack, reconcile_subscription};
use crate::synthesize::synthesize_from_subscription;
use crate::update::PoolUpdate;

/// Counts of what a refresh pass actually did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub pools_created: usize,
    pub pools_updated: usize,
    pub pools_deleted: usize,
    pub entitlements_dirtied: usize,
}

/// Pool reconciliation service.
pub struct PoolService<P, E, S, D>
where
    P: PoolRepository,
    E: EntitlementRepository,
    S: PoolSink,
    D: DirtyEntitlementSink,
{
    pool_repo: P,
    entitlement_repo: E,
    pool_sink: S,
    dirty_sink: D,
    config: PoolConfig,
}

impl<P, E, S, D> PoolService<P, E, S, D>
where
    P: PoolRepository,
    E: EntitlementRepository,
    S: PoolSink,
    D: DirtyEntitlementSink,
{
    pub fn new(
        pool_repo: P,
        entitlement_repo: E,
        pool_sink: S,
        dirty_sink: D,
        config: PoolConfig,
    ) -> Self {
        Self {
            pool_repo,
            entitlement_repo,
            pool_sink,
            dirty_sink,
            config,
        }
    }

    /// Bring a subscription's pools in line with its current data:
    /// create any missing master/bonus pools, then reconcile the
    /// pools that already exist.
    pub async fn refresh_subscription(
        &self,
        sub: &Subscription,
        changed_products: &BTreeSet<String>,
    ) -> AllotResult<RefreshSummary> {
        let existing = self.pool_repo.find_by_subscription(sub.id).await?;

        let new_pools = synthesize_from_subscription(sub, &existing, &self.config)?;
        let mut summary = RefreshSummary {
            pools_created: new_pools.len(),
            ..Default::default()
        };
        if !new_pools.is_empty() {
            self.pool_sink.create_pools(new_pools).await?;
        }

        let updates = reconcile_subscription(sub, &existing, changed_products, &self.config);
        self.apply_updates(updates, &mut summary).await?;

        info!(
            subscription_id = %sub.id,
            created = summary.pools_created,
            updated = summary.pools_updated,
            deleted = summary.pools_deleted,
            "Subscription refresh complete"
        );
        Ok(summary)
    }

    /// Reconcile a single stack-derived pool against the current
    /// state of the stack's entitlements.
    pub async fn refresh_stack_pool(
        &self,
        pool: &Pool,
        changed_products: &BTreeSet<String>,
    ) -> AllotResult<RefreshSummary> {
        let PoolSource::StackDerived {
            consumer_id,
            stack_id,
        } = &pool.source
        else {
            return Err(PoolError::NotStackDerived {
                pool_id: pool.id.to_string(),
            }
            .into());
        };

        let stacked = self
            .entitlement_repo
            .find_by_stack(*consumer_id, stack_id)
            .await?;

        let update = reconcile_from_stack(pool, &stacked, changed_products);
        let mut summary = RefreshSummary::default();
        self.apply_updates(vec![update], &mut summary).await?;
        Ok(summary)
    }

    /// Refresh pools with no subscription tied directly to them.
    /// Anything that is not stack-derived is skipped.
    pub async fn refresh_floating_pools(
        &self,
        pools: &[Pool],
        changed_products: &BTreeSet<String>,
    ) -> AllotResult<RefreshSummary> {
        let mut summary = RefreshSummary::default();
        for pool in pools {
            if !pool.is_stack_derived() {
                debug!(pool_id = %pool.id, "Skipping non-stack-derived floating pool");
                continue;
            }
            let pass = self.refresh_stack_pool(pool, changed_products).await?;
            summary.pools_updated += pass.pools_updated;
            summary.pools_deleted += pass.pools_deleted;
            summary.entitlements_dirtied += pass.entitlements_dirtied;
        }
        Ok(summary)
    }

    /// Apply changed updates: persist next states (or delete marked
    /// pools) and mark the affected pools' entitlements dirty so
    /// their certificates regenerate on next check-in.
    async fn apply_updates(
        &self,
        updates: Vec<PoolUpdate>,
        summary: &mut RefreshSummary,
    ) -> AllotResult<()> {
        let mut dirty_ids: Vec<Uuid> = Vec::new();

        for update in updates {
            if !update.changed() {
                continue;
            }

            let entitlements = self.pool_repo.find_entitlements(update.pool.id).await?;
            dirty_ids.extend(entitlements.iter().map(|e| e.id));

            if update.pool.marked_for_delete {
                info!(pool_id = %update.pool.id, "Deleting pool flagged for removal");
                self.pool_sink.delete_pool(update.pool.id).await?;
                summary.pools_deleted += 1;
            } else {
                self.pool_sink.update_pool(update.pool).await?;
                summary.pools_updated += 1;
            }
        }

        if !dirty_ids.is_empty() {
            summary.entitlements_dirtied += dirty_ids.len();
            self.dirty_sink.mark_dirty(dirty_ids).await?;
        }
        Ok(())
    }
}
