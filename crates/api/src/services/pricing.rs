//! Cached pricing catalog.
//!
//! The pricing page reads the active plans on every visit while the plans
//! themselves change a few times a year, so they are kept in a `moka` cache
//! for `SOLACE_PRICING_CACHE_TTL_SECS`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use sqlx::PgPool;
use tracing::{debug, instrument};

use solace_core::subscription::PlanTier;

use crate::db::{PricingRepository, RepositoryError};
use crate::models::PricingPlan;

const ACTIVE_PLANS_KEY: &str = "active";

/// Active pricing plans with a short-lived in-memory cache.
#[derive(Clone)]
pub struct PricingCatalog {
    cache: Cache<&'static str, Arc<Vec<PricingPlan>>>,
}

impl PricingCatalog {
    /// Create a catalog whose entries expire after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder().max_capacity(16).time_to_live(ttl).build();
        Self { cache }
    }

    /// Active plans, cheapest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the plans are not cached and cannot be loaded.
    #[instrument(skip(self, pool))]
    pub async fn active_plans(
        &self,
        pool: &PgPool,
    ) -> Result<Arc<Vec<PricingPlan>>, RepositoryError> {
        if let Some(plans) = self.cache.get(ACTIVE_PLANS_KEY).await {
            debug!("Pricing cache hit");
            return Ok(plans);
        }

        let plans = Arc::new(PricingRepository::new(pool).list_active().await?);
        self.cache
            .insert(ACTIVE_PLANS_KEY, Arc::clone(&plans))
            .await;
        debug!(count = plans.len(), "Pricing cache filled");
        Ok(plans)
    }

    /// The active plan for a tier, if one is offered.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the plans cannot be loaded.
    pub async fn plan_for(
        &self,
        pool: &PgPool,
        tier: PlanTier,
    ) -> Result<Option<PricingPlan>, RepositoryError> {
        let plans = self.active_plans(pool).await?;
        Ok(plans.iter().find(|plan| plan.tier == tier).cloned())
    }
}
