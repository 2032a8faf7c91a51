use std::future::Future;

use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::{db::statistics::get_statistics, error::Error, model::Statistics};

/// Process-wide single-slot cache for the catalog counters.
///
/// Filled lazily on read. Cleared by the write-tracking middleware after any
/// successful mutating request, see [`crate::middlewares::invalidate_statistics`].
#[derive(Default)]
pub struct StatisticsCache {
    slot: RwLock<Option<Statistics>>,
}

impl StatisticsCache {
    pub async fn get_or_load(&self, pool: &PgPool) -> Result<Statistics, Error> {
        self.get_or_try_init(|| get_statistics(pool)).await
    }

    pub async fn get_or_try_init<F, Fut>(&self, load: F) -> Result<Statistics, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Statistics, Error>>,
    {
        if let Some(statistics) = *self.slot.read().await {
            return Ok(statistics);
        }

        // Loading under the write lock makes a concurrent invalidate wait for
        // the load and then clear it.
        let mut slot = self.slot.write().await;
        if let Some(statistics) = *slot {
            return Ok(statistics);
        }

        let statistics = load().await?;
        *slot = Some(statistics);

        Ok(statistics)
    }

    pub async fn cached(&self) -> Option<Statistics> {
        *self.slot.read().await
    }

    #[tracing::instrument(name = "invalidate statistics", skip_all)]
    pub async fn invalidate(&self) {
        *self.slot.write().await = None;
    }
}
