use std::sync::Arc;

use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{config::Config, statistics::StatisticsCache};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub statistics: Arc<StatisticsCache>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub async fn init(config: Config) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(20)
            .connect_lazy_with(config.database.with_db());

        if config.application.run_migration {
            tracing::warn!("Running database migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
        }

        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: PgPool, config: Config) -> Self {
        AppState {
            pool,
            config,
            statistics: Arc::new(StatisticsCache::default()),
        }
    }
}
