use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    OfferRepository, OrderRepository, ReviewRepository, StatsRepository, UserRepository,
};
use shared::AppError;
use sqlx::SqlitePool;

/// Shared server state handed to every handler
///
/// Cloning is cheap: the pool is internally reference counted and the JWT
/// service sits behind an `Arc`.
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt: Arc<JwtService>,
}

impl ServerState {
    /// Open the database and assemble the state
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        Ok(Self::with_pool(config, db.pool))
    }

    pub fn with_pool(config: Config, pool: SqlitePool) -> Self {
        let jwt = Arc::new(JwtService::new(config.jwt.clone()));
        Self { config, pool, jwt }
    }

    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    pub fn offers(&self) -> OfferRepository {
        OfferRepository::new(self.pool.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    pub fn reviews(&self) -> ReviewRepository {
        ReviewRepository::new(self.pool.clone())
    }

    pub fn stats(&self) -> StatsRepository {
        StatsRepository::new(self.pool.clone())
    }
}
