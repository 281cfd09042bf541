//! Platform statistics repository

use super::RepoResult;
use shared::models::BaseInfo;
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Platform-wide counters for the public landing page
    pub async fn base_info(&self) -> RepoResult<BaseInfo> {
        let (review_count, average_rating): (i64, Option<f64>) =
            sqlx::query_as("SELECT COUNT(*), AVG(rating) FROM review")
                .fetch_one(&self.pool)
                .await?;

        let business_profile_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM user_account WHERE role = 'business'")
                .fetch_one(&self.pool)
                .await?;

        let offer_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offer")
            .fetch_one(&self.pool)
            .await?;

        Ok(BaseInfo {
            review_count,
            average_rating: (average_rating.unwrap_or(0.0) * 10.0).round() / 10.0,
            business_profile_count,
            offer_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::{OfferRepository, ReviewRepository};
    use crate::db::repository::offer::test_support::three_tiers;
    use crate::db::repository::user::test_support::seed_user;
    use shared::models::{ReviewCreate, Role};

    #[tokio::test]
    async fn empty_platform_yields_zeroes() {
        let db = DbService::in_memory().await.unwrap();
        let info = StatsRepository::new(db.pool.clone()).base_info().await.unwrap();
        assert_eq!(info.review_count, 0);
        assert_eq!(info.average_rating, 0.0);
        assert_eq!(info.business_profile_count, 0);
        assert_eq!(info.offer_count, 0);
    }

    #[tokio::test]
    async fn counts_and_rounded_average() {
        let db = DbService::in_memory().await.unwrap();
        let business = seed_user(&db.pool, "studio", Role::Business).await;
        seed_user(&db.pool, "agency", Role::Business).await;
        let customer = seed_user(&db.pool, "buyer", Role::Customer).await;
        let other = seed_user(&db.pool, "guest", Role::Customer).await;

        OfferRepository::new(db.pool.clone())
            .create(business.id, three_tiers("Logo pack"))
            .await
            .unwrap();

        let reviews = ReviewRepository::new(db.pool.clone());
        for (reviewer, rating) in [(customer.id, 4), (other.id, 5)] {
            reviews
                .create(
                    reviewer,
                    ReviewCreate {
                        business_user_id: business.id,
                        rating,
                        description: "ok".to_string(),
                    },
                )
                .await
                .unwrap();
        }

        let info = StatsRepository::new(db.pool.clone()).base_info().await.unwrap();
        assert_eq!(info.review_count, 2);
        assert_eq!(info.average_rating, 4.5);
        assert_eq!(info.business_profile_count, 2);
        assert_eq!(info.offer_count, 1);
    }
}
