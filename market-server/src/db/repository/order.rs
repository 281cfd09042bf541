//! Order repository
//!
//! Orders are value snapshots of the tier they were placed against. The
//! status transition guard lives in the UPDATE itself so two racing
//! writers cannot both move an order out of `in_progress`.

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM customer_order WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    /// Orders the user participates in, on either side, newest first
    pub async fn list_for_user(&self, user_id: i64) -> RepoResult<Vec<Order>> {
        let orders = sqlx::query_as::<_, Order>(
            "SELECT * FROM customer_order \
             WHERE customer_user_id = ?1 OR business_user_id = ?1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    /// Place an order for one tier, copying its fields by value
    ///
    /// The business party is the owner of the tier's offer at this moment;
    /// later ownership or catalog changes do not touch the order.
    pub async fn create_from_detail(
        &self,
        customer_id: i64,
        offer_detail_id: i64,
    ) -> RepoResult<Order> {
        let id = snowflake_id();
        let now = now_millis();

        let mut tx = self.pool.begin().await?;

        let source: Option<(i64, String, i64, i64, i64, String, String)> = sqlx::query_as(
            "SELECT o.user_id, d.title, d.revisions, d.delivery_time_in_days, \
             d.price, d.features, d.offer_type \
             FROM offer_detail d JOIN offer o ON o.id = d.offer_id \
             WHERE d.id = ?1",
        )
        .bind(offer_detail_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((business_id, title, revisions, delivery, price, features, offer_type)) = source
        else {
            return Err(RepoError::NotFound(format!(
                "offer detail {offer_detail_id}"
            )));
        };

        sqlx::query(
            "INSERT INTO customer_order \
             (id, customer_user_id, business_user_id, title, revisions, delivery_time_in_days, \
              price, features, offer_type, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 'in_progress', ?10, ?10)",
        )
        .bind(id)
        .bind(customer_id)
        .bind(business_id)
        .bind(&title)
        .bind(revisions)
        .bind(delivery)
        .bind(price)
        .bind(&features)
        .bind(&offer_type)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create order".into()))
    }

    /// Move an order to a new status
    ///
    /// Only `in_progress` orders can move; a terminal order yields a
    /// validation error and is left untouched.
    pub async fn update_status(&self, id: i64, status: OrderStatus) -> RepoResult<Order> {
        let result = sqlx::query(
            "UPDATE customer_order SET status = ?1, updated_at = ?2 \
             WHERE id = ?3 AND status = 'in_progress'",
        )
        .bind(status)
        .bind(now_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.find_by_id(id).await? {
                Some(_) => Err(RepoError::Validation(
                    "Order is already in a terminal state".into(),
                )),
                None => Err(RepoError::NotFound(format!("order {id}"))),
            };
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("order {id}")))
    }

    pub async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM customer_order WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Open order count for one business account
    pub async fn count_in_progress(&self, business_user_id: i64) -> RepoResult<i64> {
        self.count_with_status(business_user_id, OrderStatus::InProgress)
            .await
    }

    /// Completed order count for one business account
    pub async fn count_completed(&self, business_user_id: i64) -> RepoResult<i64> {
        self.count_with_status(business_user_id, OrderStatus::Completed)
            .await
    }

    async fn count_with_status(
        &self,
        business_user_id: i64,
        status: OrderStatus,
    ) -> RepoResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM customer_order WHERE business_user_id = ?1 AND status = ?2",
        )
        .bind(business_user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::OfferRepository;
    use crate::db::repository::offer::test_support::three_tiers;
    use crate::db::repository::user::test_support::seed_user;
    use shared::models::{OfferDetailUpdate, OfferType, OfferUpdate, Role};

    struct Fixture {
        db: DbService,
        customer: i64,
        business: i64,
        basic_detail: i64,
    }

    async fn setup() -> Fixture {
        let db = DbService::in_memory().await.unwrap();
        let business = seed_user(&db.pool, "studio", Role::Business).await;
        let customer = seed_user(&db.pool, "buyer", Role::Customer).await;

        let offers = OfferRepository::new(db.pool.clone());
        let item = offers
            .create(business.id, three_tiers("Logo pack"))
            .await
            .unwrap();
        let basic_detail = offers
            .details_of(item.id)
            .await
            .unwrap()
            .into_iter()
            .find(|d| d.offer_type == OfferType::Basic)
            .unwrap()
            .id;

        Fixture {
            db,
            customer: customer.id,
            business: business.id,
            basic_detail,
        }
    }

    #[tokio::test]
    async fn create_snapshots_the_tier() {
        let fx = setup().await;
        let repo = OrderRepository::new(fx.db.pool.clone());

        let order = repo
            .create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();
        assert_eq!(order.customer_user_id, fx.customer);
        assert_eq!(order.business_user_id, fx.business);
        assert_eq!(order.price, 1000);
        assert_eq!(order.offer_type, OfferType::Basic);
        assert_eq!(order.status, OrderStatus::InProgress);
    }

    #[tokio::test]
    async fn order_survives_catalog_edits_and_deletes() {
        let fx = setup().await;
        let orders = OrderRepository::new(fx.db.pool.clone());
        let offers = OfferRepository::new(fx.db.pool.clone());

        let order = orders
            .create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();

        let detail = offers.find_detail(fx.basic_detail).await.unwrap().unwrap();
        offers
            .update(
                detail.offer_id,
                OfferUpdate {
                    details: Some(vec![OfferDetailUpdate {
                        offer_type: OfferType::Basic,
                        price: Some(9999),
                        title: None,
                        revisions: None,
                        delivery_time_in_days: None,
                        features: None,
                    }]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        offers.delete(detail.offer_id).await.unwrap();

        let unchanged = orders.find_by_id(order.id).await.unwrap().unwrap();
        assert_eq!(unchanged.price, 1000);
        assert_eq!(unchanged.title, order.title);
    }

    #[tokio::test]
    async fn create_with_unknown_detail_is_not_found() {
        let fx = setup().await;
        let repo = OrderRepository::new(fx.db.pool.clone());
        let err = repo.create_from_detail(fx.customer, 123456).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound(_)));
    }

    #[tokio::test]
    async fn terminal_status_is_one_way() {
        let fx = setup().await;
        let repo = OrderRepository::new(fx.db.pool.clone());
        let order = repo
            .create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();

        let completed = repo
            .update_status(order.id, OrderStatus::Completed)
            .await
            .unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        assert!(completed.updated_at >= order.updated_at);

        let err = repo
            .update_status(order.id, OrderStatus::InProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
        let err = repo
            .update_status(order.id, OrderStatus::Cancelled)
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn list_covers_both_sides_newest_first() {
        let fx = setup().await;
        let repo = OrderRepository::new(fx.db.pool.clone());

        let first = repo
            .create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();
        let second = repo
            .create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();

        let as_customer = repo.list_for_user(fx.customer).await.unwrap();
        let as_business = repo.list_for_user(fx.business).await.unwrap();
        assert_eq!(as_customer.len(), 2);
        assert_eq!(as_business.len(), 2);
        if second.created_at > first.created_at {
            assert_eq!(as_customer[0].id, second.id);
        }

        let outsider = seed_user(&fx.db.pool, "other", Role::Customer).await;
        assert!(repo.list_for_user(outsider.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn business_order_counts() {
        let fx = setup().await;
        let repo = OrderRepository::new(fx.db.pool.clone());

        let a = repo
            .create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();
        repo.create_from_detail(fx.customer, fx.basic_detail)
            .await
            .unwrap();
        repo.update_status(a.id, OrderStatus::Completed).await.unwrap();

        assert_eq!(repo.count_in_progress(fx.business).await.unwrap(), 1);
        assert_eq!(repo.count_completed(fx.business).await.unwrap(), 1);
        assert_eq!(repo.count_in_progress(fx.customer).await.unwrap(), 0);
    }
}
