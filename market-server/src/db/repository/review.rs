//! Review repository
//!
//! One review per (business account, reviewer) pair. The pair is unique in
//! storage, so the duplicate check cannot be raced; callers see it as a
//! [`RepoError::Duplicate`].

use super::{RepoError, RepoResult};
use shared::models::{RATING_MAX, RATING_MIN, Review, ReviewCreate, ReviewUpdate, Role};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

/// Ordering options for the review list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrdering {
    UpdatedAt,
    #[default]
    UpdatedAtDesc,
    Rating,
    RatingDesc,
}

impl ReviewOrdering {
    fn sql(&self) -> &'static str {
        match self {
            ReviewOrdering::UpdatedAt => "updated_at ASC",
            ReviewOrdering::UpdatedAtDesc => "updated_at DESC",
            ReviewOrdering::Rating => "rating ASC",
            ReviewOrdering::RatingDesc => "rating DESC",
        }
    }
}

/// Filters for the review list
#[derive(Debug, Clone, Default)]
pub struct ReviewFilter {
    pub business_user_id: Option<i64>,
    pub reviewer_id: Option<i64>,
    pub ordering: ReviewOrdering,
}

#[derive(Clone)]
pub struct ReviewRepository {
    pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Review>> {
        let review = sqlx::query_as::<_, Review>("SELECT * FROM review WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(review)
    }

    pub async fn list(&self, filter: &ReviewFilter) -> RepoResult<Vec<Review>> {
        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT * FROM review WHERE 1=1");
        if let Some(business) = filter.business_user_id {
            qb.push(" AND business_user_id = ").push_bind(business);
        }
        if let Some(reviewer) = filter.reviewer_id {
            qb.push(" AND reviewer_id = ").push_bind(reviewer);
        }
        qb.push(format!(" ORDER BY {}", filter.ordering.sql()));

        let reviews = qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(reviews)
    }

    /// Create a review; the target must be an existing business account
    pub async fn create(&self, reviewer_id: i64, data: ReviewCreate) -> RepoResult<Review> {
        check_rating(data.rating)?;

        let target_role: Option<Role> =
            sqlx::query_scalar("SELECT role FROM user_account WHERE id = ?1")
                .bind(data.business_user_id)
                .fetch_optional(&self.pool)
                .await?;
        if target_role != Some(Role::Business) {
            return Err(RepoError::Validation(
                "Reviews can only target business accounts".into(),
            ));
        }

        let id = snowflake_id();
        let now = now_millis();

        let result = sqlx::query(
            "INSERT INTO review \
             (id, business_user_id, reviewer_id, rating, description, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        )
        .bind(id)
        .bind(data.business_user_id)
        .bind(reviewer_id)
        .bind(data.rating)
        .bind(&data.description)
        .bind(now)
        .execute(&self.pool)
        .await;

        if let Err(e) = result {
            return Err(match RepoError::from(e) {
                RepoError::Duplicate(_) => RepoError::Duplicate(
                    "You have already reviewed this business".into(),
                ),
                other => other,
            });
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create review".into()))
    }

    /// Update rating and/or description
    pub async fn update(&self, id: i64, data: ReviewUpdate) -> RepoResult<Review> {
        if let Some(rating) = data.rating {
            check_rating(rating)?;
        }

        let result = sqlx::query(
            "UPDATE review SET \
             rating = COALESCE(?1, rating), \
             description = COALESCE(?2, description), \
             updated_at = ?3 \
             WHERE id = ?4",
        )
        .bind(data.rating)
        .bind(&data.description)
        .bind(now_millis())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("review {id}")));
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("review {id}")))
    }

    pub async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM review WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn check_rating(rating: i64) -> RepoResult<()> {
    if !(RATING_MIN..=RATING_MAX).contains(&rating) {
        return Err(RepoError::Validation(format!(
            "Rating must be between {RATING_MIN} and {RATING_MAX}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::user::test_support::seed_user;

    async fn setup() -> (DbService, i64, i64) {
        let db = DbService::in_memory().await.unwrap();
        let business = seed_user(&db.pool, "studio", Role::Business).await;
        let customer = seed_user(&db.pool, "buyer", Role::Customer).await;
        (db, business.id, customer.id)
    }

    fn payload(business: i64, rating: i64) -> ReviewCreate {
        ReviewCreate {
            business_user_id: business,
            rating,
            description: "Great work".to_string(),
        }
    }

    #[tokio::test]
    async fn create_and_fetch() {
        let (db, business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let review = repo.create(customer, payload(business, 4)).await.unwrap();
        assert_eq!(review.business_user_id, business);
        assert_eq!(review.reviewer_id, customer);
        assert_eq!(review.rating, 4);

        let found = repo.find_by_id(review.id).await.unwrap().unwrap();
        assert_eq!(found.description, "Great work");
    }

    #[tokio::test]
    async fn second_review_for_same_business_is_rejected() {
        let (db, business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());

        repo.create(customer, payload(business, 4)).await.unwrap();
        let err = repo.create(customer, payload(business, 5)).await.unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));

        // a different reviewer can still review the same business
        let other = seed_user(&db.pool, "other", Role::Customer).await;
        repo.create(other.id, payload(business, 5)).await.unwrap();
    }

    #[tokio::test]
    async fn rating_bounds_are_enforced() {
        let (db, business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());

        for rating in [0, 6, -1] {
            let err = repo.create(customer, payload(business, rating)).await.unwrap_err();
            assert!(matches!(err, RepoError::Validation(_)));
        }

        let review = repo.create(customer, payload(business, 3)).await.unwrap();
        let err = repo
            .update(review.id, ReviewUpdate { rating: Some(0), description: None })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn target_must_be_business() {
        let (db, _business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let other_customer = seed_user(&db.pool, "peer", Role::Customer).await;
        let err = repo
            .create(customer, payload(other_customer.id, 4))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let err = repo.create(customer, payload(987654, 4)).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[tokio::test]
    async fn list_filters_and_orders() {
        let (db, business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());
        let second_business = seed_user(&db.pool, "agency", Role::Business).await;

        repo.create(customer, payload(business, 2)).await.unwrap();
        repo.create(customer, payload(second_business.id, 5)).await.unwrap();

        let for_business = repo
            .list(&ReviewFilter {
                business_user_id: Some(business),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(for_business.len(), 1);
        assert_eq!(for_business[0].rating, 2);

        let by_reviewer = repo
            .list(&ReviewFilter {
                reviewer_id: Some(customer),
                ordering: ReviewOrdering::RatingDesc,
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_reviewer.len(), 2);
        assert_eq!(by_reviewer[0].rating, 5);
    }

    #[tokio::test]
    async fn update_bumps_updated_at_and_merges() {
        let (db, business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let review = repo.create(customer, payload(business, 3)).await.unwrap();
        let updated = repo
            .update(
                review.id,
                ReviewUpdate {
                    rating: Some(5),
                    description: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.rating, 5);
        assert_eq!(updated.description, "Great work");
        assert!(updated.updated_at >= review.updated_at);
    }

    #[tokio::test]
    async fn delete_review() {
        let (db, business, customer) = setup().await;
        let repo = ReviewRepository::new(db.pool.clone());

        let review = repo.create(customer, payload(business, 3)).await.unwrap();
        assert!(repo.delete(review.id).await.unwrap());
        assert!(!repo.delete(review.id).await.unwrap());
        assert!(repo.find_by_id(review.id).await.unwrap().is_none());
    }
}
