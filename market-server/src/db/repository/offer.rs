//! Offer repository
//!
//! Owns offers and their three pricing tiers. Creation is atomic (one offer
//! row plus exactly three detail rows in a single transaction) and list
//! queries compute the min-price / min-delivery aggregates in SQL.

use super::{RepoError, RepoResult};
use shared::models::{
    DetailRef, Offer, OfferCreate, OfferDetail, OfferItem, OfferStatus, OfferType, OfferUpdate,
    Paginated, UserPublic,
};
use shared::util::{now_millis, snowflake_id};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::collections::{BTreeSet, HashMap};

/// Ordering options for the offer list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfferOrdering {
    UpdatedAt,
    #[default]
    UpdatedAtDesc,
    MinPrice,
    MinPriceDesc,
}

impl OfferOrdering {
    fn sql(&self) -> &'static str {
        match self {
            OfferOrdering::UpdatedAt => "o.updated_at ASC",
            OfferOrdering::UpdatedAtDesc => "o.updated_at DESC",
            OfferOrdering::MinPrice => "agg.min_price ASC",
            OfferOrdering::MinPriceDesc => "agg.min_price DESC",
        }
    }
}

/// Filters and pagination for the offer list
#[derive(Debug, Clone, Default)]
pub struct OfferFilter {
    /// Exact owner match
    pub creator_id: Option<i64>,
    /// Minimum of the per-offer min tier price, in cents
    pub min_price: Option<i64>,
    /// Maximum of the per-offer min delivery time, in days
    pub max_delivery_time: Option<i64>,
    /// Free-text search over title and description
    pub search: Option<String>,
    pub ordering: OfferOrdering,
    /// 1-based page number
    pub page: i64,
    pub page_size: i64,
}

/// Offer row joined with its tier aggregates
#[derive(Debug, sqlx::FromRow)]
struct OfferAggRow {
    id: i64,
    user_id: i64,
    title: String,
    image: Option<String>,
    description: String,
    status: OfferStatus,
    created_at: i64,
    updated_at: i64,
    min_price: Option<i64>,
    min_delivery_time: Option<i64>,
}

impl OfferAggRow {
    fn into_item(self, details: Vec<DetailRef>, user_details: Option<UserPublic>) -> OfferItem {
        OfferItem {
            id: self.id,
            user: self.user_id,
            title: self.title,
            image: self.image,
            description: self.description,
            status: self.status,
            created_at: self.created_at,
            updated_at: self.updated_at,
            details,
            min_price: self.min_price,
            min_delivery_time: self.min_delivery_time,
            user_details,
        }
    }
}

const AGG_JOIN: &str = "LEFT JOIN (SELECT offer_id, MIN(price) AS min_price, \
     MIN(delivery_time_in_days) AS min_delivery_time \
     FROM offer_detail GROUP BY offer_id) agg ON agg.offer_id = o.id";

#[derive(Clone)]
pub struct OfferRepository {
    pool: SqlitePool,
}

impl OfferRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OfferFilter) {
        qb.push(" WHERE 1=1");
        if let Some(creator) = filter.creator_id {
            qb.push(" AND o.user_id = ").push_bind(creator);
        }
        if let Some(min_price) = filter.min_price {
            qb.push(" AND agg.min_price >= ").push_bind(min_price);
        }
        if let Some(max_delivery) = filter.max_delivery_time {
            qb.push(" AND agg.min_delivery_time <= ").push_bind(max_delivery);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{search}%");
            qb.push(" AND (o.title LIKE ")
                .push_bind(pattern.clone())
                .push(" OR o.description LIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// List offers with aggregates, nested detail refs and owner info
    pub async fn list(&self, filter: &OfferFilter) -> RepoResult<Paginated<OfferItem>> {
        let mut count_qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT COUNT(*) FROM offer o {AGG_JOIN}"));
        Self::push_filters(&mut count_qb, filter);
        let count: i64 = count_qb.build_query_scalar().fetch_one(&self.pool).await?;

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(format!(
            "SELECT o.id, o.user_id, o.title, o.image, o.description, o.status, \
             o.created_at, o.updated_at, agg.min_price, agg.min_delivery_time \
             FROM offer o {AGG_JOIN}"
        ));
        Self::push_filters(&mut qb, filter);
        qb.push(format!(" ORDER BY {}", filter.ordering.sql()));
        let page = filter.page.max(1);
        qb.push(" LIMIT ")
            .push_bind(filter.page_size)
            .push(" OFFSET ")
            .push_bind((page - 1) * filter.page_size);

        let rows: Vec<OfferAggRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        let mut detail_refs = self
            .detail_refs_for(rows.iter().map(|r| r.id).collect())
            .await?;
        let owners = self
            .owners_for(rows.iter().map(|r| r.user_id).collect())
            .await?;

        let results = rows
            .into_iter()
            .map(|row| {
                let details = detail_refs.remove(&row.id).unwrap_or_default();
                let owner = owners.get(&row.user_id).cloned();
                row.into_item(details, owner)
            })
            .collect();

        Ok(Paginated { count, results })
    }

    async fn detail_refs_for(
        &self,
        offer_ids: Vec<i64>,
    ) -> RepoResult<HashMap<i64, Vec<DetailRef>>> {
        let mut map: HashMap<i64, Vec<DetailRef>> = HashMap::new();
        if offer_ids.is_empty() {
            return Ok(map);
        }

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new("SELECT id, offer_id FROM offer_detail WHERE offer_id IN (");
        let mut separated = qb.separated(", ");
        for id in &offer_ids {
            separated.push_bind(*id);
        }
        qb.push(") ORDER BY id");

        let rows: Vec<(i64, i64)> = qb.build_query_as().fetch_all(&self.pool).await?;
        for (id, offer_id) in rows {
            map.entry(offer_id).or_default().push(DetailRef::new(id));
        }
        Ok(map)
    }

    async fn owners_for(&self, user_ids: Vec<i64>) -> RepoResult<HashMap<i64, UserPublic>> {
        let mut map = HashMap::new();
        let unique: BTreeSet<i64> = user_ids.into_iter().collect();
        if unique.is_empty() {
            return Ok(map);
        }

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(
            "SELECT id, first_name, last_name, username FROM user_account WHERE id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in &unique {
            separated.push_bind(*id);
        }
        qb.push(")");

        let rows: Vec<(i64, String, String, String)> =
            qb.build_query_as().fetch_all(&self.pool).await?;
        for (id, first_name, last_name, username) in rows {
            map.insert(
                id,
                UserPublic {
                    first_name,
                    last_name,
                    username,
                },
            );
        }
        Ok(map)
    }

    /// Create an offer with its three tiers, atomically
    pub async fn create(&self, user_id: i64, data: OfferCreate) -> RepoResult<OfferItem> {
        if data.details.len() != 3 {
            return Err(RepoError::Validation(
                "Exactly three offer details must be provided".into(),
            ));
        }
        let types: BTreeSet<OfferType> = data.details.iter().map(|d| d.offer_type).collect();
        if types != BTreeSet::from(OfferType::ALL) {
            return Err(RepoError::Validation(
                "Offer details must include one each of basic, standard, and premium".into(),
            ));
        }
        for detail in &data.details {
            if detail.features.is_empty() {
                return Err(RepoError::Validation(
                    "Each offer detail must have at least one feature".into(),
                ));
            }
        }

        let id = snowflake_id();
        let now = now_millis();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO offer (id, user_id, title, image, description, status, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, 'in_progress', ?6, ?6)",
        )
        .bind(id)
        .bind(user_id)
        .bind(&data.title)
        .bind(&data.image)
        .bind(&data.description)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for detail in &data.details {
            sqlx::query(
                "INSERT INTO offer_detail \
                 (id, offer_id, title, revisions, delivery_time_in_days, price, features, offer_type) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(snowflake_id())
            .bind(id)
            .bind(&detail.title)
            .bind(detail.revisions)
            .bind(detail.delivery_time_in_days)
            .bind(detail.price)
            .bind(sqlx::types::Json(&detail.features))
            .bind(detail.offer_type)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        self.find_item(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create offer".into()))
    }

    /// Plain offer row, used for ownership checks
    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<Offer>> {
        let offer = sqlx::query_as::<_, Offer>("SELECT * FROM offer WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(offer)
    }

    /// Full offer representation with detail refs and aggregates
    pub async fn find_item(&self, id: i64) -> RepoResult<Option<OfferItem>> {
        let row: Option<OfferAggRow> = sqlx::query_as(&format!(
            "SELECT o.id, o.user_id, o.title, o.image, o.description, o.status, \
             o.created_at, o.updated_at, agg.min_price, agg.min_delivery_time \
             FROM offer o {AGG_JOIN} WHERE o.id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut refs = self.detail_refs_for(vec![row.id]).await?;
        let details = refs.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_item(details, None)))
    }

    /// Apply a partial update; tier entries merge into stored rows by
    /// offer_type and can never add or remove tiers
    pub async fn update(&self, id: i64, data: OfferUpdate) -> RepoResult<OfferItem> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE offer SET \
             title = COALESCE(?1, title), \
             image = COALESCE(?2, image), \
             description = COALESCE(?3, description), \
             status = COALESCE(?4, status), \
             updated_at = ?5 \
             WHERE id = ?6",
        )
        .bind(&data.title)
        .bind(&data.image)
        .bind(&data.description)
        .bind(data.status)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(RepoError::NotFound(format!("offer {id}")));
        }

        if let Some(details) = &data.details {
            for detail in details {
                // no row matches an unknown type; the entry is silently ignored
                sqlx::query(
                    "UPDATE offer_detail SET \
                     title = COALESCE(?1, title), \
                     revisions = COALESCE(?2, revisions), \
                     delivery_time_in_days = COALESCE(?3, delivery_time_in_days), \
                     price = COALESCE(?4, price), \
                     features = COALESCE(?5, features) \
                     WHERE offer_id = ?6 AND offer_type = ?7",
                )
                .bind(&detail.title)
                .bind(detail.revisions)
                .bind(detail.delivery_time_in_days)
                .bind(detail.price)
                .bind(detail.features.as_ref().map(sqlx::types::Json))
                .bind(id)
                .bind(detail.offer_type)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        self.find_item(id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("offer {id}")))
    }

    /// Delete an offer; detail rows cascade
    pub async fn delete(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM offer WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// One tier with all fields
    pub async fn find_detail(&self, detail_id: i64) -> RepoResult<Option<OfferDetail>> {
        let detail = sqlx::query_as::<_, OfferDetail>("SELECT * FROM offer_detail WHERE id = ?1")
            .bind(detail_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(detail)
    }

    /// All tiers of one offer
    pub async fn details_of(&self, offer_id: i64) -> RepoResult<Vec<OfferDetail>> {
        let details = sqlx::query_as::<_, OfferDetail>(
            "SELECT * FROM offer_detail WHERE offer_id = ?1 ORDER BY id",
        )
        .bind(offer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(details)
    }
}
