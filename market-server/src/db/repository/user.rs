//! Account repository
//!
//! The identity directory the rest of the backend resolves callers and
//! review targets against.

use super::{RepoError, RepoResult};
use shared::models::{Role, UserAccount};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

/// Create account payload
#[derive(Debug, Clone)]
pub struct UserCreate {
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub role: Role,
    pub is_staff: bool,
}

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id(&self, id: i64) -> RepoResult<Option<UserAccount>> {
        let user = sqlx::query_as::<_, UserAccount>("SELECT * FROM user_account WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_username(&self, username: &str) -> RepoResult<Option<UserAccount>> {
        let user =
            sqlx::query_as::<_, UserAccount>("SELECT * FROM user_account WHERE username = ?1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    pub async fn create(&self, data: UserCreate) -> RepoResult<UserAccount> {
        let id = snowflake_id();
        let now = now_millis();

        let result = sqlx::query(
            "INSERT INTO user_account \
             (id, username, first_name, last_name, email, password_hash, role, is_staff, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(id)
        .bind(&data.username)
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(data.role)
        .bind(data.is_staff)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) => {
                return Err(match RepoError::from(e) {
                    RepoError::Duplicate(_) => {
                        RepoError::Duplicate(format!("username {}", data.username))
                    }
                    other => other,
                });
            }
        }

        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepoError::Database("Failed to create account".into()))
    }

    /// Promote an account to staff (admin tooling, not exposed over HTTP)
    pub async fn set_staff(&self, id: i64, is_staff: bool) -> RepoResult<()> {
        sqlx::query("UPDATE user_account SET is_staff = ?1 WHERE id = ?2")
            .bind(is_staff)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
pub mod test_support {
    use super::*;

    /// Insert a user directly, for repository tests
    pub async fn seed_user(pool: &SqlitePool, username: &str, role: Role) -> UserAccount {
        seed_user_full(pool, username, role, false).await
    }

    pub async fn seed_user_full(
        pool: &SqlitePool,
        username: &str,
        role: Role,
        is_staff: bool,
    ) -> UserAccount {
        UserRepository::new(pool.clone())
            .create(UserCreate {
                username: username.to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: format!("{username}@example.com"),
                password_hash: "unused".to_string(),
                role,
                is_staff,
            })
            .await
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn create_and_find_account() {
        let db = DbService::in_memory().await.unwrap();
        let repo = UserRepository::new(db.pool.clone());

        let user = seed_user(&db.pool, "anna", Role::Business).await;
        assert_eq!(user.role, Role::Business);
        assert!(!user.is_staff);

        let found = repo.find_by_username("anna").await.unwrap().unwrap();
        assert_eq!(found.id, user.id);

        assert!(repo.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let db = DbService::in_memory().await.unwrap();

        seed_user(&db.pool, "bob", Role::Customer).await;
        let repo = UserRepository::new(db.pool.clone());
        let err = repo
            .create(UserCreate {
                username: "bob".to_string(),
                first_name: String::new(),
                last_name: String::new(),
                email: String::new(),
                password_hash: "x".to_string(),
                role: Role::Business,
                is_staff: false,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Duplicate(_)));
    }
}
