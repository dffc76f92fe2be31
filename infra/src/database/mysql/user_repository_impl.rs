//! MySQL implementation of the UserRepository trait.
//!
//! Users, roles and the user-role link live in three tables. Provisioning
//! runs in one transaction and relies on the unique index on
//! `users.mobile_number` to settle concurrent first logins. Listing pages
//! over users first and joins roles onto that page only.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};

use otp_core::domain::entities::user::{User, DEFAULT_ROLE};
use otp_core::domain::value_objects::{UserPage, UserQuery};
use otp_core::errors::{AuthError, DomainError, DomainResult, InfraError};
use otp_core::repositories::UserRepository;
use otp_shared::phone::mask_mobile_number;

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Fold user/role join rows, ordered by user id, into users
    fn rows_to_users(rows: &[MySqlRow]) -> DomainResult<Vec<User>> {
        let mut users: Vec<User> = Vec::new();
        for row in rows {
            let id: i64 = row.try_get("id").map_err(db_error)?;
            if users.last().map_or(true, |user| user.id != id) {
                users.push(User {
                    id,
                    mobile_number: row.try_get("mobile_number").map_err(db_error)?,
                    enabled: row.try_get("enabled").map_err(db_error)?,
                    registered_at: row.try_get::<DateTime<Utc>, _>("registered_at").map_err(db_error)?,
                    roles: Vec::new(),
                });
            }
            if let Some(role) = row.try_get::<Option<String>, _>("role_name").map_err(db_error)? {
                if let Some(user) = users.last_mut() {
                    user.roles.push(role);
                }
            }
        }
        Ok(users)
    }
}

/// LIKE pattern for a digits-only prefix; `%` alone matches every number
fn prefix_pattern(query: &UserQuery) -> String {
    format!("{}%", query.mobile_prefix.as_deref().unwrap_or(""))
}

fn db_error(e: sqlx::Error) -> DomainError {
    InfraError::Database {
        message: e.to_string(),
    }
    .into()
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error().is_some_and(|db| db.is_unique_violation())
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn exists_by_mobile(&self, mobile_number: &str) -> DomainResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM users WHERE mobile_number = ?)")
            .bind(mobile_number)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(exists)
    }

    async fn find_by_mobile(&self, mobile_number: &str) -> DomainResult<Option<User>> {
        let query = r#"
            SELECT u.id, u.mobile_number, u.enabled, u.registered_at, r.name AS role_name
            FROM users u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            WHERE u.mobile_number = ?
            ORDER BY r.name
        "#;

        let rows = sqlx::query(query)
            .bind(mobile_number)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(Self::rows_to_users(&rows)?.into_iter().next())
    }

    async fn list_users(&self, query: &UserQuery) -> DomainResult<UserPage> {
        let pattern = prefix_pattern(query);

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE mobile_number LIKE ?")
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        let page_query = r#"
            SELECT u.id, u.mobile_number, u.enabled, u.registered_at, r.name AS role_name
            FROM (
                SELECT id, mobile_number, enabled, registered_at
                FROM users
                WHERE mobile_number LIKE ?
                ORDER BY id
                LIMIT ? OFFSET ?
            ) u
            LEFT JOIN user_roles ur ON ur.user_id = u.id
            LEFT JOIN roles r ON r.id = ur.role_id
            ORDER BY u.id, r.name
        "#;

        let rows = sqlx::query(page_query)
            .bind(&pattern)
            .bind(query.limit())
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        let users = Self::rows_to_users(&rows)?;
        Ok(UserPage::new(users, u64::try_from(total).unwrap_or(0), query))
    }

    async fn create_with_default_role(
        &self,
        mobile_number: &str,
        registered_at: DateTime<Utc>,
    ) -> DomainResult<User> {
        // Dropping the transaction on any early return rolls it back
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        let role_id: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE name = ?")
            .bind(DEFAULT_ROLE)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;
        let role_id = role_id.ok_or_else(|| AuthError::IdentityProvisioningFailure {
            reason: format!("role '{}' is missing", DEFAULT_ROLE),
        })?;

        let inserted = sqlx::query("INSERT INTO users (mobile_number, enabled, registered_at) VALUES (?, TRUE, ?)")
            .bind(mobile_number)
            .bind(registered_at)
            .execute(&mut *tx)
            .await;
        let user_id = match inserted {
            Ok(result) => result.last_insert_id() as i64,
            Err(e) if is_unique_violation(&e) => {
                tracing::debug!(
                    phone = %mask_mobile_number(mobile_number),
                    "User row already exists"
                );
                return Err(AuthError::UserAlreadyExists.into());
            }
            Err(e) => return Err(db_error(e)),
        };

        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AuthError::IdentityProvisioningFailure {
                reason: format!("role assignment failed: {}", e),
            })?;

        tx.commit().await.map_err(db_error)?;

        Ok(User {
            id: user_id,
            mobile_number: mobile_number.to_string(),
            enabled: true,
            registered_at,
            roles: vec![DEFAULT_ROLE.to_string()],
        })
    }
}
