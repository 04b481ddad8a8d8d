//! PostgreSQL-backed user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use smartsales_application::{NewUserAccount, UserRepository};
use smartsales_core::{AppError, AppResult, UserRole};
use smartsales_domain::UserAccount;

use crate::postgres_support::{conflict_or_internal, internal};

/// PostgreSQL implementation of the user repository port.
#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    phone: Option<String>,
    address: Option<String>,
    role: String,
    joined_at: DateTime<Utc>,
    active: bool,
}

impl TryFrom<UserRow> for UserAccount {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            username: row.username,
            email: row.email,
            phone: row.phone,
            address: row.address,
            role: row.role.parse()?,
            joined_at: row.joined_at,
            active: row.active,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_token_hash(&self, token_hash: &str) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, phone, address, role, joined_at, active
            FROM users
            WHERE token_hash = $1 AND active
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find user by token"))?
        .map(UserAccount::try_from)
        .transpose()
    }

    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<UserAccount>> {
        sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, phone, address, role, joined_at, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("find user by id"))?
        .map(UserAccount::try_from)
        .transpose()
    }

    async fn list_users(&self, role: Option<UserRole>) -> AppResult<Vec<UserAccount>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, phone, address, role, joined_at, active
            FROM users
            WHERE ($1::TEXT IS NULL OR role = $1)
            ORDER BY username
            "#,
        )
        .bind(role.map(|role| role.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(internal("list users"))?;

        rows.into_iter().map(UserAccount::try_from).collect()
    }

    async fn has_administrator(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (SELECT 1 FROM users WHERE role = 'administrador')
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(internal("check for administrators"))
    }

    async fn create_user(&self, input: NewUserAccount) -> AppResult<UserAccount> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, phone, address, role, token_hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, username, email, phone, address, role, joined_at, active
            "#,
        )
        .bind(input.username.as_str())
        .bind(input.email.as_str())
        .bind(input.phone.as_deref())
        .bind(input.address.as_deref())
        .bind(input.role.as_str())
        .bind(input.token_hash.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            conflict_or_internal(
                error,
                &format!("el usuario '{}' ya existe", input.username),
                "create user",
            )
        })?;

        UserAccount::try_from(row)
    }

    async fn update_role(&self, user_id: i64, role: UserRole) -> AppResult<UserAccount> {
        sqlx::query_as::<_, UserRow>(
            r#"
            UPDATE users
            SET role = $2
            WHERE id = $1
            RETURNING id, username, email, phone, address, role, joined_at, active
            "#,
        )
        .bind(user_id)
        .bind(role.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(internal("update user role"))?
        .ok_or_else(|| AppError::NotFound(format!("usuario {user_id} no encontrado")))
        .and_then(UserAccount::try_from)
    }

    async fn delete_user(&self, user_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(internal("delete user"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("usuario {user_id} no encontrado")));
        }

        Ok(())
    }
}
