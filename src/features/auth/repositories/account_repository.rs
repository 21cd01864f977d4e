use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::auth::models::{Account, NewAccount};

/// Identity store
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>>;

    /// Lookup by normalized (trimmed, lowercased) email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Insert the account together with its empty profile.
    /// Fails with `Conflict` when the email is taken.
    async fn create_with_profile(&self, account: NewAccount) -> Result<Account>;

    /// Give an existing account the admin role and a new password hash
    async fn promote_to_admin(&self, id: Uuid, password_hash: &str) -> Result<()>;
}

pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountRepository for PgAccountRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, course, created_at, updated_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, name, email, password_hash, role, course, created_at, updated_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn create_with_profile(&self, account: NewAccount) -> Result<Account> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, name, email, password_hash, role, course)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, name, email, password_hash, role, course, created_at, updated_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&account.name)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(account.role)
        .bind(&account.course)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Email already registered".to_string())
            } else {
                AppError::Database(e)
            }
        })?;

        sqlx::query(
            r#"
            INSERT INTO student_profiles (id, account_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(created.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Account created: id={}, role={}",
            created.id, created.role
        );

        Ok(created)
    }

    async fn promote_to_admin(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET role = 'admin', password_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Account {} not found", id)));
        }

        Ok(())
    }
}
