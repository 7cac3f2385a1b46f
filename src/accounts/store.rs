use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::accounts::model::{Account, NewAccount};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateEmail,
            _ => StoreError::Other(err.into()),
        }
    }
}

impl From<StoreError> for crate::error::AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => crate::error::AppError::DuplicateEmail,
            StoreError::Other(e) => crate::error::AppError::Internal(e),
        }
    }
}

/// Injected into every handler through `AppState`; swapped for an in-memory
/// fake in tests.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    /// Matches token equality AND an unexpired `reset_token_expiry`. An
    /// expired token behaves exactly like no match.
    async fn find_by_active_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Account>, StoreError>;

    /// Uniqueness is enforced by the store itself (unique index), not by a
    /// check-then-insert in the caller.
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError>;

    /// Persists all mutable fields of an existing record in one write.
    async fn save(&self, account: &Account) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, fullname, email, password_hash, school,
                   reset_token, reset_token_expiry, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn find_by_active_reset_token(
        &self,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, fullname, email, password_hash, school,
                   reset_token, reset_token_expiry, created_at
            FROM accounts
            WHERE reset_token = $1 AND reset_token_expiry > $2
            "#,
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (fullname, email, password_hash, school)
            VALUES ($1, $2, $3, $4)
            RETURNING id, fullname, email, password_hash, school,
                      reset_token, reset_token_expiry, created_at
            "#,
        )
        .bind(&new.fullname)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.school)
        .fetch_one(&self.db)
        .await?;
        Ok(account)
    }

    async fn save(&self, account: &Account) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, reset_token = $3, reset_token_expiry = $4
            WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(&account.password_hash)
        .bind(&account.reset_token)
        .bind(&account.reset_token_expiry)
        .execute(&self.db)
        .await?;
        Ok(())
    }
}
