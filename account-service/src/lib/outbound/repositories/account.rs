use std::str::FromStr;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::models::Account;
use crate::account::models::AccountId;
use crate::account::models::DisplayName;
use crate::account::models::EmailAddress;
use crate::account::models::Role;
use crate::account::ports::AccountRepository;

const ACCOUNT_COLUMNS: &str = "id, name, slug, email, password_hash, role, active, \
     password_changed_at, reset_code_digest, reset_code_expires_at, reset_verified, created_at";

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &PgRow) -> Result<Account, AccountError> {
    let id: Uuid = row
        .try_get("id")
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;
    let slug: String = row
        .try_get("slug")
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

    Ok(Account {
        id: AccountId(id),
        name: DisplayName::new(name)?,
        slug,
        email: EmailAddress::new(email)?,
        password_hash: row
            .try_get("password_hash")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
        role: Role::from_str(&role)?,
        active: row
            .try_get("active")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
        password_changed_at: row
            .try_get("password_changed_at")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
        reset_code_digest: row
            .try_get("reset_code_digest")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
        reset_code_expires_at: row
            .try_get("reset_code_expires_at")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
        reset_verified: row
            .try_get("reset_verified")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
        created_at: row
            .try_get("created_at")
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?,
    })
}

fn map_write_error(e: sqlx::Error) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AccountError::EmailAlreadyExists;
        }
    }
    AccountError::DatabaseError(e.to_string())
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create(&self, account: Account) -> Result<Account, AccountError> {
        sqlx::query(
            "INSERT INTO accounts \
             (id, name, slug, email, password_hash, role, active, \
              password_changed_at, reset_code_digest, reset_code_expires_at, \
              reset_verified, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(account.id.0)
        .bind(account.name.as_str())
        .bind(&account.slug)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.active)
        .bind(account.password_changed_at)
        .bind(&account.reset_code_digest)
        .bind(account.reset_code_expires_at)
        .bind(account.reset_verified)
        .bind(account.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(account)
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts WHERE email = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn find_by_reset_digest(
        &self,
        digest: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<Account>, AccountError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM accounts \
             WHERE reset_code_digest = $1 AND reset_code_expires_at > $2",
            ACCOUNT_COLUMNS
        ))
        .bind(digest)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        row.as_ref().map(row_to_account).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Account>, AccountError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM accounts ORDER BY created_at DESC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        rows.iter().map(row_to_account).collect()
    }

    async fn update(&self, account: Account) -> Result<Account, AccountError> {
        let result = sqlx::query(
            "UPDATE accounts \
             SET name = $2, slug = $3, email = $4, password_hash = $5, role = $6, \
                 active = $7, password_changed_at = $8, reset_code_digest = $9, \
                 reset_code_expires_at = $10, reset_verified = $11 \
             WHERE id = $1",
        )
        .bind(account.id.0)
        .bind(account.name.as_str())
        .bind(&account.slug)
        .bind(account.email.as_str())
        .bind(&account.password_hash)
        .bind(account.role.as_str())
        .bind(account.active)
        .bind(account.password_changed_at)
        .bind(&account.reset_code_digest)
        .bind(account.reset_code_expires_at)
        .bind(account.reset_verified)
        .execute(&self.pool)
        .await
        .map_err(map_write_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(account.id.to_string()));
        }

        Ok(account)
    }

    async fn delete(&self, id: &AccountId) -> Result<(), AccountError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
