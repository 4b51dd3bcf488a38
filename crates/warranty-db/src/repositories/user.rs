//! PostgreSQL implementation of UserRepository

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use warranty_core::traits::{CustomerOverview, CustomerSummary, RepoResult, UserRepository};
use warranty_core::{DomainError, SupportTicket, User};

use crate::models::{TicketModel, UserModel, TICKET_COLUMNS, USER_COLUMNS};

use super::error::{map_db_error, map_unique_violation, user_not_found};
use super::overview::load_registration_overviews_for_user;

/// Customer row joined with activity counts
#[derive(Debug, FromRow)]
struct CustomerRow {
    #[sqlx(flatten)]
    user: UserModel,
    registration_count: i64,
    ticket_count: i64,
}

/// PostgreSQL implementation of UserRepository
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self, identifier))]
    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users \
             WHERE (email = $1 OR phone = $1) AND deleted_at IS NULL"
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(User::try_from).transpose()
    }

    #[instrument(skip(self, email, phone))]
    async fn identifier_exists(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE (email = $1 AND $1 IS NOT NULL)
                   OR (phone = $2 AND $2 IS NOT NULL)
            )
            ",
        )
        .bind(email)
        .bind(phone)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, email))]
    async fn email_taken(&self, email: &str, excluding: Uuid) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
        )
        .bind(email)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, phone))]
    async fn phone_taken(&self, phone: &str, excluding: Uuid) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1 AND id <> $2)",
        )
        .bind(phone)
        .bind(excluding)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, user, password_hash))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, email, phone, password_hash, first_name, last_name, role,
                               is_verified, consent_at, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(user.is_verified)
        .bind(user.consent_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::IdentifierTaken))?;

        Ok(())
    }

    #[instrument(skip(self, user))]
    async fn update_profile(&self, user: &User) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE users
            SET email = $2, phone = $3, first_name = $4, last_name = $5, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            ",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailInUse))?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(user.id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_verified(&self, id: Uuid) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: Uuid) -> RepoResult<Option<String>> {
        let result = sqlx::query_scalar::<_, String>(
            "SELECT password_hash FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self, password_hash))]
    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(user_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn activity_counts(&self, id: Uuid) -> RepoResult<(i64, i64)> {
        let result = sqlx::query_as::<_, (i64, i64)>(
            r"
            SELECT
                (SELECT COUNT(*) FROM product_registrations WHERE user_id = $1),
                (SELECT COUNT(*) FROM support_tickets WHERE user_id = $1)
            ",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn count_customers(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE role = 'CUSTOMER' AND deleted_at IS NULL",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_customers(
        &self,
        page: i64,
        limit: i64,
    ) -> RepoResult<(Vec<CustomerSummary>, i64)> {
        let offset = (page - 1) * limit;

        let rows = sqlx::query_as::<_, CustomerRow>(&format!(
            "SELECT {USER_COLUMNS}, \
             (SELECT COUNT(*) FROM product_registrations pr WHERE pr.user_id = users.id) \
                 AS registration_count, \
             (SELECT COUNT(*) FROM support_tickets st WHERE st.user_id = users.id) \
                 AS ticket_count \
             FROM users \
             WHERE role = 'CUSTOMER' AND deleted_at IS NULL \
             ORDER BY created_at DESC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let total = self.count_customers().await?;

        let summaries = rows
            .into_iter()
            .map(|row| {
                Ok(CustomerSummary {
                    user: User::try_from(row.user)?,
                    registration_count: row.registration_count,
                    ticket_count: row.ticket_count,
                })
            })
            .collect::<RepoResult<Vec<_>>>()?;

        Ok((summaries, total))
    }

    #[instrument(skip(self))]
    async fn customer_overview(&self, id: Uuid) -> RepoResult<Option<CustomerOverview>> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let registrations = load_registration_overviews_for_user(&self.pool, id).await?;

        let tickets = sqlx::query_as::<_, TicketModel>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets \
             WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .map(SupportTicket::try_from)
        .collect::<RepoResult<Vec<_>>>()?;

        Ok(Some(CustomerOverview {
            user,
            registrations,
            tickets,
        }))
    }
}
