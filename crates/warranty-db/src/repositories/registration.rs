//! PostgreSQL implementation of RegistrationRepository
//!
//! Submission, add-photos, and review are multi-row mutations and run as
//! single transactions: a failure partway leaves no partial state.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use warranty_core::traits::{
    DuplicateHashGroup, MonthlyRegistrationCount, NewNote, NewPhoto, NewRegistration, NewWarranty,
    PhotoHashHit, RegistrationFilter, RegistrationOverview, RegistrationRepository, RepoResult,
    ReviewUpdate, WarrantyTransition,
};
use warranty_core::{AdminNote, ProductRegistration, RegistrationStatus, WarrantyStatus};

use crate::models::{AdminNoteModel, RegistrationModel, REGISTRATION_COLUMNS};

use super::error::{map_db_error, registration_not_found};
use super::overview::{assemble_overviews, load_registration_overviews_for_user};

/// PostgreSQL implementation of RegistrationRepository
#[derive(Clone)]
pub struct PgRegistrationRepository {
    pool: PgPool,
}

impl PgRegistrationRepository {
    /// Create a new PgRegistrationRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Push the WHERE clauses for an admin list filter. The user join is
    /// aliased `u`, the registration table `r`.
    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RegistrationFilter) {
        if let Some(status) = filter.status {
            builder.push(" AND r.registration_status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(model_id) = filter.model_id {
            builder.push(" AND r.mattress_model_id = ");
            builder.push_bind(model_id);
        }
        if let Some(source_id) = filter.source_id {
            builder.push(" AND r.purchase_source_id = ");
            builder.push_bind(source_id);
        }
        if let Some(from) = filter.purchased_from {
            builder.push(" AND r.purchase_date >= ");
            builder.push_bind(from);
        }
        if let Some(to) = filter.purchased_to {
            builder.push(" AND r.purchase_date <= ");
            builder.push_bind(to);
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{search}%");
            builder.push(" AND (u.email ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.phone LIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.first_name ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.last_name ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }
}

#[async_trait]
impl RegistrationRepository for PgRegistrationRepository {
    #[instrument(skip(self, registration, warranty, photos))]
    async fn create(
        &self,
        registration: &NewRegistration,
        warranty: &NewWarranty,
        photos: &[NewPhoto],
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO product_registrations
                (id, user_id, mattress_model_id, purchase_source_id, purchase_date,
                 received_undamaged, info_accurate, registration_status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            ",
        )
        .bind(registration.id)
        .bind(registration.user_id)
        .bind(registration.model_id)
        .bind(registration.source_id)
        .bind(registration.purchase_date)
        .bind(registration.received_undamaged)
        .bind(registration.info_accurate)
        .bind(RegistrationStatus::PendingReview.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO warranties
                (id, product_registration_id, status, start_date, end_date, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ",
        )
        .bind(warranty.id)
        .bind(registration.id)
        .bind(WarrantyStatus::Pending.as_str())
        .bind(warranty.start_date)
        .bind(warranty.end_date)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for photo in photos {
            sqlx::query(
                r"
                INSERT INTO registration_photos
                    (id, product_registration_id, photo_type, original_filename, storage_path,
                     mime_type, file_size, sha256_hash, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
                ",
            )
            .bind(photo.id)
            .bind(registration.id)
            .bind(photo.kind.as_str())
            .bind(&photo.original_filename)
            .bind(&photo.storage_path)
            .bind(&photo.mime_type)
            .bind(photo.file_size)
            .bind(&photo.sha256_hash)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProductRegistration>> {
        let result = sqlx::query_as::<_, RegistrationModel>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM product_registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ProductRegistration::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<ProductRegistration>> {
        let result = sqlx::query_as::<_, RegistrationModel>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM product_registrations \
             WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ProductRegistration::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn exists_for_user(&self, user_id: Uuid) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM product_registrations WHERE user_id = $1)",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<RegistrationOverview>> {
        load_registration_overviews_for_user(&self.pool, user_id).await
    }

    #[instrument(skip(self))]
    async fn overview(&self, id: Uuid) -> RepoResult<Option<RegistrationOverview>> {
        let row = sqlx::query_as::<_, RegistrationModel>(&format!(
            "SELECT {REGISTRATION_COLUMNS} FROM product_registrations WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(assemble_overviews(&self.pool, vec![row]).await?.pop())
    }

    #[instrument(skip(self, filter))]
    async fn list_filtered(
        &self,
        filter: &RegistrationFilter,
    ) -> RepoResult<(Vec<RegistrationOverview>, i64)> {
        let offset = (filter.page - 1) * filter.limit;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM product_registrations r \
             JOIN users u ON u.id = r.user_id WHERE TRUE",
            REGISTRATION_COLUMNS
                .split(", ")
                .map(|c| format!("r.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        Self::push_filter(&mut builder, filter);
        builder.push(" ORDER BY r.created_at DESC LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<RegistrationModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut count_builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM product_registrations r \
             JOIN users u ON u.id = r.user_id WHERE TRUE",
        );
        Self::push_filter(&mut count_builder, filter);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let overviews = assemble_overviews(&self.pool, rows).await?;
        Ok((overviews, total))
    }

    #[instrument(skip(self, sha256_hash))]
    async fn find_photos_by_hash(&self, sha256_hash: &str) -> RepoResult<Vec<PhotoHashHit>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid)>(
            "SELECT id, product_registration_id FROM registration_photos WHERE sha256_hash = $1",
        )
        .bind(sha256_hash)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(photo_id, registration_id)| PhotoHashHit {
                photo_id,
                registration_id,
            })
            .collect())
    }

    #[instrument(skip(self, photos))]
    async fn add_photos(
        &self,
        id: Uuid,
        photos: &[NewPhoto],
        revert_to_pending: bool,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        for photo in photos {
            sqlx::query(
                r"
                INSERT INTO registration_photos
                    (id, product_registration_id, photo_type, original_filename, storage_path,
                     mime_type, file_size, sha256_hash, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
                ",
            )
            .bind(photo.id)
            .bind(id)
            .bind(photo.kind.as_str())
            .bind(&photo.original_filename)
            .bind(&photo.storage_path)
            .bind(&photo.mime_type)
            .bind(photo.file_size)
            .bind(&photo.sha256_hash)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        if revert_to_pending {
            let result = sqlx::query(
                "UPDATE product_registrations \
                 SET registration_status = $2, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(RegistrationStatus::PendingReview.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

            if result.rows_affected() == 0 {
                return Err(registration_not_found(id));
            }
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn apply_review(&self, id: Uuid, update: &ReviewUpdate) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r"
            UPDATE product_registrations
            SET registration_status = $2, rejection_reason = $3, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .bind(update.status.as_str())
        .bind(&update.rejection_reason)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(registration_not_found(id));
        }

        match update.warranty {
            Some(WarrantyTransition::Activate { activated_at }) => {
                sqlx::query(
                    "UPDATE warranties SET status = $2, activated_at = $3 \
                     WHERE product_registration_id = $1",
                )
                .bind(id)
                .bind(WarrantyStatus::Active.as_str())
                .bind(activated_at)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
            Some(WarrantyTransition::Void) => {
                sqlx::query(
                    "UPDATE warranties SET status = $2 WHERE product_registration_id = $1",
                )
                .bind(id)
                .bind(WarrantyStatus::Voided.as_str())
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?;
            }
            None => {}
        }

        if let Some(ref note) = update.note {
            sqlx::query(
                r"
                INSERT INTO admin_notes (id, product_registration_id, admin_id, content, created_at)
                VALUES ($1, $2, $3, $4, NOW())
                ",
            )
            .bind(note.id)
            .bind(id)
            .bind(note.admin_id)
            .bind(&note.content)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_notes(&self, id: Uuid) -> RepoResult<Vec<AdminNote>> {
        let rows = sqlx::query_as::<_, AdminNoteModel>(
            "SELECT id, product_registration_id, admin_id, content, created_at \
             FROM admin_notes WHERE product_registration_id = $1 ORDER BY created_at DESC",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(AdminNote::from).collect())
    }

    #[instrument(skip(self, note))]
    async fn add_note(&self, id: Uuid, note: &NewNote) -> RepoResult<AdminNote> {
        let row = sqlx::query_as::<_, AdminNoteModel>(
            r"
            INSERT INTO admin_notes (id, product_registration_id, admin_id, content, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, product_registration_id, admin_id, content, created_at
            ",
        )
        .bind(note.id)
        .bind(id)
        .bind(note.admin_id)
        .bind(&note.content)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(AdminNote::from(row))
    }

    #[instrument(skip(self))]
    async fn duplicate_hash_report(&self, limit: i64) -> RepoResult<Vec<DuplicateHashGroup>> {
        let rows = sqlx::query_as::<_, (String, i64, Vec<Uuid>)>(
            r"
            SELECT sha256_hash,
                   COUNT(DISTINCT product_registration_id) AS registration_count,
                   ARRAY_AGG(DISTINCT product_registration_id) AS registration_ids
            FROM registration_photos
            GROUP BY sha256_hash
            HAVING COUNT(DISTINCT product_registration_id) > 1
            ORDER BY registration_count DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(
                |(sha256_hash, registration_count, registration_ids)| DuplicateHashGroup {
                    sha256_hash,
                    registration_count,
                    registration_ids,
                },
            )
            .collect())
    }

    #[instrument(skip(self))]
    async fn monthly_counts(&self, months_back: i32) -> RepoResult<Vec<MonthlyRegistrationCount>> {
        let rows = sqlx::query_as::<_, (chrono::DateTime<chrono::Utc>, i64)>(
            r"
            SELECT DATE_TRUNC('month', created_at) AS month, COUNT(*) AS count
            FROM product_registrations
            WHERE created_at >= NOW() - make_interval(months => $1)
            GROUP BY DATE_TRUNC('month', created_at)
            ORDER BY month DESC
            ",
        )
        .bind(months_back)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows
            .into_iter()
            .map(|(month, count)| MonthlyRegistrationCount { month, count })
            .collect())
    }

    #[instrument(skip(self))]
    async fn count_all(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM product_registrations")
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn count_by_status(&self, status: RegistrationStatus) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM product_registrations WHERE registration_status = $1",
        )
        .bind(status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
