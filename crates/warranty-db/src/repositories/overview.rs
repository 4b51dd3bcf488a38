//! Shared assembly of registration overviews
//!
//! List and detail views join a registration with its user, catalog
//! entries, warranty, photos, and note count. The page of registration
//! rows is fetched first; the joined pieces are batch-loaded by id and
//! stitched together here.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use warranty_core::traits::{RegistrationOverview, RepoResult};
use warranty_core::{
    MattressModel, ProductRegistration, PurchaseSource, RegistrationPhoto, User, Warranty,
};

use crate::models::{
    MattressModelModel, PurchaseSourceModel, RegistrationModel, RegistrationPhotoModel, UserModel,
    WarrantyModel, REGISTRATION_COLUMNS, USER_COLUMNS,
};

use super::error::map_db_error;

/// Load and assemble overviews for all registrations of one user,
/// newest first.
pub(crate) async fn load_registration_overviews_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> RepoResult<Vec<RegistrationOverview>> {
    let rows = sqlx::query_as::<_, RegistrationModel>(&format!(
        "SELECT {REGISTRATION_COLUMNS} FROM product_registrations \
         WHERE user_id = $1 ORDER BY created_at DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;

    assemble_overviews(pool, rows).await
}

/// Batch-load the joined pieces for a page of registration rows and
/// assemble them in the given order.
pub(crate) async fn assemble_overviews(
    pool: &PgPool,
    rows: Vec<RegistrationModel>,
) -> RepoResult<Vec<RegistrationOverview>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let registration_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let user_ids: Vec<Uuid> = rows.iter().map(|r| r.user_id).collect();
    let model_ids: Vec<Uuid> = rows.iter().map(|r| r.mattress_model_id).collect();
    let source_ids: Vec<Uuid> = rows.iter().map(|r| r.purchase_source_id).collect();

    let users: HashMap<Uuid, User> = sqlx::query_as::<_, UserModel>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
    ))
    .bind(&user_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?
    .into_iter()
    .map(|m| User::try_from(m).map(|u| (u.id, u)))
    .collect::<Result<_, _>>()?;

    let models: HashMap<Uuid, MattressModel> = sqlx::query_as::<_, MattressModelModel>(
        "SELECT id, name, slug, description, warranty_months, released_at, is_active, created_at \
         FROM mattress_models WHERE id = ANY($1)",
    )
    .bind(&model_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?
    .into_iter()
    .map(|m| MattressModel::try_from(m).map(|m| (m.id, m)))
    .collect::<Result<_, _>>()?;

    let sources: HashMap<Uuid, PurchaseSource> = sqlx::query_as::<_, PurchaseSourceModel>(
        "SELECT id, name, source_type, is_active, created_at \
         FROM purchase_sources WHERE id = ANY($1)",
    )
    .bind(&source_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?
    .into_iter()
    .map(|m| PurchaseSource::try_from(m).map(|s| (s.id, s)))
    .collect::<Result<_, _>>()?;

    let warranties: HashMap<Uuid, Warranty> = sqlx::query_as::<_, WarrantyModel>(
        "SELECT id, product_registration_id, status, start_date, end_date, activated_at, created_at \
         FROM warranties WHERE product_registration_id = ANY($1)",
    )
    .bind(&registration_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?
    .into_iter()
    .map(|m| Warranty::try_from(m).map(|w| (w.registration_id, w)))
    .collect::<Result<_, _>>()?;

    let mut photos: HashMap<Uuid, Vec<RegistrationPhoto>> = HashMap::new();
    let photo_rows = sqlx::query_as::<_, RegistrationPhotoModel>(
        "SELECT id, product_registration_id, photo_type, original_filename, storage_path, \
                mime_type, file_size, sha256_hash, created_at \
         FROM registration_photos WHERE product_registration_id = ANY($1) \
         ORDER BY created_at ASC",
    )
    .bind(&registration_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?;
    for row in photo_rows {
        let photo = RegistrationPhoto::try_from(row)?;
        photos.entry(photo.registration_id).or_default().push(photo);
    }

    let note_counts: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
        "SELECT product_registration_id, COUNT(*) FROM admin_notes \
         WHERE product_registration_id = ANY($1) GROUP BY product_registration_id",
    )
    .bind(&registration_ids)
    .fetch_all(pool)
    .await
    .map_err(map_db_error)?
    .into_iter()
    .collect();

    rows.into_iter()
        .map(|row| {
            let registration = ProductRegistration::try_from(row)?;
            let user = users.get(&registration.user_id).cloned().ok_or_else(|| {
                warranty_core::DomainError::DatabaseError(format!(
                    "Registration {} references missing user",
                    registration.id
                ))
            })?;
            let model = models.get(&registration.model_id).cloned().ok_or_else(|| {
                warranty_core::DomainError::DatabaseError(format!(
                    "Registration {} references missing model",
                    registration.id
                ))
            })?;
            let source = sources.get(&registration.source_id).cloned().ok_or_else(|| {
                warranty_core::DomainError::DatabaseError(format!(
                    "Registration {} references missing source",
                    registration.id
                ))
            })?;

            Ok(RegistrationOverview {
                warranty: warranties.get(&registration.id).cloned(),
                photos: photos.remove(&registration.id).unwrap_or_default(),
                note_count: note_counts.get(&registration.id).copied().unwrap_or(0),
                model_name: model.name,
                model_slug: model.slug,
                warranty_months: model.warranty_months,
                source_name: source.name,
                source_type: source.source_type,
                user,
                registration,
            })
        })
        .collect()
}
