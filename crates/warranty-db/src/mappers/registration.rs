//! Registration entity <-> model mappers

use warranty_core::{
    DomainError, PhotoKind, ProductRegistration, RegistrationPhoto, RegistrationStatus,
};

use crate::models::{RegistrationModel, RegistrationPhotoModel};

use super::invalid_enum;

impl TryFrom<RegistrationModel> for ProductRegistration {
    type Error = DomainError;

    fn try_from(model: RegistrationModel) -> Result<Self, Self::Error> {
        let status = RegistrationStatus::parse(&model.registration_status)
            .ok_or_else(|| invalid_enum("registration_status", &model.registration_status))?;

        Ok(ProductRegistration {
            id: model.id,
            user_id: model.user_id,
            model_id: model.mattress_model_id,
            source_id: model.purchase_source_id,
            purchase_date: model.purchase_date,
            received_undamaged: model.received_undamaged,
            info_accurate: model.info_accurate,
            status,
            rejection_reason: model.rejection_reason,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<RegistrationPhotoModel> for RegistrationPhoto {
    type Error = DomainError;

    fn try_from(model: RegistrationPhotoModel) -> Result<Self, Self::Error> {
        let kind = PhotoKind::parse(&model.photo_type)
            .ok_or_else(|| invalid_enum("photo_type", &model.photo_type))?;

        Ok(RegistrationPhoto {
            id: model.id,
            registration_id: model.product_registration_id,
            kind,
            original_filename: model.original_filename,
            storage_path: model.storage_path,
            mime_type: model.mime_type,
            file_size: model.file_size,
            sha256_hash: model.sha256_hash,
            created_at: model.created_at,
        })
    }
}
