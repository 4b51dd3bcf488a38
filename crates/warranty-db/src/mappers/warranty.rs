//! Warranty entity <-> model mapper

use warranty_core::{DomainError, Warranty, WarrantyStatus};

use crate::models::WarrantyModel;

use super::invalid_enum;

impl TryFrom<WarrantyModel> for Warranty {
    type Error = DomainError;

    fn try_from(model: WarrantyModel) -> Result<Self, Self::Error> {
        let status = WarrantyStatus::parse(&model.status)
            .ok_or_else(|| invalid_enum("status", &model.status))?;

        Ok(Warranty {
            id: model.id,
            registration_id: model.product_registration_id,
            status,
            start_date: model.start_date,
            end_date: model.end_date,
            activated_at: model.activated_at,
            created_at: model.created_at,
        })
    }
}
