//! Catalog entity <-> model mappers

use warranty_core::{DomainError, MattressModel, PurchaseSource, SourceType};

use crate::models::{MattressModelModel, PurchaseSourceModel};

use super::invalid_enum;

impl TryFrom<MattressModelModel> for MattressModel {
    type Error = DomainError;

    fn try_from(model: MattressModelModel) -> Result<Self, Self::Error> {
        let warranty_months = u32::try_from(model.warranty_months).map_err(|_| {
            DomainError::DatabaseError(format!(
                "Negative warranty_months in row: {}",
                model.warranty_months
            ))
        })?;

        Ok(MattressModel {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            warranty_months,
            released_at: model.released_at,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}

impl TryFrom<PurchaseSourceModel> for PurchaseSource {
    type Error = DomainError;

    fn try_from(model: PurchaseSourceModel) -> Result<Self, Self::Error> {
        let source_type = SourceType::parse(&model.source_type)
            .ok_or_else(|| invalid_enum("source_type", &model.source_type))?;

        Ok(PurchaseSource {
            id: model.id,
            name: model.name,
            source_type,
            is_active: model.is_active,
            created_at: model.created_at,
        })
    }
}
