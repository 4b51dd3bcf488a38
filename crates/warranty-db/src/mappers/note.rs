//! Admin note entity <-> model mapper

use warranty_core::AdminNote;

use crate::models::AdminNoteModel;

impl From<AdminNoteModel> for AdminNote {
    fn from(model: AdminNoteModel) -> Self {
        AdminNote {
            id: model.id,
            registration_id: model.product_registration_id,
            admin_id: model.admin_id,
            content: model.content,
            created_at: model.created_at,
        }
    }
}
