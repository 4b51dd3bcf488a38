//! Ticket entity <-> model mappers

use warranty_core::{
    DomainError, SenderKind, SupportTicket, TicketAttachment, TicketMessage, TicketPriority,
    TicketStatus,
};

use crate::models::{TicketAttachmentModel, TicketMessageModel, TicketModel};

use super::invalid_enum;

impl TryFrom<TicketModel> for SupportTicket {
    type Error = DomainError;

    fn try_from(model: TicketModel) -> Result<Self, Self::Error> {
        let status = TicketStatus::parse(&model.status)
            .ok_or_else(|| invalid_enum("status", &model.status))?;
        let priority = TicketPriority::parse(&model.priority)
            .ok_or_else(|| invalid_enum("priority", &model.priority))?;

        Ok(SupportTicket {
            id: model.id,
            user_id: model.user_id,
            subject: model.subject,
            status,
            priority,
            tags: model.tags,
            closed_at: model.closed_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

impl TryFrom<TicketMessageModel> for TicketMessage {
    type Error = DomainError;

    fn try_from(model: TicketMessageModel) -> Result<Self, Self::Error> {
        let sender = SenderKind::parse(&model.sender_type)
            .ok_or_else(|| invalid_enum("sender_type", &model.sender_type))?;

        Ok(TicketMessage {
            id: model.id,
            ticket_id: model.ticket_id,
            sender,
            sender_id: model.sender_id,
            body: model.body,
            created_at: model.created_at,
        })
    }
}

impl From<TicketAttachmentModel> for TicketAttachment {
    fn from(model: TicketAttachmentModel) -> Self {
        TicketAttachment {
            id: model.id,
            message_id: model.message_id,
            original_filename: model.original_filename,
            storage_path: model.storage_path,
            mime_type: model.mime_type,
            file_size: model.file_size,
            created_at: model.created_at,
        }
    }
}
