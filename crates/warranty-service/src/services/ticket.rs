//! Support ticket service
//!
//! Ticket creation, customer and admin replies, and the message-driven
//! status machine with its reopen grace window.

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use warranty_core::traits::{
    NewAttachment, NewTicket, NewTicketMessage, TicketStatusChange,
};
use warranty_core::{CustomerReplyGate, DomainError, SenderKind, TicketPriority, TicketStatus};

use crate::dto::{
    CreateTicketRequest, MessageCreatedResponse, TicketCreatedResponse, TicketDetailResponse,
    TicketMessageRequest, TicketSummaryResponse, UpdateTicketStatusRequest,
    UpdateTicketTagsRequest, UploadedFile,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Support ticket service
pub struct TicketService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> TicketService<'a> {
    /// Create a new TicketService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Open a ticket with its first message. Requires the customer to own
    /// at least one product registration.
    #[instrument(skip(self, request), fields(user_id = %user_id))]
    pub async fn create(
        &self,
        user_id: Uuid,
        request: CreateTicketRequest,
    ) -> ServiceResult<TicketCreatedResponse> {
        let has_product = self
            .ctx
            .registration_repo()
            .exists_for_user(user_id)
            .await?;
        if !has_product {
            return Err(DomainError::NoRegisteredProduct.into());
        }

        let ticket_id = Uuid::new_v4();
        self.ctx
            .ticket_repo()
            .create_with_message(
                &NewTicket {
                    id: ticket_id,
                    user_id,
                    subject: request.subject,
                    priority: TicketPriority::default(),
                },
                &NewTicketMessage {
                    id: Uuid::new_v4(),
                    sender: SenderKind::Customer,
                    sender_id: user_id,
                    body: request.body,
                },
            )
            .await?;

        info!(ticket_id = %ticket_id, "Support ticket created");

        Ok(TicketCreatedResponse { ticket_id })
    }

    /// All tickets of the requesting customer, most recently active first
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Uuid) -> ServiceResult<Vec<TicketSummaryResponse>> {
        let overviews = self.ctx.ticket_repo().list_for_user(user_id).await?;
        Ok(overviews.into_iter().map(TicketSummaryResponse::from).collect())
    }

    /// One ticket of the requesting customer, with its full thread
    #[instrument(skip(self))]
    pub async fn get_mine(&self, user_id: Uuid, id: Uuid) -> ServiceResult<TicketDetailResponse> {
        let ticket = self
            .ctx
            .ticket_repo()
            .find_owned(id, user_id)
            .await?
            .ok_or(DomainError::TicketNotFound(id))?;

        let thread = self.ctx.ticket_repo().thread(id).await?;
        Ok(TicketDetailResponse::from_parts(ticket, thread))
    }

    /// Customer reply. Closed tickets reject replies outright; resolved
    /// tickets past the grace window are permanently closed; a resolved
    /// ticket within the window reopens.
    #[instrument(skip(self, request, files), fields(user_id = %user_id, ticket_id = %id))]
    pub async fn customer_reply(
        &self,
        user_id: Uuid,
        id: Uuid,
        request: TicketMessageRequest,
        files: Vec<UploadedFile>,
    ) -> ServiceResult<MessageCreatedResponse> {
        let ticket = self
            .ctx
            .ticket_repo()
            .find_owned(id, user_id)
            .await?
            .ok_or(DomainError::TicketNotFound(id))?;

        let gate =
            ticket.customer_reply_gate(Utc::now(), self.ctx.policies().ticket.reopen_grace_days);
        let status_change = match gate {
            CustomerReplyGate::Allowed => None,
            CustomerReplyGate::Reopens => Some(TicketStatusChange {
                status: TicketStatus::Open,
                closed_at: None,
            }),
            CustomerReplyGate::TicketClosed => return Err(DomainError::TicketClosed.into()),
            CustomerReplyGate::GraceWindowExpired => {
                return Err(DomainError::TicketReopenWindowExpired.into())
            }
        };

        let attachments = self.store_attachments(&files).await?;

        let message_id = Uuid::new_v4();
        self.ctx
            .ticket_repo()
            .append_message(
                id,
                &NewTicketMessage {
                    id: message_id,
                    sender: SenderKind::Customer,
                    sender_id: user_id,
                    body: request.body,
                },
                &attachments,
                status_change,
            )
            .await?;

        if matches!(gate, CustomerReplyGate::Reopens) {
            info!("Resolved ticket reopened by customer reply");
        }

        Ok(MessageCreatedResponse { message_id })
    }

    /// Admin reply; an open ticket auto-advances to in-progress
    #[instrument(skip(self, request), fields(admin_id = %admin_id, ticket_id = %id))]
    pub async fn admin_reply(
        &self,
        admin_id: Uuid,
        id: Uuid,
        request: TicketMessageRequest,
    ) -> ServiceResult<MessageCreatedResponse> {
        let ticket = self
            .ctx
            .ticket_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TicketNotFound(id))?;

        let status_change = (ticket.status == TicketStatus::Open).then_some(TicketStatusChange {
            status: TicketStatus::InProgress,
            closed_at: None,
        });

        let message_id = Uuid::new_v4();
        self.ctx
            .ticket_repo()
            .append_message(
                id,
                &NewTicketMessage {
                    id: message_id,
                    sender: SenderKind::Admin,
                    sender_id: admin_id,
                    body: request.body,
                },
                &[],
                status_change,
            )
            .await?;

        Ok(MessageCreatedResponse { message_id })
    }

    /// Admin status update. Resolved and closed stamp the closed
    /// timestamp; every other status clears it.
    #[instrument(skip(self, request), fields(ticket_id = %id))]
    pub async fn update_status(
        &self,
        id: Uuid,
        request: UpdateTicketStatusRequest,
    ) -> ServiceResult<()> {
        self.ctx
            .ticket_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TicketNotFound(id))?;

        let closed_at = request.status.stamps_closed_at().then(Utc::now);
        self.ctx
            .ticket_repo()
            .update_status(
                id,
                TicketStatusChange {
                    status: request.status,
                    closed_at,
                },
            )
            .await?;

        info!(status = %request.status, "Ticket status updated");
        Ok(())
    }

    /// Replace a ticket's tag list
    #[instrument(skip(self, request), fields(ticket_id = %id))]
    pub async fn update_tags(
        &self,
        id: Uuid,
        request: UpdateTicketTagsRequest,
    ) -> ServiceResult<()> {
        self.ctx
            .ticket_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TicketNotFound(id))?;

        self.ctx.ticket_repo().update_tags(id, &request.tags).await?;
        Ok(())
    }

    /// Store reply attachments and build their rows
    async fn store_attachments(
        &self,
        files: &[UploadedFile],
    ) -> ServiceResult<Vec<NewAttachment>> {
        let mut attachments = Vec::with_capacity(files.len());

        for file in files {
            let storage_path = self
                .ctx
                .file_store()
                .store(&file.original_filename, &file.bytes)
                .await?;

            attachments.push(NewAttachment {
                id: Uuid::new_v4(),
                original_filename: file.original_filename.clone(),
                storage_path,
                mime_type: file.mime_type.clone(),
                file_size: file.bytes.len() as i64,
            });
        }

        Ok(attachments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{
        seed_model, seed_registration, seed_source, seed_ticket, seed_user, test_harness,
        upload_files,
    };
    use chrono::Duration;
    use warranty_core::RegistrationStatus;

    fn create_request() -> CreateTicketRequest {
        CreateTicketRequest {
            subject: "Mattress sagging".to_string(),
            body: "It started sagging after six months of use.".to_string(),
        }
    }

    fn reply_request() -> TicketMessageRequest {
        TicketMessageRequest {
            body: "Here is more detail.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_requires_a_registered_product() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let err = service.create(user.id, create_request()).await.unwrap_err();
        assert_eq!(err.error_code(), "NO_REGISTERED_PRODUCT");
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_create_opens_ticket_with_first_message() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let model = seed_model(&harness.db, 12, None);
        let source = seed_source(&harness.db);
        seed_registration(
            &harness.db,
            user.id,
            &model,
            &source,
            RegistrationStatus::PendingReview,
        );

        let response = service.create(user.id, create_request()).await.unwrap();

        let ticket = harness
            .db
            .tickets
            .lock()
            .unwrap()
            .get(&response.ticket_id)
            .cloned()
            .unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);

        let detail = service.get_mine(user.id, response.ticket_id).await.unwrap();
        assert_eq!(detail.messages.len(), 1);
        assert_eq!(detail.messages[0].sender, SenderKind::Customer);
    }

    #[tokio::test]
    async fn test_admin_reply_advances_open_ticket() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let admin = seed_user(&harness.db, "admin@example.com");
        let id = seed_ticket(&harness.db, user.id, TicketStatus::Open, None);

        service.admin_reply(admin.id, id, reply_request()).await.unwrap();

        let ticket = harness.db.tickets.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(ticket.status, TicketStatus::InProgress);
    }

    #[tokio::test]
    async fn test_admin_reply_leaves_resolved_status_alone() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let admin = seed_user(&harness.db, "admin@example.com");
        let closed_at = Some(Utc::now());
        let id = seed_ticket(&harness.db, user.id, TicketStatus::Resolved, closed_at);

        service.admin_reply(admin.id, id, reply_request()).await.unwrap();

        let ticket = harness.db.tickets.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(ticket.status, TicketStatus::Resolved);
        assert!(ticket.closed_at.is_some());
    }

    #[tokio::test]
    async fn test_customer_reply_on_closed_ticket_fails() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let id = seed_ticket(&harness.db, user.id, TicketStatus::Closed, Some(Utc::now()));

        let err = service
            .customer_reply(user.id, id, reply_request(), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TICKET_CLOSED");
    }

    #[tokio::test]
    async fn test_customer_reply_past_grace_window_fails() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let closed_at = Some(Utc::now() - Duration::days(31));
        let id = seed_ticket(&harness.db, user.id, TicketStatus::Resolved, closed_at);

        let err = service
            .customer_reply(user.id, id, reply_request(), Vec::new())
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "TICKET_REOPEN_WINDOW_EXPIRED");
    }

    #[tokio::test]
    async fn test_customer_reply_within_grace_window_reopens() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let closed_at = Some(Utc::now() - Duration::days(29));
        let id = seed_ticket(&harness.db, user.id, TicketStatus::Resolved, closed_at);

        service
            .customer_reply(user.id, id, reply_request(), upload_files())
            .await
            .unwrap();

        let ticket = harness.db.tickets.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.closed_at.is_none());

        // The reply's attachments were stored with the message
        assert_eq!(harness.db.attachments.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_status_update_stamps_and_clears_closed_at() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let id = seed_ticket(&harness.db, user.id, TicketStatus::InProgress, None);

        service
            .update_status(
                id,
                UpdateTicketStatusRequest {
                    status: TicketStatus::Resolved,
                },
            )
            .await
            .unwrap();
        let ticket = harness.db.tickets.lock().unwrap().get(&id).cloned().unwrap();
        assert!(ticket.closed_at.is_some());

        service
            .update_status(
                id,
                UpdateTicketStatusRequest {
                    status: TicketStatus::Open,
                },
            )
            .await
            .unwrap();
        let ticket = harness.db.tickets.lock().unwrap().get(&id).cloned().unwrap();
        assert!(ticket.closed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_tags_replaces_list() {
        let harness = test_harness();
        let service = TicketService::new(&harness.ctx);

        let user = seed_user(&harness.db, "a@example.com");
        let id = seed_ticket(&harness.db, user.id, TicketStatus::Open, None);

        service
            .update_tags(
                id,
                UpdateTicketTagsRequest {
                    tags: vec!["delivery".to_string(), "damage".to_string()],
                },
            )
            .await
            .unwrap();

        let ticket = harness.db.tickets.lock().unwrap().get(&id).cloned().unwrap();
        assert_eq!(ticket.tags, vec!["delivery", "damage"]);
    }
}
