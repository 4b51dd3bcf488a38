//! PostgreSQL implementation of TicketRepository
//!
//! Creating a ticket with its first message and appending a reply with an
//! accompanying status change run as single transactions.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;
use uuid::Uuid;

use warranty_core::traits::{
    NewAttachment, NewTicket, NewTicketMessage, RepoResult, TicketFilter, TicketOverview,
    TicketRepository, TicketStatusChange, TicketThreadEntry,
};
use warranty_core::{SupportTicket, TicketAttachment, TicketMessage, TicketStatus, User};

use crate::models::{
    TicketAttachmentModel, TicketMessageModel, TicketModel, UserModel, TICKET_COLUMNS,
    USER_COLUMNS,
};

use super::error::{map_db_error, ticket_not_found};

const MESSAGE_COLUMNS: &str = "id, ticket_id, sender_type, sender_id, body, created_at";
const ATTACHMENT_COLUMNS: &str =
    "id, message_id, original_filename, storage_path, mime_type, file_size, created_at";

/// PostgreSQL implementation of TicketRepository
#[derive(Clone)]
pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    /// Create a new PgTicketRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Push the WHERE clauses for an admin list filter. The user join is
    /// aliased `u`, the ticket table `t`.
    fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TicketFilter) {
        if let Some(status) = filter.status {
            builder.push(" AND t.status = ");
            builder.push_bind(status.as_str());
        }
        if let Some(priority) = filter.priority {
            builder.push(" AND t.priority = ");
            builder.push_bind(priority.as_str());
        }
        if let Some(ref tag) = filter.tag {
            builder.push(" AND ");
            builder.push_bind(tag.clone());
            builder.push(" = ANY(t.tags)");
        }
        if let Some(ref search) = filter.search {
            let pattern = format!("%{search}%");
            builder.push(" AND (t.subject ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.email ILIKE ");
            builder.push_bind(pattern.clone());
            builder.push(" OR u.first_name ILIKE ");
            builder.push_bind(pattern);
            builder.push(")");
        }
    }

    /// Batch-load users, message counts, and latest messages for a page of
    /// ticket rows and assemble overviews in the given order.
    async fn assemble_overviews(
        &self,
        rows: Vec<TicketModel>,
    ) -> RepoResult<Vec<TicketOverview>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ticket_ids: Vec<Uuid> = rows.iter().map(|t| t.id).collect();
        let user_ids: Vec<Uuid> = rows.iter().map(|t| t.user_id).collect();

        let users: HashMap<Uuid, User> = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(&user_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .map(|m| User::try_from(m).map(|u| (u.id, u)))
        .collect::<Result<_, _>>()?;

        let message_counts: HashMap<Uuid, i64> = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT ticket_id, COUNT(*) FROM ticket_messages \
             WHERE ticket_id = ANY($1) GROUP BY ticket_id",
        )
        .bind(&ticket_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?
        .into_iter()
        .collect();

        let mut last_messages: HashMap<Uuid, TicketMessage> = HashMap::new();
        let latest_rows = sqlx::query_as::<_, TicketMessageModel>(&format!(
            "SELECT DISTINCT ON (ticket_id) {MESSAGE_COLUMNS} FROM ticket_messages \
             WHERE ticket_id = ANY($1) ORDER BY ticket_id, created_at DESC"
        ))
        .bind(&ticket_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        for row in latest_rows {
            let message = TicketMessage::try_from(row)?;
            last_messages.insert(message.ticket_id, message);
        }

        rows.into_iter()
            .map(|row| {
                let ticket = SupportTicket::try_from(row)?;
                let user = users.get(&ticket.user_id).cloned().ok_or_else(|| {
                    warranty_core::DomainError::DatabaseError(format!(
                        "Ticket {} references missing user",
                        ticket.id
                    ))
                })?;

                Ok(TicketOverview {
                    message_count: message_counts.get(&ticket.id).copied().unwrap_or(0),
                    last_message: last_messages.remove(&ticket.id),
                    user,
                    ticket,
                })
            })
            .collect()
    }
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    #[instrument(skip(self, ticket, message))]
    async fn create_with_message(
        &self,
        ticket: &NewTicket,
        message: &NewTicketMessage,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO support_tickets
                (id, user_id, subject, status, priority, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, '{}', NOW(), NOW())
            ",
        )
        .bind(ticket.id)
        .bind(ticket.user_id)
        .bind(&ticket.subject)
        .bind(TicketStatus::Open.as_str())
        .bind(ticket.priority.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO ticket_messages (id, ticket_id, sender_type, sender_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ",
        )
        .bind(message.id)
        .bind(ticket.id)
        .bind(message.sender.as_str())
        .bind(message.sender_id)
        .bind(&message.body)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<SupportTicket>> {
        let result = sqlx::query_as::<_, TicketModel>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(SupportTicket::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> RepoResult<Option<SupportTicket>> {
        let result = sqlx::query_as::<_, TicketModel>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets WHERE id = $1 AND user_id = $2"
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(SupportTicket::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<TicketOverview>> {
        let rows = sqlx::query_as::<_, TicketModel>(&format!(
            "SELECT {TICKET_COLUMNS} FROM support_tickets \
             WHERE user_id = $1 ORDER BY updated_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        self.assemble_overviews(rows).await
    }

    #[instrument(skip(self, filter))]
    async fn list_filtered(
        &self,
        filter: &TicketFilter,
    ) -> RepoResult<(Vec<TicketOverview>, i64)> {
        let offset = (filter.page - 1) * filter.limit;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM support_tickets t \
             JOIN users u ON u.id = t.user_id WHERE TRUE",
            TICKET_COLUMNS
                .split(", ")
                .map(|c| format!("t.{c}"))
                .collect::<Vec<_>>()
                .join(", ")
        ));
        Self::push_filter(&mut builder, filter);
        builder.push(" ORDER BY t.updated_at DESC LIMIT ");
        builder.push_bind(filter.limit);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder
            .build_query_as::<TicketModel>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;

        let mut count_builder = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM support_tickets t JOIN users u ON u.id = t.user_id WHERE TRUE",
        );
        Self::push_filter(&mut count_builder, filter);

        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;

        let overviews = self.assemble_overviews(rows).await?;
        Ok((overviews, total))
    }

    #[instrument(skip(self))]
    async fn thread(&self, id: Uuid) -> RepoResult<Vec<TicketThreadEntry>> {
        let message_rows = sqlx::query_as::<_, TicketMessageModel>(&format!(
            "SELECT {MESSAGE_COLUMNS} FROM ticket_messages \
             WHERE ticket_id = $1 ORDER BY created_at ASC"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        let message_ids: Vec<Uuid> = message_rows.iter().map(|m| m.id).collect();

        let mut attachments: HashMap<Uuid, Vec<TicketAttachment>> = HashMap::new();
        if !message_ids.is_empty() {
            let attachment_rows = sqlx::query_as::<_, TicketAttachmentModel>(&format!(
                "SELECT {ATTACHMENT_COLUMNS} FROM ticket_attachments \
                 WHERE message_id = ANY($1) ORDER BY created_at ASC"
            ))
            .bind(&message_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(map_db_error)?;
            for row in attachment_rows {
                let attachment = TicketAttachment::from(row);
                attachments
                    .entry(attachment.message_id)
                    .or_default()
                    .push(attachment);
            }
        }

        message_rows
            .into_iter()
            .map(|row| {
                let message = TicketMessage::try_from(row)?;
                Ok(TicketThreadEntry {
                    attachments: attachments.remove(&message.id).unwrap_or_default(),
                    message,
                })
            })
            .collect()
    }

    #[instrument(skip(self, message, attachments, status_change))]
    async fn append_message(
        &self,
        id: Uuid,
        message: &NewTicketMessage,
        attachments: &[NewAttachment],
        status_change: Option<TicketStatusChange>,
    ) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO ticket_messages (id, ticket_id, sender_type, sender_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ",
        )
        .bind(message.id)
        .bind(id)
        .bind(message.sender.as_str())
        .bind(message.sender_id)
        .bind(&message.body)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        for attachment in attachments {
            sqlx::query(
                r"
                INSERT INTO ticket_attachments
                    (id, message_id, original_filename, storage_path, mime_type, file_size,
                     created_at)
                VALUES ($1, $2, $3, $4, $5, $6, NOW())
                ",
            )
            .bind(attachment.id)
            .bind(message.id)
            .bind(&attachment.original_filename)
            .bind(&attachment.storage_path)
            .bind(&attachment.mime_type)
            .bind(attachment.file_size)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;
        }

        // Message activity always bumps updated_at; a reply may also move
        // the status (reopen on customer reply, auto-progress on admin reply)
        let result = match status_change {
            Some(change) => sqlx::query(
                "UPDATE support_tickets \
                 SET status = $2, closed_at = $3, updated_at = NOW() WHERE id = $1",
            )
            .bind(id)
            .bind(change.status.as_str())
            .bind(change.closed_at)
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?,
            None => sqlx::query("UPDATE support_tickets SET updated_at = NOW() WHERE id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(map_db_error)?,
        };

        if result.rows_affected() == 0 {
            return Err(ticket_not_found(id));
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self, change))]
    async fn update_status(&self, id: Uuid, change: TicketStatusChange) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE support_tickets SET status = $2, closed_at = $3, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(change.status.as_str())
        .bind(change.closed_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(ticket_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self, tags))]
    async fn update_tags(&self, id: Uuid, tags: &[String]) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE support_tickets SET tags = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(tags)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(ticket_not_found(id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn count_open(&self) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM support_tickets WHERE status IN ($1, $2)",
        )
        .bind(TicketStatus::Open.as_str())
        .bind(TicketStatus::InProgress.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }
}
