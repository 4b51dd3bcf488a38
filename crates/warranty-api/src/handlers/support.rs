//! Support ticket handlers (customer side)

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use uuid::Uuid;
use validator::Validate;
use warranty_service::{
    CreateTicketRequest, MessageCreatedResponse, TicketCreatedResponse, TicketDetailResponse,
    TicketMessageRequest, TicketService, TicketSummaryResponse,
};

use crate::extractors::{AuthUser, ValidatedJson};
use crate::handlers::upload::read_multipart;
use crate::response::{ApiResult, Created};
use crate::state::AppState;

/// Open a support ticket
///
/// POST /support/tickets
pub async fn create_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateTicketRequest>,
) -> ApiResult<Created<Json<TicketCreatedResponse>>> {
    let service = TicketService::new(state.service_context());
    let response = service.create(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// List own tickets
///
/// GET /support/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<TicketSummaryResponse>>> {
    let service = TicketService::new(state.service_context());
    Ok(Json(service.list_mine(auth.user_id).await?))
}

/// Get one own ticket with its thread
///
/// GET /support/tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TicketDetailResponse>> {
    let service = TicketService::new(state.service_context());
    Ok(Json(service.get_mine(auth.user_id, id).await?))
}

/// Reply to an own ticket, optionally with attachments
///
/// POST /support/tickets/:id/messages (multipart)
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Created<Json<MessageCreatedResponse>>> {
    let form = read_multipart(multipart).await?;
    let request = TicketMessageRequest {
        body: form.require("body")?.to_string(),
    };
    request.validate()?;

    let service = TicketService::new(state.service_context());
    let response = service
        .customer_reply(auth.user_id, id, request, form.files)
        .await?;
    Ok(Created(Json(response)))
}
