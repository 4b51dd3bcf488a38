//! Admin handlers
//!
//! Registration review, the duplicate-evidence report, ticket
//! management, dashboard stats, and customer views. Every route requires
//! the admin role via the `AdminUser` extractor.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;
use warranty_service::{
    AdminNoteRequest, AdminService, CustomerDetailResponse, CustomerResponse,
    DuplicateGroupResponse, MessageCreatedResponse, MessageResponse, NoteResponse, PageQuery,
    PaginatedResponse, RegistrationDetailResponse, RegistrationListQuery, RegistrationResponse,
    RegistrationService, StatsResponse, TicketDetailResponse, TicketListQuery,
    TicketMessageRequest, TicketService, TicketSummaryResponse,
    UpdateRegistrationStatusRequest, UpdateTicketStatusRequest, UpdateTicketTagsRequest,
};

use crate::extractors::{AdminUser, ValidatedJson};
use crate::response::{ApiResult, Created};
use crate::state::AppState;

// ============================================================================
// Registrations
// ============================================================================

/// Filtered registration list
///
/// GET /admin/registrations
pub async fn list_registrations(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<RegistrationListQuery>,
) -> ApiResult<Json<PaginatedResponse<RegistrationResponse>>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.list_registrations(query).await?))
}

/// Full registration detail with audit trail
///
/// GET /admin/registrations/:id
pub async fn registration_detail(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RegistrationDetailResponse>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.registration_detail(id).await?))
}

/// Apply a review decision
///
/// PATCH /admin/registrations/:id/status
pub async fn update_registration_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateRegistrationStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let status = request.status;
    let service = RegistrationService::new(state.service_context());
    service.review(admin.user_id(), id, request).await?;
    Ok(Json(MessageResponse::new(format!(
        "Registration {}",
        status.as_str().to_lowercase()
    ))))
}

/// Append an audit note
///
/// POST /admin/registrations/:id/notes
pub async fn add_note(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<AdminNoteRequest>,
) -> ApiResult<Created<Json<NoteResponse>>> {
    let service = AdminService::new(state.service_context());
    let note = service.add_note(admin.user_id(), id, request).await?;
    Ok(Created(Json(note)))
}

/// Duplicate-evidence report
///
/// GET /admin/duplicates
pub async fn duplicates(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<Vec<DuplicateGroupResponse>>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.duplicates().await?))
}

// ============================================================================
// Tickets
// ============================================================================

/// Filtered ticket list
///
/// GET /admin/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<TicketListQuery>,
) -> ApiResult<Json<PaginatedResponse<TicketSummaryResponse>>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.list_tickets(query).await?))
}

/// Full ticket detail with its thread
///
/// GET /admin/tickets/:id
pub async fn ticket_detail(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TicketDetailResponse>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.ticket_detail(id).await?))
}

/// Reply to a ticket as admin
///
/// POST /admin/tickets/:id/messages
pub async fn reply_ticket(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<TicketMessageRequest>,
) -> ApiResult<Created<Json<MessageCreatedResponse>>> {
    let service = TicketService::new(state.service_context());
    let response = service.admin_reply(admin.user_id(), id, request).await?;
    Ok(Created(Json(response)))
}

/// Update a ticket's status
///
/// PATCH /admin/tickets/:id/status
pub async fn update_ticket_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTicketStatusRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let status = request.status;
    let service = TicketService::new(state.service_context());
    service.update_status(id, request).await?;
    Ok(Json(MessageResponse::new(format!(
        "Ticket status updated to {status}"
    ))))
}

/// Replace a ticket's tag list
///
/// PATCH /admin/tickets/:id/tags
pub async fn update_ticket_tags(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateTicketTagsRequest>,
) -> ApiResult<Json<MessageResponse>> {
    let service = TicketService::new(state.service_context());
    service.update_tags(id, request).await?;
    Ok(Json(MessageResponse::new("Tags updated")))
}

// ============================================================================
// Stats & Users
// ============================================================================

/// Dashboard stats
///
/// GET /admin/stats
pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> ApiResult<Json<StatsResponse>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.stats().await?))
}

/// Paginated customer list
///
/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<PaginatedResponse<CustomerResponse>>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.list_users(query).await?))
}

/// Full customer detail
///
/// GET /admin/users/:id
pub async fn user_detail(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<CustomerDetailResponse>> {
    let service = AdminService::new(state.service_context());
    Ok(Json(service.user_detail(id).await?))
}
