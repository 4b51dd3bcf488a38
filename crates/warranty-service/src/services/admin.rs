//! Admin reporting service
//!
//! Filtered registration and ticket lists, the duplicate-evidence report,
//! dashboard stats, and customer views.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use tracing::instrument;
use uuid::Uuid;

use warranty_core::traits::{NewNote, RegistrationFilter, TicketFilter};
use warranty_core::{DomainError, RegistrationStatus};

use crate::dto::{
    AdminNoteRequest, CustomerDetailResponse, CustomerResponse, DuplicateGroupResponse,
    NoteResponse, PageQuery, PaginatedResponse, RegistrationDetailResponse, RegistrationListQuery,
    RegistrationResponse, StatsResponse, TicketDetailResponse, TicketListQuery,
    TicketSummaryResponse,
};

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Duplicate-hash groups returned by the fraud report
const DUPLICATE_REPORT_LIMIT: i64 = 50;
/// Trailing window of the monthly submissions chart
const STATS_MONTHS_BACK: i32 = 12;

/// Admin reporting service
pub struct AdminService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AdminService<'a> {
    /// Create a new AdminService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Filtered, paginated registration list, newest first
    #[instrument(skip(self, query))]
    pub async fn list_registrations(
        &self,
        query: RegistrationListQuery,
    ) -> ServiceResult<PaginatedResponse<RegistrationResponse>> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, 100);

        let filter = RegistrationFilter {
            status: query.status,
            model_id: query.model_id,
            source_id: query.source_id,
            purchased_from: query.date_from.map(day_start),
            purchased_to: query.date_to.map(day_end),
            search: query.search,
            page,
            limit,
        };

        let (overviews, total) = self.ctx.registration_repo().list_filtered(&filter).await?;

        Ok(PaginatedResponse::new(
            overviews.into_iter().map(RegistrationResponse::from).collect(),
            page,
            limit,
            total,
        ))
    }

    /// Full registration view with the audit trail
    #[instrument(skip(self))]
    pub async fn registration_detail(
        &self,
        id: Uuid,
    ) -> ServiceResult<RegistrationDetailResponse> {
        let overview = self
            .ctx
            .registration_repo()
            .overview(id)
            .await?
            .ok_or(DomainError::RegistrationNotFound(id))?;

        let notes = self.ctx.registration_repo().list_notes(id).await?;

        Ok(RegistrationDetailResponse {
            registration: RegistrationResponse::from(overview),
            notes: notes.into_iter().map(NoteResponse::from).collect(),
        })
    }

    /// Append a standalone audit note to a registration
    #[instrument(skip(self, request), fields(admin_id = %admin_id))]
    pub async fn add_note(
        &self,
        admin_id: Uuid,
        registration_id: Uuid,
        request: AdminNoteRequest,
    ) -> ServiceResult<NoteResponse> {
        self.ctx
            .registration_repo()
            .find_by_id(registration_id)
            .await?
            .ok_or(DomainError::RegistrationNotFound(registration_id))?;

        let note = self
            .ctx
            .registration_repo()
            .add_note(
                registration_id,
                &NewNote {
                    id: Uuid::new_v4(),
                    admin_id,
                    content: request.content,
                },
            )
            .await?;

        Ok(NoteResponse::from(note))
    }

    /// Duplicate-evidence report: content hashes referenced by more than
    /// one registration, by descending registration count.
    #[instrument(skip(self))]
    pub async fn duplicates(&self) -> ServiceResult<Vec<DuplicateGroupResponse>> {
        let groups = self
            .ctx
            .registration_repo()
            .duplicate_hash_report(DUPLICATE_REPORT_LIMIT)
            .await?;

        Ok(groups.into_iter().map(DuplicateGroupResponse::from).collect())
    }

    /// Filtered, paginated ticket list, most recently active first
    #[instrument(skip(self, query))]
    pub async fn list_tickets(
        &self,
        query: TicketListQuery,
    ) -> ServiceResult<PaginatedResponse<TicketSummaryResponse>> {
        let page = query.page.max(1);
        let limit = query.limit.clamp(1, 100);

        let filter = TicketFilter {
            status: query.status,
            priority: query.priority,
            tag: query.tag,
            search: query.search,
            page,
            limit,
        };

        let (overviews, total) = self.ctx.ticket_repo().list_filtered(&filter).await?;

        Ok(PaginatedResponse::new(
            overviews.into_iter().map(TicketSummaryResponse::from).collect(),
            page,
            limit,
            total,
        ))
    }

    /// Full ticket view with its thread
    #[instrument(skip(self))]
    pub async fn ticket_detail(&self, id: Uuid) -> ServiceResult<TicketDetailResponse> {
        let ticket = self
            .ctx
            .ticket_repo()
            .find_by_id(id)
            .await?
            .ok_or(DomainError::TicketNotFound(id))?;

        let thread = self.ctx.ticket_repo().thread(id).await?;
        Ok(TicketDetailResponse::from_parts(ticket, thread))
    }

    /// Dashboard totals plus submissions per month over the last year
    #[instrument(skip(self))]
    pub async fn stats(&self) -> ServiceResult<StatsResponse> {
        let total_customers = self.ctx.user_repo().count_customers().await?;
        let total_registrations = self.ctx.registration_repo().count_all().await?;
        let pending_registrations = self
            .ctx
            .registration_repo()
            .count_by_status(RegistrationStatus::PendingReview)
            .await?;
        let active_warranties = self.ctx.warranty_repo().count_active().await?;
        let open_tickets = self.ctx.ticket_repo().count_open().await?;
        let by_month = self
            .ctx
            .registration_repo()
            .monthly_counts(STATS_MONTHS_BACK)
            .await?;

        Ok(StatsResponse {
            total_customers,
            total_registrations,
            pending_registrations,
            active_warranties,
            open_tickets,
            registrations_by_month: by_month.into_iter().map(Into::into).collect(),
        })
    }

    /// Paginated customer list with activity counts
    #[instrument(skip(self, query))]
    pub async fn list_users(
        &self,
        query: PageQuery,
    ) -> ServiceResult<PaginatedResponse<CustomerResponse>> {
        let (page, limit) = query.clamped();

        let (customers, total) = self.ctx.user_repo().list_customers(page, limit).await?;

        Ok(PaginatedResponse::new(
            customers.into_iter().map(CustomerResponse::from).collect(),
            page,
            limit,
            total,
        ))
    }

    /// Full customer view with registrations and tickets
    #[instrument(skip(self))]
    pub async fn user_detail(&self, id: Uuid) -> ServiceResult<CustomerDetailResponse> {
        let overview = self
            .ctx
            .user_repo()
            .customer_overview(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))?;

        Ok(CustomerDetailResponse::from(overview))
    }
}

/// Midnight UTC at the start of a filter date
fn day_start(date: NaiveDate) -> DateTime<Utc> {
    DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc)
}

/// Last instant of a filter date
fn day_end(date: NaiveDate) -> DateTime<Utc> {
    let end = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN));
    DateTime::from_naive_utc_and_offset(end, Utc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let start = day_start(date);
        let end = day_end(date);

        assert!(start < end);
        assert_eq!(start.date_naive(), date);
        assert_eq!(end.date_naive(), date);
    }
}
