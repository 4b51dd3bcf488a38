//! Product registration handlers
//!
//! Multipart submission intake, customer registration views, photo
//! additions, and the warranty detail view.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;
use warranty_service::{
    MessageResponse, RegisterProductRequest, RegistrationCreatedResponse, RegistrationResponse,
    RegistrationService, WarrantyResponse, WarrantyService,
};

use crate::extractors::AuthUser;
use crate::handlers::upload::{read_multipart, MultipartForm};
use crate::response::{ApiError, ApiResult, Created};
use crate::state::AppState;

/// Parse a purchase date field: RFC 3339, or a plain date taken as
/// midnight UTC.
fn parse_purchase_date(value: &str) -> ApiResult<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Ok(datetime.with_timezone(&Utc));
    }
    value
        .parse::<NaiveDate>()
        .map(|date| DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc))
        .map_err(|_| ApiError::invalid_body("Invalid purchase_date"))
}

fn parse_bool_field(form: &MultipartForm, name: &str) -> ApiResult<bool> {
    form.require(name)?
        .parse::<bool>()
        .map_err(|_| ApiError::invalid_body(format!("Field {name} must be true or false")))
}

fn parse_uuid_field(form: &MultipartForm, name: &str) -> ApiResult<Uuid> {
    form.require(name)?
        .parse::<Uuid>()
        .map_err(|_| ApiError::invalid_body(format!("Field {name} must be a UUID")))
}

/// Submit a product registration with evidence files
///
/// POST /products (multipart)
pub async fn register_product(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> ApiResult<Created<Json<RegistrationCreatedResponse>>> {
    let form = read_multipart(multipart).await?;

    let request = RegisterProductRequest {
        mattress_model_id: parse_uuid_field(&form, "mattress_model_id")?,
        purchase_source_id: parse_uuid_field(&form, "purchase_source_id")?,
        purchase_date: parse_purchase_date(form.require("purchase_date")?)?,
        received_undamaged: parse_bool_field(&form, "received_undamaged")?,
        info_accurate: parse_bool_field(&form, "info_accurate")?,
    };

    let service = RegistrationService::new(state.service_context());
    let response = service.submit(auth.user_id, request, form.files).await?;
    Ok(Created(Json(response)))
}

/// List own registrations
///
/// GET /products
pub async fn list_products(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<RegistrationResponse>>> {
    let service = RegistrationService::new(state.service_context());
    Ok(Json(service.list_mine(auth.user_id).await?))
}

/// Get one own registration
///
/// GET /products/:id
pub async fn get_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<RegistrationResponse>> {
    let service = RegistrationService::new(state.service_context());
    Ok(Json(service.get_mine(auth.user_id, id).await?))
}

/// Add evidence photos to a registration
///
/// POST /products/:id/photos (multipart)
pub async fn add_photos(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<Json<MessageResponse>> {
    let form = read_multipart(multipart).await?;

    let service = RegistrationService::new(state.service_context());
    service.add_photos(auth.user_id, id, form.files).await?;
    Ok(Json(MessageResponse::new("Photos added successfully")))
}

/// Warranty detail for one own registration
///
/// GET /products/:id/warranty
pub async fn get_warranty(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<WarrantyResponse>> {
    let service = WarrantyService::new(state.service_context());
    Ok(Json(service.get_for_registration(auth.user_id, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_purchase_date_accepts_plain_dates() {
        let parsed = parse_purchase_date("2024-06-15").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_purchase_date_accepts_rfc3339() {
        let parsed = parse_purchase_date("2024-06-15T10:30:00Z").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_purchase_date_rejects_garbage() {
        assert!(parse_purchase_date("June 15th").is_err());
    }
}
