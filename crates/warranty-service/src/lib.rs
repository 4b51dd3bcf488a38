//! # warranty-service
//!
//! Application layer: workflow services, request/response DTOs, and the
//! dependency container they run against.

pub mod dto;
pub mod services;

// Re-export commonly used types at crate root
pub use dto::{
    AdminNoteRequest, AuthResponse, CreateTicketRequest, CustomerDetailResponse,
    CustomerResponse, DuplicateGroupResponse, ForgotPasswordRequest, HealthResponse,
    IssuedSession, LoginRequest, MessageCreatedResponse, MessageResponse, ModelResponse,
    NoteResponse, PageQuery, PaginatedResponse, ProfileResponse, ReadinessResponse,
    RegisterProductRequest, RegisterRequest, RegisteredResponse, RegistrationCreatedResponse,
    RegistrationDetailResponse, RegistrationListQuery, RegistrationResponse,
    ResetPasswordRequest, SourceResponse, StatsResponse, TicketCreatedResponse,
    TicketDetailResponse, TicketListQuery, TicketMessageRequest, TicketSummaryResponse,
    UpdateProfileRequest, UpdateRegistrationStatusRequest, UpdateTicketStatusRequest,
    UpdateTicketTagsRequest, UploadedFile, UserResponse, VerifyOtpRequest, WarrantyResponse,
};
pub use services::{
    AdminService, AuthService, CatalogService, RegistrationService, ServiceContext,
    ServiceContextBuilder, ServiceError, ServicePolicies, ServiceResult, TicketService,
    UserService, WarrantyService,
};
