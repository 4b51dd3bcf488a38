//! Data transfer objects for API requests and responses
//!
//! Request DTOs carry `validator` derives so malformed input is rejected
//! at the boundary; response DTOs serialize domain views.

pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    AdminNoteRequest, CreateTicketRequest, ForgotPasswordRequest, LoginRequest, PageQuery,
    RegisterProductRequest, RegisterRequest, RegistrationListQuery, ResetPasswordRequest,
    TicketListQuery, TicketMessageRequest, UpdateProfileRequest, UpdateRegistrationStatusRequest,
    UpdateTicketStatusRequest, UpdateTicketTagsRequest, UploadedFile, VerifyOtpRequest,
};

// Re-export commonly used response types
pub use responses::{
    AttachmentResponse, AuthResponse, CustomerDetailResponse, CustomerResponse,
    DuplicateGroupResponse, HealthChecks, HealthResponse, IssuedSession, LastMessageResponse,
    MessageCreatedResponse, MessageResponse, ModelResponse, MonthlyCountResponse, NoteResponse,
    PageMeta, PaginatedResponse, PhotoResponse, ProfileResponse, ReadinessResponse,
    RegisteredResponse, RegistrationCreatedResponse, RegistrationDetailResponse,
    RegistrationResponse, SourceResponse, StatsResponse, TicketBriefResponse,
    TicketCreatedResponse, TicketDetailResponse, TicketMessageResponse, TicketSummaryResponse,
    UserResponse, WarrantyInfoResponse, WarrantyResponse,
};
