//! Ports - repository and collaborator traits

mod repositories;

pub use repositories::{
    CatalogRepository, ConsumedRefreshToken, CustomerOverview, CustomerSummary,
    DuplicateHashGroup, FileStore, KeyValueStore, MonthlyRegistrationCount, NewAttachment,
    NewNote, NewPhoto, NewRegistration, NewTicket, NewTicketMessage, NewWarranty, Notifier,
    PhotoHashHit, RefreshTokenRepository, RegistrationFilter, RegistrationOverview,
    RegistrationRepository, RepoResult, ReviewUpdate, TicketFilter, TicketOverview,
    TicketRepository, TicketStatusChange, TicketThreadEntry, UserRepository, WarrantyRepository,
    WarrantySummary, WarrantyTransition,
};
