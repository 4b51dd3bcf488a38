//! In-memory fakes of the core ports for service tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use warranty_cache::{OtpStore, ResetTokenStore};
use warranty_common::auth::JwtService;
use warranty_common::{RegistrationPolicy, TicketPolicy};
use warranty_core::traits::*;
use warranty_core::{
    AdminNote, DomainError, MattressModel, ProductRegistration, PurchaseSource,
    RegistrationPhoto, RegistrationStatus, SupportTicket, TicketAttachment, TicketMessage,
    TicketStatus, User, Warranty, WarrantyStatus,
};

use super::context::{ServiceContext, ServiceContextBuilder, ServicePolicies};

/// Shared in-memory state behind all fake repositories
#[derive(Default)]
pub(crate) struct MemoryDb {
    pub users: Mutex<HashMap<Uuid, (User, String)>>,
    pub models: Mutex<HashMap<Uuid, MattressModel>>,
    pub sources: Mutex<HashMap<Uuid, PurchaseSource>>,
    pub registrations: Mutex<HashMap<Uuid, ProductRegistration>>,
    pub warranties: Mutex<HashMap<Uuid, Warranty>>,
    pub photos: Mutex<Vec<RegistrationPhoto>>,
    pub notes: Mutex<Vec<AdminNote>>,
    pub tickets: Mutex<HashMap<Uuid, SupportTicket>>,
    pub messages: Mutex<Vec<TicketMessage>>,
    pub attachments: Mutex<Vec<TicketAttachment>>,
    pub refresh_tokens: Mutex<HashMap<String, (Uuid, DateTime<Utc>)>>,
}

impl MemoryDb {
    fn overview_for(&self, registration: ProductRegistration) -> RepoResult<RegistrationOverview> {
        let user = self
            .users
            .lock()
            .unwrap()
            .get(&registration.user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| DomainError::DatabaseError("missing user".into()))?;
        let model = self
            .models
            .lock()
            .unwrap()
            .get(&registration.model_id)
            .cloned()
            .ok_or_else(|| DomainError::DatabaseError("missing model".into()))?;
        let source = self
            .sources
            .lock()
            .unwrap()
            .get(&registration.source_id)
            .cloned()
            .ok_or_else(|| DomainError::DatabaseError("missing source".into()))?;
        let warranty = self.warranties.lock().unwrap().get(&registration.id).cloned();
        let photos: Vec<RegistrationPhoto> = self
            .photos
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.registration_id == registration.id)
            .cloned()
            .collect();
        let note_count = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.registration_id == registration.id)
            .count() as i64;

        Ok(RegistrationOverview {
            model_name: model.name,
            model_slug: model.slug,
            warranty_months: model.warranty_months,
            source_name: source.name,
            source_type: source.source_type,
            warranty,
            photos,
            note_count,
            user,
            registration,
        })
    }

    fn ticket_overview_for(&self, ticket: SupportTicket) -> RepoResult<TicketOverview> {
        let user = self
            .users
            .lock()
            .unwrap()
            .get(&ticket.user_id)
            .map(|(u, _)| u.clone())
            .ok_or_else(|| DomainError::DatabaseError("missing user".into()))?;
        let messages: Vec<TicketMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.ticket_id == ticket.id)
            .cloned()
            .collect();

        Ok(TicketOverview {
            message_count: messages.len() as i64,
            last_message: messages.into_iter().max_by_key(|m| m.created_at),
            user,
            ticket,
        })
    }
}

// ============================================================================
// Fake repositories
// ============================================================================

pub(crate) struct FakeUserRepository(pub Arc<MemoryDb>);

#[async_trait]
impl UserRepository for FakeUserRepository {
    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .get(&id)
            .filter(|(u, _)| u.deleted_at.is_none())
            .map(|(u, _)| u.clone()))
    }

    async fn find_by_identifier(&self, identifier: &str) -> RepoResult<Option<User>> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .find(|(u, _)| {
                u.deleted_at.is_none()
                    && (u.email.as_deref() == Some(identifier)
                        || u.phone.as_deref() == Some(identifier))
            })
            .map(|(u, _)| u.clone()))
    }

    async fn identifier_exists(
        &self,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> RepoResult<bool> {
        Ok(self.0.users.lock().unwrap().values().any(|(u, _)| {
            (email.is_some() && u.email.as_deref() == email)
                || (phone.is_some() && u.phone.as_deref() == phone)
        }))
    }

    async fn email_taken(&self, email: &str, excluding: Uuid) -> RepoResult<bool> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .any(|(u, _)| u.id != excluding && u.email.as_deref() == Some(email)))
    }

    async fn phone_taken(&self, phone: &str, excluding: Uuid) -> RepoResult<bool> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .any(|(u, _)| u.id != excluding && u.phone.as_deref() == Some(phone)))
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut users = self.0.users.lock().unwrap();
        if users.values().any(|(u, _)| {
            (user.email.is_some() && u.email == user.email)
                || (user.phone.is_some() && u.phone == user.phone)
        }) {
            return Err(DomainError::IdentifierTaken);
        }
        users.insert(user.id, (user.clone(), password_hash.to_string()));
        Ok(())
    }

    async fn update_profile(&self, user: &User) -> RepoResult<()> {
        let mut users = self.0.users.lock().unwrap();
        match users.get_mut(&user.id) {
            Some(entry) => {
                entry.0 = user.clone();
                Ok(())
            }
            None => Err(DomainError::UserNotFound(user.id)),
        }
    }

    async fn mark_verified(&self, id: Uuid) -> RepoResult<()> {
        let mut users = self.0.users.lock().unwrap();
        match users.get_mut(&id) {
            Some(entry) => {
                entry.0.is_verified = true;
                Ok(())
            }
            None => Err(DomainError::UserNotFound(id)),
        }
    }

    async fn get_password_hash(&self, id: Uuid) -> RepoResult<Option<String>> {
        Ok(self.0.users.lock().unwrap().get(&id).map(|(_, h)| h.clone()))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> RepoResult<()> {
        let mut users = self.0.users.lock().unwrap();
        match users.get_mut(&id) {
            Some(entry) => {
                entry.1 = password_hash.to_string();
                Ok(())
            }
            None => Err(DomainError::UserNotFound(id)),
        }
    }

    async fn activity_counts(&self, id: Uuid) -> RepoResult<(i64, i64)> {
        let registrations = self
            .0
            .registrations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == id)
            .count() as i64;
        let tickets = self
            .0
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == id)
            .count() as i64;
        Ok((registrations, tickets))
    }

    async fn count_customers(&self) -> RepoResult<i64> {
        Ok(self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|(u, _)| !u.is_admin() && u.deleted_at.is_none())
            .count() as i64)
    }

    async fn list_customers(
        &self,
        _page: i64,
        _limit: i64,
    ) -> RepoResult<(Vec<CustomerSummary>, i64)> {
        let users: Vec<User> = self
            .0
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|(u, _)| !u.is_admin() && u.deleted_at.is_none())
            .map(|(u, _)| u.clone())
            .collect();
        let total = users.len() as i64;

        let mut summaries = Vec::new();
        for user in users {
            let (registration_count, ticket_count) = self.activity_counts(user.id).await?;
            summaries.push(CustomerSummary {
                user,
                registration_count,
                ticket_count,
            });
        }
        Ok((summaries, total))
    }

    async fn customer_overview(&self, id: Uuid) -> RepoResult<Option<CustomerOverview>> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let registrations: Vec<ProductRegistration> = self
            .0
            .registrations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == id)
            .cloned()
            .collect();
        let registrations = registrations
            .into_iter()
            .map(|r| self.0.overview_for(r))
            .collect::<RepoResult<Vec<_>>>()?;

        let tickets: Vec<SupportTicket> = self
            .0
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == id)
            .cloned()
            .collect();

        Ok(Some(CustomerOverview {
            user,
            registrations,
            tickets,
        }))
    }
}

pub(crate) struct FakeCatalogRepository(pub Arc<MemoryDb>);

#[async_trait]
impl CatalogRepository for FakeCatalogRepository {
    async fn find_model(&self, id: Uuid) -> RepoResult<Option<MattressModel>> {
        Ok(self.0.models.lock().unwrap().get(&id).cloned())
    }

    async fn find_source(&self, id: Uuid) -> RepoResult<Option<PurchaseSource>> {
        Ok(self.0.sources.lock().unwrap().get(&id).cloned())
    }

    async fn list_active_models(&self) -> RepoResult<Vec<MattressModel>> {
        let mut models: Vec<MattressModel> = self
            .0
            .models
            .lock()
            .unwrap()
            .values()
            .filter(|m| m.is_active)
            .cloned()
            .collect();
        models.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(models)
    }

    async fn list_active_sources(&self) -> RepoResult<Vec<PurchaseSource>> {
        let mut sources: Vec<PurchaseSource> = self
            .0
            .sources
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        sources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(sources)
    }
}

pub(crate) struct FakeRegistrationRepository(pub Arc<MemoryDb>);

#[async_trait]
impl RegistrationRepository for FakeRegistrationRepository {
    async fn create(
        &self,
        registration: &NewRegistration,
        warranty: &NewWarranty,
        photos: &[NewPhoto],
    ) -> RepoResult<()> {
        let now = Utc::now();
        self.0.registrations.lock().unwrap().insert(
            registration.id,
            ProductRegistration {
                id: registration.id,
                user_id: registration.user_id,
                model_id: registration.model_id,
                source_id: registration.source_id,
                purchase_date: registration.purchase_date,
                received_undamaged: registration.received_undamaged,
                info_accurate: registration.info_accurate,
                status: RegistrationStatus::PendingReview,
                rejection_reason: None,
                created_at: now,
                updated_at: now,
            },
        );
        self.0.warranties.lock().unwrap().insert(
            registration.id,
            Warranty {
                id: warranty.id,
                registration_id: registration.id,
                status: WarrantyStatus::Pending,
                start_date: warranty.start_date,
                end_date: warranty.end_date,
                activated_at: None,
                created_at: now,
            },
        );
        let mut stored = self.0.photos.lock().unwrap();
        for photo in photos {
            stored.push(RegistrationPhoto {
                id: photo.id,
                registration_id: registration.id,
                kind: photo.kind,
                original_filename: photo.original_filename.clone(),
                storage_path: photo.storage_path.clone(),
                mime_type: photo.mime_type.clone(),
                file_size: photo.file_size,
                sha256_hash: photo.sha256_hash.clone(),
                created_at: now,
            });
        }
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<ProductRegistration>> {
        Ok(self.0.registrations.lock().unwrap().get(&id).cloned())
    }

    async fn find_owned(
        &self,
        id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<ProductRegistration>> {
        Ok(self
            .0
            .registrations
            .lock()
            .unwrap()
            .get(&id)
            .filter(|r| r.user_id == user_id)
            .cloned())
    }

    async fn exists_for_user(&self, user_id: Uuid) -> RepoResult<bool> {
        Ok(self
            .0
            .registrations
            .lock()
            .unwrap()
            .values()
            .any(|r| r.user_id == user_id))
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<RegistrationOverview>> {
        let registrations: Vec<ProductRegistration> = self
            .0
            .registrations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        registrations
            .into_iter()
            .map(|r| self.0.overview_for(r))
            .collect()
    }

    async fn overview(&self, id: Uuid) -> RepoResult<Option<RegistrationOverview>> {
        let registration = self.0.registrations.lock().unwrap().get(&id).cloned();
        registration.map(|r| self.0.overview_for(r)).transpose()
    }

    async fn list_filtered(
        &self,
        filter: &RegistrationFilter,
    ) -> RepoResult<(Vec<RegistrationOverview>, i64)> {
        let registrations: Vec<ProductRegistration> = self
            .0
            .registrations
            .lock()
            .unwrap()
            .values()
            .filter(|r| filter.status.is_none_or(|s| r.status == s))
            .cloned()
            .collect();
        let total = registrations.len() as i64;
        let overviews = registrations
            .into_iter()
            .map(|r| self.0.overview_for(r))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok((overviews, total))
    }

    async fn find_photos_by_hash(&self, sha256_hash: &str) -> RepoResult<Vec<PhotoHashHit>> {
        Ok(self
            .0
            .photos
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.sha256_hash == sha256_hash)
            .map(|p| PhotoHashHit {
                photo_id: p.id,
                registration_id: p.registration_id,
            })
            .collect())
    }

    async fn add_photos(
        &self,
        id: Uuid,
        photos: &[NewPhoto],
        revert_to_pending: bool,
    ) -> RepoResult<()> {
        let now = Utc::now();
        {
            let mut stored = self.0.photos.lock().unwrap();
            for photo in photos {
                stored.push(RegistrationPhoto {
                    id: photo.id,
                    registration_id: id,
                    kind: photo.kind,
                    original_filename: photo.original_filename.clone(),
                    storage_path: photo.storage_path.clone(),
                    mime_type: photo.mime_type.clone(),
                    file_size: photo.file_size,
                    sha256_hash: photo.sha256_hash.clone(),
                    created_at: now,
                });
            }
        }
        if revert_to_pending {
            let mut registrations = self.0.registrations.lock().unwrap();
            let registration = registrations
                .get_mut(&id)
                .ok_or(DomainError::RegistrationNotFound(id))?;
            registration.status = RegistrationStatus::PendingReview;
            registration.updated_at = now;
        }
        Ok(())
    }

    async fn apply_review(&self, id: Uuid, update: &ReviewUpdate) -> RepoResult<()> {
        {
            let mut registrations = self.0.registrations.lock().unwrap();
            let registration = registrations
                .get_mut(&id)
                .ok_or(DomainError::RegistrationNotFound(id))?;
            registration.status = update.status;
            registration.rejection_reason = update.rejection_reason.clone();
            registration.updated_at = Utc::now();
        }
        match update.warranty {
            Some(WarrantyTransition::Activate { activated_at }) => {
                if let Some(warranty) = self.0.warranties.lock().unwrap().get_mut(&id) {
                    warranty.status = WarrantyStatus::Active;
                    warranty.activated_at = Some(activated_at);
                }
            }
            Some(WarrantyTransition::Void) => {
                if let Some(warranty) = self.0.warranties.lock().unwrap().get_mut(&id) {
                    warranty.status = WarrantyStatus::Voided;
                }
            }
            None => {}
        }
        if let Some(ref note) = update.note {
            self.0.notes.lock().unwrap().push(AdminNote {
                id: note.id,
                registration_id: id,
                admin_id: note.admin_id,
                content: note.content.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn list_notes(&self, id: Uuid) -> RepoResult<Vec<AdminNote>> {
        Ok(self
            .0
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.registration_id == id)
            .cloned()
            .collect())
    }

    async fn add_note(&self, id: Uuid, note: &NewNote) -> RepoResult<AdminNote> {
        let stored = AdminNote {
            id: note.id,
            registration_id: id,
            admin_id: note.admin_id,
            content: note.content.clone(),
            created_at: Utc::now(),
        };
        self.0.notes.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn duplicate_hash_report(&self, limit: i64) -> RepoResult<Vec<DuplicateHashGroup>> {
        let photos = self.0.photos.lock().unwrap();
        let mut by_hash: HashMap<&str, Vec<Uuid>> = HashMap::new();
        for photo in photos.iter() {
            let ids = by_hash.entry(&photo.sha256_hash).or_default();
            if !ids.contains(&photo.registration_id) {
                ids.push(photo.registration_id);
            }
        }
        let mut groups: Vec<DuplicateHashGroup> = by_hash
            .into_iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(hash, ids)| DuplicateHashGroup {
                sha256_hash: hash.to_string(),
                registration_count: ids.len() as i64,
                registration_ids: ids,
            })
            .collect();
        groups.sort_by(|a, b| b.registration_count.cmp(&a.registration_count));
        groups.truncate(limit as usize);
        Ok(groups)
    }

    async fn monthly_counts(&self, _months_back: i32) -> RepoResult<Vec<MonthlyRegistrationCount>> {
        Ok(Vec::new())
    }

    async fn count_all(&self) -> RepoResult<i64> {
        Ok(self.0.registrations.lock().unwrap().len() as i64)
    }

    async fn count_by_status(&self, status: RegistrationStatus) -> RepoResult<i64> {
        Ok(self
            .0
            .registrations
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == status)
            .count() as i64)
    }
}

pub(crate) struct FakeWarrantyRepository(pub Arc<MemoryDb>);

#[async_trait]
impl WarrantyRepository for FakeWarrantyRepository {
    async fn find_by_registration(&self, registration_id: Uuid) -> RepoResult<Option<Warranty>> {
        Ok(self.0.warranties.lock().unwrap().get(&registration_id).cloned())
    }

    async fn summary_for_registration(
        &self,
        registration_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<Option<WarrantySummary>> {
        let registration = self
            .0
            .registrations
            .lock()
            .unwrap()
            .get(&registration_id)
            .filter(|r| r.user_id == user_id)
            .cloned();
        let Some(registration) = registration else {
            return Ok(None);
        };
        let Some(warranty) = self.find_by_registration(registration_id).await? else {
            return Ok(None);
        };
        let model = self
            .0
            .models
            .lock()
            .unwrap()
            .get(&registration.model_id)
            .cloned()
            .ok_or_else(|| DomainError::DatabaseError("missing model".into()))?;
        Ok(Some(WarrantySummary {
            warranty,
            model_name: model.name,
            warranty_months: model.warranty_months,
        }))
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> RepoResult<u64> {
        let mut flipped = 0;
        for warranty in self.0.warranties.lock().unwrap().values_mut() {
            if warranty.status == WarrantyStatus::Active && warranty.end_date < now {
                warranty.status = WarrantyStatus::Expired;
                flipped += 1;
            }
        }
        Ok(flipped)
    }

    async fn count_active(&self) -> RepoResult<i64> {
        Ok(self
            .0
            .warranties
            .lock()
            .unwrap()
            .values()
            .filter(|w| w.status == WarrantyStatus::Active)
            .count() as i64)
    }
}

pub(crate) struct FakeTicketRepository(pub Arc<MemoryDb>);

#[async_trait]
impl TicketRepository for FakeTicketRepository {
    async fn create_with_message(
        &self,
        ticket: &NewTicket,
        message: &NewTicketMessage,
    ) -> RepoResult<()> {
        let now = Utc::now();
        self.0.tickets.lock().unwrap().insert(
            ticket.id,
            SupportTicket {
                id: ticket.id,
                user_id: ticket.user_id,
                subject: ticket.subject.clone(),
                status: TicketStatus::Open,
                priority: ticket.priority,
                tags: Vec::new(),
                closed_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        self.0.messages.lock().unwrap().push(TicketMessage {
            id: message.id,
            ticket_id: ticket.id,
            sender: message.sender,
            sender_id: message.sender_id,
            body: message.body.clone(),
            created_at: now,
        });
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> RepoResult<Option<SupportTicket>> {
        Ok(self.0.tickets.lock().unwrap().get(&id).cloned())
    }

    async fn find_owned(&self, id: Uuid, user_id: Uuid) -> RepoResult<Option<SupportTicket>> {
        Ok(self
            .0
            .tickets
            .lock()
            .unwrap()
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .cloned())
    }

    async fn list_for_user(&self, user_id: Uuid) -> RepoResult<Vec<TicketOverview>> {
        let tickets: Vec<SupportTicket> = self
            .0
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets
            .into_iter()
            .map(|t| self.0.ticket_overview_for(t))
            .collect()
    }

    async fn list_filtered(
        &self,
        filter: &TicketFilter,
    ) -> RepoResult<(Vec<TicketOverview>, i64)> {
        let tickets: Vec<SupportTicket> = self
            .0
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| filter.status.is_none_or(|s| t.status == s))
            .cloned()
            .collect();
        let total = tickets.len() as i64;
        let overviews = tickets
            .into_iter()
            .map(|t| self.0.ticket_overview_for(t))
            .collect::<RepoResult<Vec<_>>>()?;
        Ok((overviews, total))
    }

    async fn thread(&self, id: Uuid) -> RepoResult<Vec<TicketThreadEntry>> {
        let mut messages: Vec<TicketMessage> = self
            .0
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.ticket_id == id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);

        let attachments = self.0.attachments.lock().unwrap();
        Ok(messages
            .into_iter()
            .map(|message| TicketThreadEntry {
                attachments: attachments
                    .iter()
                    .filter(|a| a.message_id == message.id)
                    .cloned()
                    .collect(),
                message,
            })
            .collect())
    }

    async fn append_message(
        &self,
        id: Uuid,
        message: &NewTicketMessage,
        attachments: &[NewAttachment],
        status_change: Option<TicketStatusChange>,
    ) -> RepoResult<()> {
        let now = Utc::now();
        self.0.messages.lock().unwrap().push(TicketMessage {
            id: message.id,
            ticket_id: id,
            sender: message.sender,
            sender_id: message.sender_id,
            body: message.body.clone(),
            created_at: now,
        });
        let mut stored = self.0.attachments.lock().unwrap();
        for attachment in attachments {
            stored.push(TicketAttachment {
                id: attachment.id,
                message_id: message.id,
                original_filename: attachment.original_filename.clone(),
                storage_path: attachment.storage_path.clone(),
                mime_type: attachment.mime_type.clone(),
                file_size: attachment.file_size,
                created_at: now,
            });
        }
        drop(stored);

        let mut tickets = self.0.tickets.lock().unwrap();
        let ticket = tickets.get_mut(&id).ok_or(DomainError::TicketNotFound(id))?;
        if let Some(change) = status_change {
            ticket.status = change.status;
            ticket.closed_at = change.closed_at;
        }
        ticket.updated_at = now;
        Ok(())
    }

    async fn update_status(&self, id: Uuid, change: TicketStatusChange) -> RepoResult<()> {
        let mut tickets = self.0.tickets.lock().unwrap();
        let ticket = tickets.get_mut(&id).ok_or(DomainError::TicketNotFound(id))?;
        ticket.status = change.status;
        ticket.closed_at = change.closed_at;
        ticket.updated_at = Utc::now();
        Ok(())
    }

    async fn update_tags(&self, id: Uuid, tags: &[String]) -> RepoResult<()> {
        let mut tickets = self.0.tickets.lock().unwrap();
        let ticket = tickets.get_mut(&id).ok_or(DomainError::TicketNotFound(id))?;
        ticket.tags = tags.to_vec();
        Ok(())
    }

    async fn count_open(&self) -> RepoResult<i64> {
        Ok(self
            .0
            .tickets
            .lock()
            .unwrap()
            .values()
            .filter(|t| matches!(t.status, TicketStatus::Open | TicketStatus::InProgress))
            .count() as i64)
    }
}

pub(crate) struct FakeRefreshTokenRepository(pub Arc<MemoryDb>);

#[async_trait]
impl RefreshTokenRepository for FakeRefreshTokenRepository {
    async fn issue(
        &self,
        token: &str,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        self.0
            .refresh_tokens
            .lock()
            .unwrap()
            .insert(token.to_string(), (user_id, expires_at));
        Ok(())
    }

    async fn consume(&self, token: &str) -> RepoResult<Option<ConsumedRefreshToken>> {
        Ok(self
            .0
            .refresh_tokens
            .lock()
            .unwrap()
            .remove(token)
            .map(|(user_id, expires_at)| ConsumedRefreshToken {
                user_id,
                expires_at,
            }))
    }

    async fn revoke(&self, token: &str) -> RepoResult<()> {
        self.0.refresh_tokens.lock().unwrap().remove(token);
        Ok(())
    }

    async fn revoke_all_for_user(&self, user_id: Uuid) -> RepoResult<u64> {
        let mut tokens = self.0.refresh_tokens.lock().unwrap();
        let before = tokens.len();
        tokens.retain(|_, (owner, _)| *owner != user_id);
        Ok((before - tokens.len()) as u64)
    }
}

// ============================================================================
// Fake collaborators
// ============================================================================

/// Key-value store fake; TTLs are accepted but never enforced
#[derive(Default)]
pub(crate) struct MemoryKv {
    pub data: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl KeyValueStore for MemoryKv {
    async fn set_with_expiry(&self, key: &str, value: &str, _ttl: u64) -> RepoResult<()> {
        self.data.lock().unwrap().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> RepoResult<Option<String>> {
        Ok(self.data.lock().unwrap().get(key).cloned())
    }

    async fn increment(&self, key: &str) -> RepoResult<i64> {
        let mut data = self.data.lock().unwrap();
        let value = data.get(key).and_then(|v| v.parse::<i64>().ok()).unwrap_or(0) + 1;
        data.insert(key.to_string(), value.to_string());
        Ok(value)
    }

    async fn expire(&self, key: &str, _ttl: u64) -> RepoResult<bool> {
        Ok(self.data.lock().unwrap().contains_key(key))
    }

    async fn delete(&self, key: &str) -> RepoResult<bool> {
        Ok(self.data.lock().unwrap().remove(key).is_some())
    }
}

/// Notifier fake recording every dispatched email and SMS
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub emails: Mutex<Vec<(String, String)>>,
    pub sms: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_email(&self, to: &str, subject: &str, _html_body: &str) -> RepoResult<()> {
        self.emails
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }

    async fn send_sms(&self, to: &str, _body: &str) -> RepoResult<()> {
        self.sms.lock().unwrap().push(to.to_string());
        Ok(())
    }
}

/// File store fake returning synthetic paths
pub(crate) struct MemoryFileStore;

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn store(&self, original_filename: &str, _bytes: &[u8]) -> RepoResult<String> {
        Ok(format!("mem://{}/{original_filename}", Uuid::new_v4()))
    }
}

// ============================================================================
// Test context assembly
// ============================================================================

pub(crate) struct TestHarness {
    pub ctx: ServiceContext,
    pub db: Arc<MemoryDb>,
    pub kv: Arc<MemoryKv>,
    pub notifier: Arc<RecordingNotifier>,
}

/// Build a service context wired entirely to in-memory fakes
pub(crate) fn test_harness() -> TestHarness {
    let db = Arc::new(MemoryDb::default());
    let kv = Arc::new(MemoryKv::default());
    let notifier = Arc::new(RecordingNotifier::default());

    let ctx = ServiceContextBuilder::new()
        .user_repo(Arc::new(FakeUserRepository(db.clone())))
        .catalog_repo(Arc::new(FakeCatalogRepository(db.clone())))
        .registration_repo(Arc::new(FakeRegistrationRepository(db.clone())))
        .warranty_repo(Arc::new(FakeWarrantyRepository(db.clone())))
        .ticket_repo(Arc::new(FakeTicketRepository(db.clone())))
        .refresh_token_repo(Arc::new(FakeRefreshTokenRepository(db.clone())))
        .otp_store(OtpStore::new(kv.clone(), 300, 3))
        .reset_store(ResetTokenStore::new(kv.clone(), 3600))
        .jwt_service(Arc::new(JwtService::new(
            "test-secret-that-is-long-enough-1234",
            900,
        )))
        .notifier(notifier.clone())
        .file_store(Arc::new(MemoryFileStore))
        .policies(ServicePolicies {
            registration: RegistrationPolicy {
                max_purchase_age_days: 365,
                min_photos: 2,
            },
            ticket: TicketPolicy {
                reopen_grace_days: 30,
            },
            refresh_token_ttl: 604_800,
            frontend_url: "http://localhost:3000".to_string(),
        })
        .build()
        .expect("test context");

    TestHarness {
        ctx,
        db,
        kv,
        notifier,
    }
}

// ============================================================================
// Shared fixtures
// ============================================================================

/// Insert a verified customer, returning it
pub(crate) fn seed_user(db: &MemoryDb, email: &str) -> User {
    let mut user = User::new(Uuid::new_v4(), Some(email.to_string()), None);
    user.is_verified = true;
    db.users
        .lock()
        .unwrap()
        .insert(user.id, (user.clone(), "hash".to_string()));
    user
}

/// Insert an active catalog model with the given warranty duration
pub(crate) fn seed_model(
    db: &MemoryDb,
    warranty_months: u32,
    released_at: Option<DateTime<Utc>>,
) -> MattressModel {
    let id = Uuid::new_v4();
    let model = MattressModel {
        id,
        name: format!("Model {id}"),
        slug: format!("model-{id}"),
        description: None,
        warranty_months,
        released_at,
        is_active: true,
        created_at: Utc::now(),
    };
    db.models.lock().unwrap().insert(id, model.clone());
    model
}

/// Insert an active purchase source
pub(crate) fn seed_source(db: &MemoryDb) -> PurchaseSource {
    let id = Uuid::new_v4();
    let source = PurchaseSource {
        id,
        name: format!("Source {id}"),
        source_type: warranty_core::SourceType::Online,
        is_active: true,
        created_at: Utc::now(),
    };
    db.sources.lock().unwrap().insert(id, source.clone());
    source
}

/// Insert a registration (and its pending warranty) directly
pub(crate) fn seed_registration(
    db: &MemoryDb,
    user_id: Uuid,
    model: &MattressModel,
    source: &PurchaseSource,
    status: RegistrationStatus,
) -> Uuid {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let purchase_date = now - chrono::Duration::days(10);

    db.registrations.lock().unwrap().insert(
        id,
        ProductRegistration {
            id,
            user_id,
            model_id: model.id,
            source_id: source.id,
            purchase_date,
            received_undamaged: true,
            info_accurate: true,
            status,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        },
    );
    db.warranties.lock().unwrap().insert(
        id,
        Warranty {
            id: Uuid::new_v4(),
            registration_id: id,
            status: WarrantyStatus::Pending,
            start_date: purchase_date,
            end_date: warranty_core::warranty_end_date(purchase_date, model.warranty_months),
            activated_at: None,
            created_at: now,
        },
    );
    id
}

/// Insert a ticket directly
pub(crate) fn seed_ticket(
    db: &MemoryDb,
    user_id: Uuid,
    status: TicketStatus,
    closed_at: Option<DateTime<Utc>>,
) -> Uuid {
    let now = Utc::now();
    let id = Uuid::new_v4();
    db.tickets.lock().unwrap().insert(
        id,
        SupportTicket {
            id,
            user_id,
            subject: "Mattress issue".to_string(),
            status,
            priority: warranty_core::TicketPriority::default(),
            tags: Vec::new(),
            closed_at,
            created_at: now,
            updated_at: now,
        },
    );
    id
}

/// Two upload files with distinct content
pub(crate) fn upload_files() -> Vec<crate::dto::UploadedFile> {
    vec![
        crate::dto::UploadedFile {
            original_filename: "label.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: b"label bytes".to_vec(),
        },
        crate::dto::UploadedFile {
            original_filename: "invoice.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: b"invoice bytes".to_vec(),
        },
    ]
}
