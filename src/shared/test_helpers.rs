//! In-memory doubles for the store, blob storage and mail transport.
//!
//! Transactions work on a snapshot of the shared state and swap it in on
//! commit, so a dropped or rolled-back transaction leaves no trace. Activity
//! log rows live outside the transactional state, as they do in Postgres
//! where they are written on the pool rather than inside a unit of work.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, response::Response, Router};
use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::{SafeEmail, Username};
use fake::faker::name::en::Name;
use fake::Fake;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::store::{PortalStore, StoreTx};
use crate::features::audit::models::{
    AuditAction, AuditEntry, AuditEntryView, AuditFilter, AuditStats, NewAuditEntry,
};
use crate::features::auth::model::{AuthenticatedUser, RequestContext};
use crate::features::auth::{CsrfTokenStore, HmacCsrfTokenStore};
use crate::features::files::models::{
    FileWithAccess, NewDownloadLog, NewPayrollFile, PayrollFile,
};
use crate::features::auth::CredentialHasher;
use crate::features::users::models::{NewUser, User, UserCredentials, UserOverview, UserRole};
use crate::modules::mailer::MailTransport;
use crate::modules::storage::BlobStorage;

pub const TEST_CSRF_SECRET: &str = "test-csrf-secret";

// =============================================================================
// STORE
// =============================================================================

/// A single (file, user) read grant row
#[derive(Debug, Clone, PartialEq)]
pub struct FileAccess {
    pub file_id: Uuid,
    pub user_id: Uuid,
    pub granted_by: Uuid,
    pub granted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    users: HashMap<Uuid, User>,
    files: HashMap<Uuid, PayrollFile>,
    grants: HashMap<(Uuid, Uuid), FileAccess>,
    downloads: Vec<NewDownloadLog>,
    password_hashes: HashMap<Uuid, String>,
}

impl MemoryState {
    fn sorted_files<'a>(files: impl Iterator<Item = &'a PayrollFile>) -> Vec<PayrollFile> {
        let mut files: Vec<PayrollFile> = files.cloned().collect();
        files.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at).then(b.id.cmp(&a.id)));
        files
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
    audit: Mutex<Vec<AuditEntry>>,
    /// 1-based index of the file insert that fails within the next transaction
    fail_file_insert_at: Mutex<Option<usize>>,
    fail_next_commit: AtomicBool,
    fail_audit_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap()
    }

    pub fn add_user(&self, role: UserRole, active: bool) -> User {
        self.add_named_user(&Name().fake::<String>(), role, active)
    }

    pub fn add_named_user(&self, full_name: &str, role: UserRole, active: bool) -> User {
        let user = User {
            id: Uuid::now_v7(),
            username: Username().fake(),
            email: SafeEmail().fake(),
            full_name: full_name.to_string(),
            employee_id: Some(format!("EMP{:04}", (1..9999).fake::<u32>())),
            role,
            is_active: active,
            created_at: Utc::now(),
        };
        self.state().users.insert(user.id, user.clone());
        user
    }

    /// Insert an active file row directly, bypassing the upload path
    pub fn add_file(&self, title: &str, uploaded_by: Uuid) -> PayrollFile {
        let id = Uuid::now_v7();
        let file = PayrollFile {
            id,
            title: title.to_string(),
            description: None,
            original_filename: format!("{}.pdf", title),
            stored_path: format!("payroll_{}.pdf", id),
            size_bytes: 1024,
            mime_type: "application/pdf".to_string(),
            pay_period: None,
            uploaded_by,
            uploaded_at: Utc::now(),
            download_count: 0,
            is_active: true,
        };
        self.state().files.insert(file.id, file.clone());
        file
    }

    pub fn add_grant(&self, file_id: Uuid, user_id: Uuid, granted_by: Uuid) {
        self.state().grants.insert(
            (file_id, user_id),
            FileAccess {
                file_id,
                user_id,
                granted_by,
                granted_at: Utc::now(),
            },
        );
    }

    pub fn set_file_active(&self, file_id: Uuid, active: bool) {
        if let Some(file) = self.state().files.get_mut(&file_id) {
            file.is_active = active;
        }
    }

    pub fn set_password_hash(&self, user_id: Uuid, digest: &str) {
        self.state().password_hashes.insert(user_id, digest.to_string());
    }

    pub fn password_hash(&self, user_id: Uuid) -> Option<String> {
        self.state().password_hashes.get(&user_id).cloned()
    }

    pub fn find_by_username(&self, username: &str) -> Option<User> {
        self.state()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn set_active(&self, user_id: Uuid, active: bool) {
        if let Some(user) = self.state().users.get_mut(&user_id) {
            user.is_active = active;
        }
    }

    pub fn file(&self, file_id: Uuid) -> Option<PayrollFile> {
        self.state().files.get(&file_id).cloned()
    }

    pub fn files(&self) -> Vec<PayrollFile> {
        let state = self.state();
        MemoryState::sorted_files(state.files.values())
    }

    pub fn grants(&self) -> Vec<FileAccess> {
        self.state().grants.values().cloned().collect()
    }

    pub fn grants_for_file(&self, file_id: Uuid) -> Vec<FileAccess> {
        self.state()
            .grants
            .values()
            .filter(|g| g.file_id == file_id)
            .cloned()
            .collect()
    }

    pub fn download_count(&self) -> usize {
        self.state().downloads.len()
    }

    /// Append an activity row with an explicit timestamp
    pub fn add_audit_at(&self, action: AuditAction, created_at: DateTime<Utc>) -> AuditEntry {
        let entry = AuditEntry {
            id: Uuid::now_v7(),
            user_id: None,
            action,
            description: format!("seeded {}", action),
            ip_address: None,
            user_agent: None,
            created_at,
        };
        self.audit.lock().unwrap().push(entry.clone());
        entry
    }

    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.lock().unwrap().clone()
    }

    pub fn audit_entries_for(&self, action: AuditAction) -> Vec<AuditEntry> {
        self.audit_entries()
            .into_iter()
            .filter(|e| e.action == action)
            .collect()
    }

    pub fn fail_file_insert_at(&self, nth: usize) {
        *self.fail_file_insert_at.lock().unwrap() = Some(nth);
    }

    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    pub fn fail_audit_writes(&self) {
        self.fail_audit_writes.store(true, Ordering::SeqCst);
    }

    fn audit_view(&self, entry: &AuditEntry) -> AuditEntryView {
        let user = entry
            .user_id
            .and_then(|id| self.state().users.get(&id).cloned());
        AuditEntryView {
            id: entry.id,
            user_id: entry.user_id,
            action: entry.action,
            description: entry.description.clone(),
            ip_address: entry.ip_address.clone(),
            user_agent: entry.user_agent.clone(),
            created_at: entry.created_at,
            full_name: user.as_ref().map(|u| u.full_name.clone()),
            username: user.as_ref().map(|u| u.username.clone()),
            role: user.map(|u| u.role),
        }
    }

    fn matches(filter: &AuditFilter, view: &AuditEntryView) -> bool {
        if filter.action.is_some_and(|a| a != view.action) {
            return false;
        }
        if filter.user_id.is_some() && filter.user_id != view.user_id {
            return false;
        }
        if filter
            .date
            .is_some_and(|d| view.created_at.date_naive() != d)
        {
            return false;
        }
        match filter.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                view.description.to_lowercase().contains(&term)
                    || view.action.as_str().contains(&term)
                    || view
                        .full_name
                        .as_deref()
                        .is_some_and(|n| n.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

#[async_trait]
impl PortalStore for MemoryStore {
    async fn begin(&self) -> Result<Box<dyn StoreTx>> {
        let working = self.state().clone();
        Ok(Box::new(MemoryTx {
            working,
            shared: self.state.clone(),
            file_inserts: 0,
            fail_file_insert_at: self.fail_file_insert_at.lock().unwrap().take(),
            fail_commit: self.fail_next_commit.swap(false, Ordering::SeqCst),
        }))
    }

    async fn find_user(&self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.state().users.get(&user_id).cloned())
    }

    async fn list_user_overviews(&self) -> Result<Vec<UserOverview>> {
        let state = self.state().clone();
        let audit = self.audit_entries();
        let mut users: Vec<UserOverview> = state
            .users
            .values()
            .map(|u| UserOverview {
                id: u.id,
                username: u.username.clone(),
                email: u.email.clone(),
                full_name: u.full_name.clone(),
                employee_id: u.employee_id.clone(),
                role: u.role,
                is_active: u.is_active,
                created_at: u.created_at,
                accessible_files: state
                    .grants
                    .values()
                    .filter(|g| {
                        g.user_id == u.id
                            && state.files.get(&g.file_id).is_some_and(|f| f.is_active)
                    })
                    .count() as i64,
                total_downloads: state.downloads.iter().filter(|d| d.user_id == u.id).count()
                    as i64,
                last_activity: audit
                    .iter()
                    .filter(|e| e.user_id == Some(u.id))
                    .map(|e| e.created_at)
                    .max(),
            })
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(users)
    }

    async fn list_active_regular_users(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self
            .state()
            .users
            .values()
            .filter(|u| u.is_active && u.role == UserRole::User)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }

    async fn set_user_active(&self, user_id: Uuid, active: bool) -> Result<bool> {
        Ok(match self.state().users.get_mut(&user_id) {
            Some(user) => {
                user.is_active = active;
                true
            }
            None => false,
        })
    }

    async fn find_active_credentials(&self, username: &str) -> Result<Option<UserCredentials>> {
        let state = self.state();
        Ok(state
            .users
            .values()
            .find(|u| u.username == username && u.is_active)
            .map(|user| UserCredentials {
                user: user.clone(),
                password_hash: state.password_hashes.get(&user.id).cloned(),
            }))
    }

    async fn insert_user(&self, user: &NewUser) -> Result<Option<User>> {
        let mut state = self.state();
        let taken = state.users.values().any(|u| {
            u.username == user.username
                || u.email == user.email
                || (user.employee_id.is_some() && u.employee_id == user.employee_id)
        });
        if taken {
            return Ok(None);
        }

        let created = User {
            id: Uuid::now_v7(),
            username: user.username.clone(),
            email: user.email.clone(),
            full_name: user.full_name.clone(),
            employee_id: user.employee_id.clone(),
            role: user.role,
            is_active: true,
            created_at: Utc::now(),
        };
        state.users.insert(created.id, created.clone());
        state
            .password_hashes
            .insert(created.id, user.password_hash.clone());
        Ok(Some(created))
    }

    async fn set_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<bool> {
        let mut state = self.state();
        if !state.users.contains_key(&user_id) {
            return Ok(false);
        }
        state
            .password_hashes
            .insert(user_id, password_hash.to_string());
        Ok(true)
    }

    async fn find_file(&self, file_id: Uuid) -> Result<Option<PayrollFile>> {
        Ok(self.state().files.get(&file_id).cloned())
    }

    async fn grant_exists(&self, file_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.state().grants.contains_key(&(file_id, user_id)))
    }

    async fn list_active_files(&self) -> Result<Vec<PayrollFile>> {
        let state = self.state();
        Ok(MemoryState::sorted_files(
            state.files.values().filter(|f| f.is_active),
        ))
    }

    async fn list_granted_files(&self, user_id: Uuid) -> Result<Vec<PayrollFile>> {
        let state = self.state();
        let granted: HashSet<Uuid> = state
            .grants
            .values()
            .filter(|g| g.user_id == user_id)
            .map(|g| g.file_id)
            .collect();
        Ok(MemoryState::sorted_files(
            state
                .files
                .values()
                .filter(|f| f.is_active && granted.contains(&f.id)),
        ))
    }

    async fn list_grantees(&self, file_id: Uuid) -> Result<Vec<User>> {
        let state = self.state();
        let mut users: Vec<User> = state
            .grants
            .values()
            .filter(|g| g.file_id == file_id)
            .filter_map(|g| state.users.get(&g.user_id))
            .filter(|u| u.is_active)
            .cloned()
            .collect();
        users.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(users)
    }

    async fn list_files_with_access(&self) -> Result<Vec<FileWithAccess>> {
        let state = self.state();
        Ok(MemoryState::sorted_files(state.files.values().filter(|f| f.is_active))
            .into_iter()
            .map(|f| {
                let mut names: Vec<String> = state
                    .grants
                    .values()
                    .filter(|g| g.file_id == f.id)
                    .filter_map(|g| state.users.get(&g.user_id))
                    .filter(|u| u.is_active)
                    .map(|u| u.full_name.clone())
                    .collect();
                names.sort();
                FileWithAccess {
                    id: f.id,
                    title: f.title,
                    description: f.description,
                    original_filename: f.original_filename,
                    size_bytes: f.size_bytes,
                    pay_period: f.pay_period,
                    uploaded_by_name: state.users.get(&f.uploaded_by).map(|u| u.full_name.clone()),
                    uploaded_at: f.uploaded_at,
                    download_count: f.download_count,
                    access_count: names.len() as i64,
                    access_users: (!names.is_empty()).then(|| names.join(", ")),
                }
            })
            .collect())
    }

    async fn insert_audit_entry(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        if self.fail_audit_writes.load(Ordering::SeqCst) {
            return Err(AppError::Persistence("activity log unavailable".to_string()));
        }
        let row = AuditEntry {
            id: Uuid::now_v7(),
            user_id: entry.user_id,
            action: entry.action,
            description: entry.description,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: Utc::now(),
        };
        self.audit.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn query_audit_entries(
        &self,
        filter: &AuditFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<AuditEntryView>, i64)> {
        let mut views: Vec<AuditEntryView> = self
            .audit_entries()
            .iter()
            .map(|e| self.audit_view(e))
            .filter(|v| Self::matches(filter, v))
            .collect();
        views.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = views.len() as i64;
        let page = views
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn audit_stats(&self, now: DateTime<Utc>) -> Result<AuditStats> {
        let entries = self.audit_entries();
        let today = now.date_naive();
        let since = now - Duration::hours(24);
        Ok(AuditStats {
            total: entries.len() as i64,
            today: entries
                .iter()
                .filter(|e| e.created_at.date_naive() >= today)
                .count() as i64,
            unique_users: entries
                .iter()
                .filter_map(|e| e.user_id)
                .collect::<HashSet<_>>()
                .len() as i64,
            downloads_last_24h: entries
                .iter()
                .filter(|e| e.action == AuditAction::FileDownload && e.created_at >= since)
                .count() as i64,
        })
    }

    async fn distinct_audit_actions(&self) -> Result<Vec<String>> {
        let mut actions: Vec<String> = self
            .audit_entries()
            .iter()
            .map(|e| e.action.as_str().to_string())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        actions.sort();
        Ok(actions)
    }

    async fn delete_audit_entries_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut audit = self.audit.lock().unwrap();
        let before = audit.len();
        audit.retain(|e| e.created_at >= cutoff);
        Ok((before - audit.len()) as u64)
    }
}

pub struct MemoryTx {
    working: MemoryState,
    shared: Arc<Mutex<MemoryState>>,
    file_inserts: usize,
    fail_file_insert_at: Option<usize>,
    fail_commit: bool,
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn find_user(&mut self, user_id: Uuid) -> Result<Option<User>> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn find_file(&mut self, file_id: Uuid) -> Result<Option<PayrollFile>> {
        Ok(self.working.files.get(&file_id).cloned())
    }

    async fn insert_file(&mut self, file: &NewPayrollFile) -> Result<PayrollFile> {
        self.file_inserts += 1;
        if self.fail_file_insert_at == Some(self.file_inserts) {
            return Err(AppError::Persistence(format!(
                "injected failure on file insert {}",
                self.file_inserts
            )));
        }
        let row = PayrollFile {
            id: Uuid::now_v7(),
            title: file.title.clone(),
            description: file.description.clone(),
            original_filename: file.original_filename.clone(),
            stored_path: file.stored_path.clone(),
            size_bytes: file.size_bytes,
            mime_type: file.mime_type.clone(),
            pay_period: file.pay_period.clone(),
            uploaded_by: file.uploaded_by,
            uploaded_at: Utc::now(),
            download_count: 0,
            is_active: true,
        };
        self.working.files.insert(row.id, row.clone());
        Ok(row)
    }

    async fn deactivate_file(&mut self, file_id: Uuid) -> Result<bool> {
        Ok(match self.working.files.get_mut(&file_id) {
            Some(file) if file.is_active => {
                file.is_active = false;
                true
            }
            _ => false,
        })
    }

    async fn insert_grant(&mut self, file_id: Uuid, user_id: Uuid, granted_by: Uuid) -> Result<bool> {
        if self.working.grants.contains_key(&(file_id, user_id)) {
            return Ok(false);
        }
        self.working.grants.insert(
            (file_id, user_id),
            FileAccess {
                file_id,
                user_id,
                granted_by,
                granted_at: Utc::now(),
            },
        );
        Ok(true)
    }

    async fn delete_grant(&mut self, file_id: Uuid, user_id: Uuid) -> Result<bool> {
        Ok(self.working.grants.remove(&(file_id, user_id)).is_some())
    }

    async fn delete_grants_for_file(&mut self, file_id: Uuid) -> Result<u64> {
        let before = self.working.grants.len();
        self.working.grants.retain(|(f, _), _| *f != file_id);
        Ok((before - self.working.grants.len()) as u64)
    }

    async fn record_download(&mut self, download: &NewDownloadLog) -> Result<()> {
        let file = self
            .working
            .files
            .get_mut(&download.file_id)
            .ok_or_else(|| AppError::NotFound("File not found".to_string()))?;
        file.download_count += 1;
        self.working.downloads.push(download.clone());
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        if self.fail_commit {
            return Err(AppError::Persistence("injected commit failure".to_string()));
        }
        *self.shared.lock().unwrap() = self.working;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

// =============================================================================
// BLOB STORAGE
// =============================================================================

#[derive(Default)]
pub struct MemoryBlobStorage {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    content_types: Mutex<HashMap<String, String>>,
    writes: AtomicUsize,
    /// 1-based index of the write that fails
    fail_write_at: Mutex<Option<usize>>,
}

impl MemoryBlobStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_write_at(&self, nth: usize) {
        *self.fail_write_at.lock().unwrap() = Some(nth);
    }

    pub fn put(&self, key: &str, data: &[u8]) {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.content_types.lock().unwrap().get(key).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl BlobStorage for MemoryBlobStorage {
    async fn write(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let nth = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_write_at.lock().unwrap() == Some(nth) {
            return Err(AppError::storage(format!("injected write failure for {}", key)));
        }
        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(key) {
            return Err(AppError::storage(format!("{} already exists", key)));
        }
        objects.insert(key.to_string(), data.to_vec());
        self.content_types
            .lock()
            .unwrap()
            .insert(key.to_string(), content_type.to_string());
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Stored file {} not found", key)))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}

// =============================================================================
// MAIL
// =============================================================================

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html_body: String,
}

/// Records every message; addresses in `failing` report delivery failure
#[derive(Default)]
pub struct RecordingMailTransport {
    sent: Mutex<Vec<SentMail>>,
    failing: Mutex<HashSet<String>>,
}

impl RecordingMailTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, address: &str) {
        self.failing.lock().unwrap().insert(address.to_string());
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> bool {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        !self.failing.lock().unwrap().contains(to)
    }
}

// =============================================================================
// PASSWORDS
// =============================================================================

/// Reversible stand-in for Argon2 so service tests stay fast
pub struct PlainHasher;

impl PlainHasher {
    pub fn digest(password: &str) -> String {
        format!("plain${}", password)
    }
}

impl CredentialHasher for PlainHasher {
    fn hash(&self, password: &str) -> Result<String> {
        Ok(Self::digest(password))
    }

    fn verify(&self, password: &str, digest: &str) -> bool {
        Self::digest(password) == digest
    }
}

pub fn test_hasher() -> Arc<dyn CredentialHasher> {
    Arc::new(PlainHasher)
}

// =============================================================================
// REQUEST CONTEXT
// =============================================================================

/// Context for `user` with a valid CSRF token for its session
pub fn context_for(user: &User) -> RequestContext {
    let session_id = format!("session-{}", user.id);
    let token = HmacCsrfTokenStore::new(TEST_CSRF_SECRET).issue_token(&session_id);
    RequestContext::new(AuthenticatedUser::from_user(user, session_id)).with_csrf_token(token)
}

/// Context for `user` without any CSRF token
pub fn context_without_csrf(user: &User) -> RequestContext {
    RequestContext::new(AuthenticatedUser::from_user(user, format!("session-{}", user.id)))
}

pub fn test_csrf_store() -> Arc<dyn CsrfTokenStore> {
    Arc::new(HmacCsrfTokenStore::new(TEST_CSRF_SECRET))
}

// =============================================================================
// ROUTER
// =============================================================================

pub fn create_admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        id: Uuid::now_v7(),
        username: "admin".to_string(),
        full_name: "Portal Admin".to_string(),
        email: "admin@example.com".to_string(),
        role: UserRole::Admin,
        session_id: "test-session".to_string(),
    }
}

async fn inject_admin_middleware(mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(create_admin_user());
    next.run(request).await
}

pub fn with_admin_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_admin_middleware))
}
