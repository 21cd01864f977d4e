//! In-memory stand-ins for the database, blob store and notifier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::core::config::AuthConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::models::{Account, AccountPatch, AccountRole, NewAccount};
use crate::features::auth::repositories::AccountRepository;
use crate::features::students::models::{
    ApprovalStatus, StatusCounts, StudentFilter, StudentListRow, StudentProfile,
};
use crate::features::students::repositories::ProfileRepository;
use crate::features::students::workflow::{MutationOutcome, ProfileMutation};
use crate::modules::notify::{ApprovalNotice, Notifier};
use crate::modules::storage::{generate_blob_name, BlobStore};

pub fn test_auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "test-secret".to_string(),
        token_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        jwt_leeway: Duration::from_secs(0),
    }
}

/// Poll until `condition` holds, for effects that run in detached tasks
pub async fn wait_until(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached in time");
}

// =============================================================================
// ACCOUNTS + PROFILES
// =============================================================================

/// Accounts and profiles kept in memory, with the same rules as the Postgres store
#[derive(Default)]
pub struct InMemoryStore {
    accounts: Mutex<Vec<Account>>,
    profiles: Mutex<HashMap<Uuid, StudentProfile>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push_account(&self, account: NewAccount) -> Account {
        let mut accounts = self.accounts.lock().unwrap();

        // Strictly increasing registration times keep "newest first" deterministic
        let mut created_at = Utc::now();
        if let Some(last) = accounts.last() {
            if created_at <= last.created_at {
                created_at = last.created_at + chrono::Duration::milliseconds(1);
            }
        }

        let account = Account {
            id: Uuid::now_v7(),
            name: account.name,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            course: account.course,
            created_at,
            updated_at: created_at,
        };
        accounts.push(account.clone());
        account
    }

    /// Add an account without a profile
    pub fn insert_account(&self, name: &str, email: &str, role: AccountRole) -> Account {
        self.push_account(NewAccount {
            name: name.to_string(),
            email: email.to_string(),
            password_hash: String::new(),
            role,
            course: "MCA".to_string(),
        })
    }

    pub fn account_count(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }

    pub fn profile(&self, account_id: Uuid) -> Option<StudentProfile> {
        self.profiles.lock().unwrap().get(&account_id).cloned()
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().unwrap();
        Ok(accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn create_with_profile(&self, account: NewAccount) -> Result<Account> {
        if self.find_by_email(&account.email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let created = self.push_account(account);
        self.profiles
            .lock()
            .unwrap()
            .insert(created.id, StudentProfile::empty(created.id, created.created_at));
        Ok(created)
    }

    async fn promote_to_admin(&self, id: Uuid, password_hash: &str) -> Result<()> {
        let mut accounts = self.accounts.lock().unwrap();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| AppError::NotFound(format!("Account {} not found", id)))?;
        account.role = AccountRole::Admin;
        account.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl ProfileRepository for InMemoryStore {
    async fn find_by_account(&self, account_id: Uuid) -> Result<Option<StudentProfile>> {
        Ok(self.profile(account_id))
    }

    async fn apply(
        &self,
        account_id: Uuid,
        account_patch: Option<AccountPatch>,
        mutation: ProfileMutation,
    ) -> Result<(StudentProfile, MutationOutcome)> {
        let mut accounts = self.accounts.lock().unwrap();
        let mut profiles = self.profiles.lock().unwrap();

        let index = accounts
            .iter()
            .position(|a| a.id == account_id)
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        let patch = account_patch.filter(|patch| !patch.is_empty());
        if let Some(email) = patch.as_ref().and_then(|p| p.email.as_ref()) {
            if accounts.iter().any(|a| a.id != account_id && &a.email == email) {
                return Err(AppError::Conflict("Email already registered".to_string()));
            }
        }

        let now = Utc::now();
        let mut profile = profiles
            .get(&account_id)
            .cloned()
            .unwrap_or_else(|| StudentProfile::empty(account_id, now));
        let outcome = profile.apply(mutation, now)?;

        if let Some(patch) = patch {
            patch.apply_to(&mut accounts[index]);
        }
        profiles.insert(account_id, profile.clone());

        Ok((profile, outcome))
    }

    async fn list_students(&self, filter: &StudentFilter) -> Result<(Vec<StudentListRow>, i64)> {
        let accounts = self.accounts.lock().unwrap();
        let profiles = self.profiles.lock().unwrap();

        let mut rows: Vec<StudentListRow> = accounts
            .iter()
            .filter(|a| a.role == AccountRole::Student)
            .filter(|a| filter.matches_search(&a.name, &a.email))
            .map(|a| {
                let profile = profiles.get(&a.id);
                StudentListRow {
                    id: a.id,
                    name: a.name.clone(),
                    email: a.email.clone(),
                    course: a.course.clone(),
                    created_at: a.created_at,
                    approval_status: profile
                        .map(|p| p.approval_status)
                        .unwrap_or(ApprovalStatus::Pending),
                    viewed_at: profile.and_then(|p| p.viewed_at),
                }
            })
            .filter(|row| filter.matches_status(row.approval_status, row.viewed_at))
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = rows.len() as i64;
        let page = rows
            .into_iter()
            .skip(filter.pagination.offset() as usize)
            .take(filter.pagination.limit() as usize)
            .collect();

        Ok((page, total))
    }

    async fn count_by_status(&self) -> Result<StatusCounts> {
        let accounts = self.accounts.lock().unwrap();
        let profiles = self.profiles.lock().unwrap();

        let mut counts = StatusCounts::default();
        let student_profiles = profiles.values().filter(|p| {
            accounts
                .iter()
                .any(|a| a.id == p.account_id && a.role == AccountRole::Student)
        });
        for profile in student_profiles {
            match profile.approval_status {
                ApprovalStatus::Pending => counts.pending += 1,
                ApprovalStatus::Approved => counts.approved += 1,
                ApprovalStatus::Rejected => counts.rejected += 1,
            }
            if profile.viewed_at.is_some() {
                counts.viewed += 1;
            }
        }

        Ok(counts)
    }
}

// =============================================================================
// BLOBS
// =============================================================================

#[derive(Default)]
pub struct InMemoryBlobStore {
    stored: Mutex<Vec<String>>,
    deleted: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
}

impl InMemoryBlobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    pub fn was_deleted(&self, blob_ref: &str) -> bool {
        self.deleted.lock().unwrap().iter().any(|r| r == blob_ref)
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn store(
        &self,
        _data: Vec<u8>,
        original_filename: &str,
        _content_type: &str,
    ) -> std::result::Result<String, AppError> {
        let blob_ref = format!("/uploads/{}", generate_blob_name(original_filename));
        self.stored.lock().unwrap().push(blob_ref.clone());
        Ok(blob_ref)
    }

    async fn delete(&self, blob_ref: &str) -> std::result::Result<(), AppError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Internal("disk unavailable".to_string()));
        }
        self.deleted.lock().unwrap().push(blob_ref.to_string());
        Ok(())
    }
}

// =============================================================================
// NOTIFICATIONS
// =============================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<ApprovalNotice>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }

    pub fn last(&self) -> Option<ApprovalNotice> {
        self.notices.lock().unwrap().last().cloned()
    }

    pub fn fail_notifications(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notice: &ApprovalNotice) -> std::result::Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError("webhook down".to_string()));
        }
        self.notices.lock().unwrap().push(notice.clone());
        Ok(())
    }
}
