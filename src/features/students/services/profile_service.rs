use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::models::{Account, AccountPatch};
use crate::features::auth::repositories::AccountRepository;
use crate::features::students::dtos::{ProfileViewDto, UpdateProfileDto};
use crate::features::students::repositories::ProfileRepository;
use crate::features::students::workflow::{ProfileEdit, ProfileMutation};
use crate::shared::validation::{is_college_email, is_full_name, normalize_email};

/// Student-facing profile reads and edits
pub struct ProfileService {
    accounts: Arc<dyn AccountRepository>,
    profiles: Arc<dyn ProfileRepository>,
}

/// Trimmed value, or `None` when absent or blank
fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl ProfileService {
    pub fn new(accounts: Arc<dyn AccountRepository>, profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { accounts, profiles }
    }

    async fn account(&self, account_id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))
    }

    /// Account and profile of the caller, with empty defaults when no profile exists yet
    pub async fn get_profile(&self, account_id: Uuid) -> Result<ProfileViewDto> {
        let account = self.account(account_id).await?;
        let profile = self.profiles.find_by_account(account_id).await?;
        Ok(ProfileViewDto::new(&account, profile.as_ref()))
    }

    /// Validate and save the profile form, sending the profile back for review
    pub async fn submit_edit(
        &self,
        account_id: Uuid,
        dto: UpdateProfileDto,
    ) -> Result<ProfileViewDto> {
        let personal = dto.personal;

        let name = non_blank(personal.name.as_ref());
        if let Some(name) = &name {
            if !is_full_name(name) {
                return Err(AppError::Validation(
                    "Enter full name (first and last), letters only".to_string(),
                ));
            }
        }

        let email = non_blank(personal.email.as_ref()).map(|email| normalize_email(&email));
        if let Some(email) = &email {
            if !is_college_email(email) {
                return Err(AppError::Validation(
                    "College email must be 10 hex characters + @mits.ac.in (e.g., 24691f00e3@mits.ac.in)"
                        .to_string(),
                ));
            }
        }

        let patch = AccountPatch {
            name,
            email,
            course: non_blank(personal.course.as_ref()),
        };

        let edit = ProfileEdit {
            personal_email: personal.personal_email,
            phone: personal.phone,
            dob: personal.dob,
            gender: personal.gender,
            blood_group: personal.blood_group,
            nationality: personal.nationality,
            religion: personal.religion,
            address: personal.address,
            schooling: dto.schooling,
            family: dto.family,
        };

        let (profile, _) = self
            .profiles
            .apply(account_id, Some(patch), ProfileMutation::Edit(edit))
            .await?;

        info!("Profile {} edited, awaiting review", account_id);

        let account = self.account(account_id).await?;
        Ok(ProfileViewDto::new(&account, Some(&profile)))
    }
}
