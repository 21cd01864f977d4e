use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::*;
use crate::features::auth::models::Account;
use crate::features::auth::repositories::AccountRepository;
use crate::features::students::repositories::ProfileRepository;
use crate::features::students::workflow::{ApprovalDecision, ProfileMutation};
use crate::modules::notify::{self, ApprovalNotice, Notifier};

/// Staff review of student profiles
pub struct AdminService {
    accounts: Arc<dyn AccountRepository>,
    profiles: Arc<dyn ProfileRepository>,
    notifier: Arc<dyn Notifier>,
}

impl AdminService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        profiles: Arc<dyn ProfileRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            accounts,
            profiles,
            notifier,
        }
    }

    async fn account(&self, account_id: Uuid) -> Result<Account> {
        self.accounts
            .find_by_id(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Not found".to_string()))
    }

    /// One page of students with the global status counters.
    /// Returns the response and the filtered total.
    pub async fn list_students(
        &self,
        params: &StudentQueryParams,
    ) -> Result<(StudentListResponseDto, i64)> {
        let filter = params.to_filter()?;

        let (items, total) = self.profiles.list_students(&filter).await?;
        let counts = self.profiles.count_by_status().await?;

        Ok((StudentListResponseDto { items, counts }, total))
    }

    /// Account and profile of one student. Opening it records `viewed_at`.
    pub async fn get_student_detail(&self, account_id: Uuid) -> Result<StudentDetailDto> {
        let account = self.account(account_id).await?;

        let (profile, _) = self
            .profiles
            .apply(account_id, None, ProfileMutation::MarkViewed)
            .await?;

        Ok(StudentDetailDto::new(account, profile))
    }

    /// Record a review decision and notify the student in the background
    pub async fn set_approval(
        &self,
        account_id: Uuid,
        dto: SetApprovalDto,
    ) -> Result<ApprovalResponseDto> {
        let decision = ApprovalDecision::new(dto.status, dto.note)?;
        let account = self.account(account_id).await?;

        let (profile, _) = self
            .profiles
            .apply(account_id, None, ProfileMutation::SetApproval(decision))
            .await?;

        info!(
            "Profile {} marked {}",
            account_id, profile.approval_status
        );

        notify::dispatch(
            self.notifier.clone(),
            ApprovalNotice {
                account_id,
                name: account.name,
                email: account.email,
                status: profile.approval_status.to_string(),
                note: profile.approval_note.clone(),
                decided_at: profile.approval_at,
            },
        );

        Ok(ApprovalResponseDto {
            approval_status: profile.approval_status,
            approval_note: profile.approval_note,
            approval_at: profile.approval_at,
        })
    }
}
