use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::models::{Account, AccountRole};
use crate::features::students::models::{
    ApprovalStatus, ExtraDocument, FamilyDetails, NamedDocuments, Schooling, StatusCounts,
    StatusFilter, StudentFilter, StudentListRow, StudentProfile,
};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;

// =============================================================================
// STUDENT LISTING
// =============================================================================

/// Query params for listing students
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct StudentQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size", alias = "limit")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    /// Case-insensitive match on name or email
    pub search: Option<String>,
    /// One of `pending`, `approved`, `rejected`, `viewed` (empty for all)
    pub status: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl StudentQueryParams {
    pub fn to_filter(&self) -> Result<StudentFilter> {
        let status = match self.status.as_deref() {
            Some(status) => status.parse()?,
            None => StatusFilter::All,
        };

        Ok(StudentFilter {
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            status,
            pagination: PaginationQuery::new(self.page, self.page_size),
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentListResponseDto {
    pub items: Vec<StudentListRow>,
    /// Counters over all students, not only this page
    pub counts: StatusCounts,
}

// =============================================================================
// STUDENT DETAIL
// =============================================================================

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfileDto {
    pub personal_email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub address: Option<String>,
    pub schooling: Schooling,
    pub family: FamilyDetails,
    pub documents: NamedDocuments,
    pub extra_documents: Vec<ExtraDocument>,
    pub approval_status: ApprovalStatus,
    pub approval_note: String,
    pub approval_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<StudentProfile> for AdminProfileDto {
    fn from(p: StudentProfile) -> Self {
        Self {
            personal_email: p.personal_email,
            phone: p.phone,
            dob: p.dob,
            gender: p.gender,
            blood_group: p.blood_group,
            nationality: p.nationality,
            religion: p.religion,
            address: p.address,
            schooling: p.schooling,
            family: p.family,
            documents: p.documents,
            extra_documents: p.extra_documents,
            approval_status: p.approval_status,
            approval_note: p.approval_note,
            approval_at: p.approval_at,
            viewed_at: p.viewed_at,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Account (without credential) and its profile
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetailDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: AccountRole,
    pub course: String,
    pub created_at: DateTime<Utc>,
    pub profile: AdminProfileDto,
}

impl StudentDetailDto {
    pub fn new(account: Account, profile: StudentProfile) -> Self {
        Self {
            id: account.id,
            name: account.name,
            email: account.email,
            role: account.role,
            course: account.course,
            created_at: account.created_at,
            profile: profile.into(),
        }
    }
}

// =============================================================================
// APPROVAL
// =============================================================================

/// Request DTO for a review decision
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SetApprovalDto {
    /// Defaults to `approved`
    #[serde(default = "default_decision")]
    pub status: ApprovalStatus,
    /// Required when rejecting
    #[serde(default)]
    pub note: String,
}

fn default_decision() -> ApprovalStatus {
    ApprovalStatus::Approved
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponseDto {
    pub approval_status: ApprovalStatus,
    pub approval_note: String,
    pub approval_at: Option<DateTime<Utc>>,
}
