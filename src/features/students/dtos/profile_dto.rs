use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::auth::models::{Account, AccountSummary};
use crate::features::students::models::{
    ApprovalStatus, ExtraDocument, FamilyDetails, NamedDocuments, Schooling, StudentProfile,
};

/// Personal section of the profile form
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetailsDto {
    /// Full name (first and last, letters only)
    pub name: Option<String>,
    /// College email, e.g. `24691f00e3@mits.ac.in`
    pub email: Option<String>,
    pub course: Option<String>,
    pub personal_email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub address: Option<String>,
}

/// Request DTO for `PUT /api/students/me`
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileDto {
    #[serde(default)]
    pub personal: PersonalDetailsDto,
    pub schooling: Option<Schooling>,
    pub family: Option<FamilyDetails>,
}

/// A student's own view of account and profile. Missing values render as
/// empty strings and empty blocks.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileViewDto {
    pub user: AccountSummary,
    pub course: String,
    pub personal_email: String,
    pub phone: String,
    pub dob: String,
    pub gender: String,
    pub blood_group: String,
    pub nationality: String,
    pub religion: String,
    pub address: String,
    pub schooling: Schooling,
    pub family: FamilyDetails,
    pub documents: NamedDocuments,
    pub extra_documents: Vec<ExtraDocument>,
    pub approval_status: ApprovalStatus,
    pub approval_note: String,
    pub approval_at: Option<DateTime<Utc>>,
}

impl ProfileViewDto {
    pub fn new(account: &Account, profile: Option<&StudentProfile>) -> Self {
        let text = |field: fn(&StudentProfile) -> &Option<String>| {
            profile
                .and_then(|p| field(p).clone())
                .unwrap_or_default()
        };

        Self {
            user: AccountSummary::from(account),
            course: account.course.clone(),
            personal_email: text(|p| &p.personal_email),
            phone: text(|p| &p.phone),
            dob: text(|p| &p.dob),
            gender: text(|p| &p.gender),
            blood_group: text(|p| &p.blood_group),
            nationality: text(|p| &p.nationality),
            religion: text(|p| &p.religion),
            address: text(|p| &p.address),
            schooling: profile.map(|p| p.schooling.clone()).unwrap_or_default(),
            family: profile.map(|p| p.family.clone()).unwrap_or_default(),
            documents: profile.map(|p| p.documents.clone()).unwrap_or_default(),
            extra_documents: profile
                .map(|p| p.extra_documents.clone())
                .unwrap_or_default(),
            approval_status: profile.map(|p| p.approval_status).unwrap_or_default(),
            approval_note: profile
                .map(|p| p.approval_note.clone())
                .unwrap_or_default(),
            approval_at: profile.and_then(|p| p.approval_at),
        }
    }
}
