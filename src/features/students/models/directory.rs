use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use super::ApprovalStatus;
use crate::core::error::AppError;
use crate::shared::types::PaginationQuery;

/// Status filter of the staff listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Status(ApprovalStatus),
    /// Profiles a reviewer has opened at least once
    Viewed,
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" => Ok(StatusFilter::All),
            "pending" => Ok(StatusFilter::Status(ApprovalStatus::Pending)),
            "approved" => Ok(StatusFilter::Status(ApprovalStatus::Approved)),
            "rejected" => Ok(StatusFilter::Status(ApprovalStatus::Rejected)),
            "viewed" => Ok(StatusFilter::Viewed),
            other => Err(AppError::Validation(format!(
                "Invalid status filter '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Case-insensitive substring of name or email
    pub search: Option<String>,
    pub status: StatusFilter,
    pub pagination: PaginationQuery,
}

/// In-memory counterpart of the SQL filter, used by the test store
#[cfg(test)]
impl StudentFilter {
    pub fn matches_search(&self, name: &str, email: &str) -> bool {
        match &self.search {
            None => true,
            Some(needle) => {
                let needle = needle.to_lowercase();
                name.to_lowercase().contains(&needle) || email.to_lowercase().contains(&needle)
            }
        }
    }

    pub fn matches_status(&self, status: ApprovalStatus, viewed_at: Option<DateTime<Utc>>) -> bool {
        match self.status {
            StatusFilter::All => true,
            StatusFilter::Status(wanted) => status == wanted,
            StatusFilter::Viewed => viewed_at.is_some(),
        }
    }
}

/// One row of the staff listing
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentListRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub course: String,
    pub created_at: DateTime<Utc>,
    pub approval_status: ApprovalStatus,
    pub viewed_at: Option<DateTime<Utc>>,
}

/// Global counters shown above the listing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StatusCounts {
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
    pub viewed: i64,
}
