use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::students::documents::DocumentSlot;

/// Review state of a profile, matching the `approval_status` database enum
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "approval_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One stage of schooling (10th, intermediate, degree)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EducationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_year: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Schooling {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenth: Option<EducationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inter: Option<EducationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<EducationRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FamilyDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub father: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mother: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guardian_contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_income: Option<String>,
}

/// The seven single-occupancy document slots. Each holds at most one blob reference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct NamedDocuments {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aadhar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caste: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub degree: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income: Option<String>,
}

impl NamedDocuments {
    fn slot_mut(&mut self, slot: DocumentSlot) -> &mut Option<String> {
        match slot {
            DocumentSlot::Aadhar => &mut self.aadhar,
            DocumentSlot::Pan => &mut self.pan,
            DocumentSlot::Caste => &mut self.caste,
            DocumentSlot::Tenth => &mut self.tenth,
            DocumentSlot::Inter => &mut self.inter,
            DocumentSlot::Degree => &mut self.degree,
            DocumentSlot::Income => &mut self.income,
        }
    }

    pub fn get(&self, slot: DocumentSlot) -> Option<&str> {
        match slot {
            DocumentSlot::Aadhar => self.aadhar.as_deref(),
            DocumentSlot::Pan => self.pan.as_deref(),
            DocumentSlot::Caste => self.caste.as_deref(),
            DocumentSlot::Tenth => self.tenth.as_deref(),
            DocumentSlot::Inter => self.inter.as_deref(),
            DocumentSlot::Degree => self.degree.as_deref(),
            DocumentSlot::Income => self.income.as_deref(),
        }
    }

    /// Store a reference in the slot, returning the one it replaced
    pub fn put(&mut self, slot: DocumentSlot, blob_ref: String) -> Option<String> {
        self.slot_mut(slot).replace(blob_ref)
    }

    /// Empty the slot, returning the reference it held
    pub fn clear(&mut self, slot: DocumentSlot) -> Option<String> {
        self.slot_mut(slot).take()
    }
}

/// A freely named attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExtraDocument {
    pub name: String,
    /// Blob reference
    pub path: String,
    pub uploaded_at: DateTime<Utc>,
    pub size: i64,
    pub original_name: String,
}

/// Database model for student profiles
#[derive(Debug, Clone, FromRow)]
pub struct StudentProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub personal_email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub address: Option<String>,
    #[sqlx(json)]
    pub schooling: Schooling,
    #[sqlx(json)]
    pub family: FamilyDetails,
    #[sqlx(json)]
    pub documents: NamedDocuments,
    #[sqlx(json)]
    pub extra_documents: Vec<ExtraDocument>,
    pub approval_status: ApprovalStatus,
    pub approval_note: String,
    pub approval_at: Option<DateTime<Utc>>,
    pub viewed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StudentProfile {
    /// A blank profile awaiting review
    pub fn empty(account_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::now_v7(),
            account_id,
            personal_email: None,
            phone: None,
            dob: None,
            gender: None,
            blood_group: None,
            nationality: None,
            religion: None,
            address: None,
            schooling: Schooling::default(),
            family: FamilyDetails::default(),
            documents: NamedDocuments::default(),
            extra_documents: Vec::new(),
            approval_status: ApprovalStatus::Pending,
            approval_note: String::new(),
            approval_at: None,
            viewed_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_returns_superseded_reference() {
        let mut documents = NamedDocuments::default();
        assert_eq!(documents.put(DocumentSlot::Pan, "/uploads/1.pdf".into()), None);
        assert_eq!(
            documents.put(DocumentSlot::Pan, "/uploads/2.pdf".into()),
            Some("/uploads/1.pdf".to_string())
        );
        assert_eq!(documents.get(DocumentSlot::Pan), Some("/uploads/2.pdf"));
    }

    #[test]
    fn test_documents_serialize_only_filled_slots() {
        let mut documents = NamedDocuments::default();
        documents.put(DocumentSlot::Aadhar, "/uploads/a.png".into());

        let json = serde_json::to_value(&documents).unwrap();
        assert_eq!(json, serde_json::json!({ "aadhar": "/uploads/a.png" }));
    }

    #[test]
    fn test_education_record_uses_camel_case() {
        let record: EducationRecord =
            serde_json::from_value(serde_json::json!({ "institute": "ZPHS", "passYear": "2018" }))
                .unwrap();
        assert_eq!(record.pass_year.as_deref(), Some("2018"));
        assert_eq!(record.join_year, None);
    }
}
