//! Approval workflow of a student profile.
//!
//! Every change to a profile goes through [`StudentProfile::apply`]. Changes a
//! student makes (field edits and documents) send the profile back to
//! `pending` and clear the previous decision; staff actions set the decision
//! or record that the profile was opened. Validation happens before anything
//! is touched, so a rejected mutation leaves the profile as it was.

use chrono::{DateTime, Utc};

use crate::core::error::{AppError, Result};
use crate::features::students::documents::DocumentSlot;
use crate::features::students::models::{
    ApprovalStatus, ExtraDocument, FamilyDetails, Schooling, StudentProfile,
};

/// Profile fields submitted by the student. `None` keeps the stored value,
/// a blank string clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEdit {
    pub personal_email: Option<String>,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub gender: Option<String>,
    pub blood_group: Option<String>,
    pub nationality: Option<String>,
    pub religion: Option<String>,
    pub address: Option<String>,
    /// Replaces the whole block when present
    pub schooling: Option<Schooling>,
    /// Replaces the whole block when present
    pub family: Option<FamilyDetails>,
}

/// An attachment that has been stored and is about to be recorded
#[derive(Debug, Clone, PartialEq)]
pub struct NewExtraDocument {
    pub name: String,
    pub path: String,
    pub size: i64,
    pub original_name: String,
}

/// A staff review decision
#[derive(Debug, Clone, PartialEq)]
pub struct ApprovalDecision {
    status: ApprovalStatus,
    note: String,
}

impl ApprovalDecision {
    /// A rejection must carry a non-blank note.
    pub fn new(status: ApprovalStatus, note: impl Into<String>) -> Result<Self> {
        let note = note.into().trim().to_string();
        if status == ApprovalStatus::Rejected && note.is_empty() {
            return Err(AppError::Validation("Rejection requires a note".to_string()));
        }
        Ok(Self { status, note })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProfileMutation {
    Edit(ProfileEdit),
    /// Fill slots with freshly stored blobs, replacing what they held
    PutDocuments(Vec<(DocumentSlot, String)>),
    RemoveDocument(DocumentSlot),
    AddExtraDocuments(Vec<NewExtraDocument>),
    /// Drop every attachment with this blob reference
    RemoveExtraDocument(String),
    SetApproval(ApprovalDecision),
    MarkViewed,
}

impl ProfileMutation {
    /// Student-originated changes require a new review
    pub fn resets_review(&self) -> bool {
        !matches!(
            self,
            ProfileMutation::SetApproval(_) | ProfileMutation::MarkViewed
        )
    }
}

/// Side effects left to the caller once the mutation is persisted
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationOutcome {
    /// Blobs no longer referenced by the profile
    pub released_blobs: Vec<String>,
}

impl StudentProfile {
    pub fn apply(&mut self, mutation: ProfileMutation, now: DateTime<Utc>) -> Result<MutationOutcome> {
        let resets_review = mutation.resets_review();
        let mut outcome = MutationOutcome::default();

        match mutation {
            ProfileMutation::Edit(edit) => self.apply_edit(edit),
            ProfileMutation::PutDocuments(documents) => {
                if documents.is_empty() {
                    return Err(AppError::Validation("No documents uploaded".to_string()));
                }
                for (slot, blob_ref) in documents {
                    if let Some(previous) = self.documents.put(slot, blob_ref.clone()) {
                        if previous != blob_ref {
                            outcome.released_blobs.push(previous);
                        }
                    }
                }
            }
            ProfileMutation::RemoveDocument(slot) => {
                if let Some(previous) = self.documents.clear(slot) {
                    outcome.released_blobs.push(previous);
                }
            }
            ProfileMutation::AddExtraDocuments(entries) => {
                if entries.is_empty() {
                    return Err(AppError::Validation("No files".to_string()));
                }
                self.extra_documents
                    .extend(entries.into_iter().map(|entry| ExtraDocument {
                        name: entry.name,
                        path: entry.path,
                        uploaded_at: now,
                        size: entry.size,
                        original_name: entry.original_name,
                    }));
            }
            ProfileMutation::RemoveExtraDocument(path) => {
                if path.trim().is_empty() {
                    return Err(AppError::Validation("Missing path".to_string()));
                }
                let before = self.extra_documents.len();
                self.extra_documents.retain(|document| document.path != path);
                if self.extra_documents.len() != before {
                    outcome.released_blobs.push(path);
                }
            }
            ProfileMutation::SetApproval(decision) => {
                if decision.status == ApprovalStatus::Rejected && decision.note.is_empty() {
                    return Err(AppError::Validation("Rejection requires a note".to_string()));
                }
                self.approval_status = decision.status;
                self.approval_note = decision.note;
                self.approval_at = Some(now);
            }
            ProfileMutation::MarkViewed => self.viewed_at = Some(now),
        }

        if resets_review {
            self.reset_review();
        }
        self.updated_at = now;

        Ok(outcome)
    }

    fn apply_edit(&mut self, edit: ProfileEdit) {
        assign(&mut self.personal_email, edit.personal_email);
        assign(&mut self.phone, edit.phone);
        assign(&mut self.dob, edit.dob);
        assign(&mut self.gender, edit.gender);
        assign(&mut self.blood_group, edit.blood_group);
        assign(&mut self.nationality, edit.nationality);
        assign(&mut self.religion, edit.religion);
        assign(&mut self.address, edit.address);
        if let Some(schooling) = edit.schooling {
            self.schooling = schooling;
        }
        if let Some(family) = edit.family {
            self.family = family;
        }
    }

    fn reset_review(&mut self) {
        self.approval_status = ApprovalStatus::Pending;
        self.approval_note.clear();
        self.approval_at = None;
    }
}

fn assign(target: &mut Option<String>, value: Option<String>) {
    if let Some(value) = value {
        let value = value.trim();
        *target = (!value.is_empty()).then(|| value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::students::models::EducationRecord;
    use chrono::Duration;
    use uuid::Uuid;

    fn profile() -> StudentProfile {
        StudentProfile::empty(Uuid::now_v7(), Utc::now())
    }

    fn reviewed(status: ApprovalStatus, note: &str) -> StudentProfile {
        let mut profile = profile();
        profile
            .apply(
                ProfileMutation::SetApproval(ApprovalDecision::new(status, note).unwrap()),
                Utc::now(),
            )
            .unwrap();
        profile
    }

    fn extra(path: &str) -> NewExtraDocument {
        NewExtraDocument {
            name: "X".to_string(),
            path: path.to_string(),
            size: 10,
            original_name: "f.pdf".to_string(),
        }
    }

    fn assert_pending(profile: &StudentProfile) {
        assert_eq!(profile.approval_status, ApprovalStatus::Pending);
        assert_eq!(profile.approval_note, "");
        assert_eq!(profile.approval_at, None);
    }

    #[test]
    fn test_student_mutations_reset_review() {
        let mutations = vec![
            ProfileMutation::Edit(ProfileEdit {
                phone: Some("9876543210".to_string()),
                ..Default::default()
            }),
            ProfileMutation::PutDocuments(vec![(DocumentSlot::Pan, "/uploads/p.pdf".into())]),
            ProfileMutation::RemoveDocument(DocumentSlot::Caste),
            ProfileMutation::AddExtraDocuments(vec![extra("/uploads/1.pdf")]),
            ProfileMutation::RemoveExtraDocument("/uploads/missing.pdf".to_string()),
        ];

        for mutation in mutations {
            let mut profile = reviewed(ApprovalStatus::Rejected, "blurry scan");
            profile.apply(mutation.clone(), Utc::now()).unwrap();
            assert_pending(&profile);

            let mut profile = reviewed(ApprovalStatus::Approved, "");
            profile.apply(mutation, Utc::now()).unwrap();
            assert_pending(&profile);
        }
    }

    #[test]
    fn test_reject_without_note_fails_and_keeps_state() {
        assert!(matches!(
            ApprovalDecision::new(ApprovalStatus::Rejected, "   "),
            Err(AppError::Validation(_))
        ));

        let mut profile = reviewed(ApprovalStatus::Approved, "");
        let before = profile.clone();
        let forged = ProfileMutation::SetApproval(ApprovalDecision {
            status: ApprovalStatus::Rejected,
            note: String::new(),
        });

        assert!(profile.apply(forged, Utc::now()).is_err());
        assert_eq!(profile.approval_status, before.approval_status);
        assert_eq!(profile.approval_at, before.approval_at);
        assert_eq!(profile.updated_at, before.updated_at);
    }

    #[test]
    fn test_reject_with_note_sets_fresh_timestamp() {
        let mut profile = profile();
        let requested_at = Utc::now();
        let decision = ApprovalDecision::new(ApprovalStatus::Rejected, "Upload PAN").unwrap();

        profile
            .apply(ProfileMutation::SetApproval(decision), Utc::now())
            .unwrap();

        assert_eq!(profile.approval_status, ApprovalStatus::Rejected);
        assert_eq!(profile.approval_note, "Upload PAN");
        assert!(profile.approval_at.unwrap() >= requested_at);
    }

    #[test]
    fn test_repeated_decision_converges() {
        let mut profile = profile();
        let first = Utc::now();
        let decision = ApprovalDecision::new(ApprovalStatus::Approved, "ok").unwrap();

        profile
            .apply(ProfileMutation::SetApproval(decision.clone()), first)
            .unwrap();
        profile
            .apply(
                ProfileMutation::SetApproval(decision),
                first + Duration::seconds(5),
            )
            .unwrap();

        assert_eq!(profile.approval_status, ApprovalStatus::Approved);
        assert_eq!(profile.approval_note, "ok");
        assert_eq!(profile.approval_at, Some(first + Duration::seconds(5)));
    }

    #[test]
    fn test_mark_viewed_keeps_decision() {
        let mut profile = reviewed(ApprovalStatus::Approved, "");
        let now = Utc::now();

        profile.apply(ProfileMutation::MarkViewed, now).unwrap();
        profile
            .apply(ProfileMutation::MarkViewed, now + Duration::seconds(1))
            .unwrap();

        assert_eq!(profile.viewed_at, Some(now + Duration::seconds(1)));
        assert_eq!(profile.approval_status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_add_then_remove_extra_document() {
        let mut profile = profile();
        let now = Utc::now();

        profile
            .apply(
                ProfileMutation::AddExtraDocuments(vec![extra("/u/1.pdf")]),
                now,
            )
            .unwrap();
        assert_eq!(profile.extra_documents.len(), 1);
        assert_eq!(profile.extra_documents[0].name, "X");
        assert_eq!(profile.extra_documents[0].uploaded_at, now);

        let outcome = profile
            .apply(
                ProfileMutation::RemoveExtraDocument("/u/1.pdf".to_string()),
                Utc::now(),
            )
            .unwrap();
        assert!(profile.extra_documents.is_empty());
        assert_eq!(outcome.released_blobs, vec!["/u/1.pdf".to_string()]);
    }

    #[test]
    fn test_remove_extra_document_drops_all_matches() {
        let mut profile = profile();
        profile
            .apply(
                ProfileMutation::AddExtraDocuments(vec![
                    extra("/u/1.pdf"),
                    extra("/u/2.pdf"),
                    extra("/u/1.pdf"),
                ]),
                Utc::now(),
            )
            .unwrap();

        profile
            .apply(
                ProfileMutation::RemoveExtraDocument("/u/1.pdf".to_string()),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(profile.extra_documents.len(), 1);
        assert_eq!(profile.extra_documents[0].path, "/u/2.pdf");
    }

    #[test]
    fn test_remove_unknown_extra_document_releases_nothing() {
        let mut profile = profile();
        let outcome = profile
            .apply(
                ProfileMutation::RemoveExtraDocument("/u/none.pdf".to_string()),
                Utc::now(),
            )
            .unwrap();
        assert!(outcome.released_blobs.is_empty());
    }

    #[test]
    fn test_extra_document_input_validation() {
        let mut profile = reviewed(ApprovalStatus::Approved, "");

        assert!(matches!(
            profile.apply(ProfileMutation::AddExtraDocuments(vec![]), Utc::now()),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            profile.apply(
                ProfileMutation::RemoveExtraDocument(" ".to_string()),
                Utc::now()
            ),
            Err(AppError::Validation(_))
        ));
        assert_eq!(profile.approval_status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_overwriting_slot_releases_previous_blob() {
        let mut profile = profile();
        profile
            .apply(
                ProfileMutation::PutDocuments(vec![(DocumentSlot::Tenth, "/uploads/a.pdf".into())]),
                Utc::now(),
            )
            .unwrap();

        let outcome = profile
            .apply(
                ProfileMutation::PutDocuments(vec![(DocumentSlot::Tenth, "/uploads/b.pdf".into())]),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(profile.documents.get(DocumentSlot::Tenth), Some("/uploads/b.pdf"));
        assert_eq!(outcome.released_blobs, vec!["/uploads/a.pdf".to_string()]);
    }

    #[test]
    fn test_remove_empty_slot_is_idempotent() {
        let mut profile = profile();
        let outcome = profile
            .apply(ProfileMutation::RemoveDocument(DocumentSlot::Income), Utc::now())
            .unwrap();
        assert!(outcome.released_blobs.is_empty());
        assert_eq!(profile.documents.get(DocumentSlot::Income), None);
    }

    #[test]
    fn test_edit_semantics() {
        let mut profile = profile();
        profile.phone = Some("111".to_string());
        profile.address = Some("Old street".to_string());

        let tenth = EducationRecord {
            institute: Some("ZPHS".to_string()),
            ..Default::default()
        };
        profile
            .apply(
                ProfileMutation::Edit(ProfileEdit {
                    phone: Some(" 222 ".to_string()),
                    address: Some("".to_string()),
                    schooling: Some(Schooling {
                        tenth: Some(tenth.clone()),
                        ..Default::default()
                    }),
                    ..Default::default()
                }),
                Utc::now(),
            )
            .unwrap();

        assert_eq!(profile.phone.as_deref(), Some("222"));
        assert_eq!(profile.address, None);
        assert_eq!(profile.schooling.tenth, Some(tenth));
        assert_eq!(profile.family, FamilyDetails::default());
    }
}
