use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::students::documents::DocumentSlot;
use crate::features::students::dtos::{is_mime_type_allowed, ALLOWED_MIME_TYPES, MAX_FILE_SIZE};
use crate::features::students::models::{ExtraDocument, NamedDocuments, StudentProfile};
use crate::features::students::repositories::ProfileRepository;
use crate::features::students::workflow::{NewExtraDocument, ProfileMutation};
use crate::modules::storage::{release_blobs, BlobStore};

/// A file read from a multipart request, not yet stored
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Multipart field name
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    fn validate(&self) -> Result<()> {
        if self.data.len() > MAX_FILE_SIZE {
            return Err(AppError::BadRequest(format!(
                "File too large. Maximum size is {} bytes ({} MB)",
                MAX_FILE_SIZE,
                MAX_FILE_SIZE / 1024 / 1024
            )));
        }
        if !is_mime_type_allowed(&self.content_type) {
            return Err(AppError::BadRequest(format!(
                "File type '{}' is not allowed. Allowed types: {}",
                self.content_type,
                ALLOWED_MIME_TYPES.join(", ")
            )));
        }
        Ok(())
    }
}

/// Named slots and extra attachments of a student profile
pub struct DocumentService {
    profiles: Arc<dyn ProfileRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl DocumentService {
    pub fn new(profiles: Arc<dyn ProfileRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { profiles, blobs }
    }

    /// Store every file, releasing the ones already written if a later one fails
    async fn store_all(&self, files: Vec<UploadedFile>) -> Result<Vec<(UploadedFile, String)>> {
        let mut stored = Vec::with_capacity(files.len());

        for mut file in files {
            let data = std::mem::take(&mut file.data);
            let size = data.len();
            match self
                .blobs
                .store(data, &file.file_name, &file.content_type)
                .await
            {
                Ok(blob_ref) => {
                    debug!("Stored upload {} ({} bytes) as {}", file.file_name, size, blob_ref);
                    stored.push((file, blob_ref));
                }
                Err(e) => {
                    let refs = stored.into_iter().map(|(_, blob_ref)| blob_ref).collect();
                    release_blobs(self.blobs.clone(), refs);
                    return Err(e);
                }
            }
        }

        Ok(stored)
    }

    /// Apply a mutation that references freshly stored blobs. If it fails
    /// those blobs are released; otherwise the superseded ones are.
    async fn apply_with_new_blobs(
        &self,
        account_id: Uuid,
        mutation: ProfileMutation,
        new_blobs: Vec<String>,
    ) -> Result<StudentProfile> {
        match self.profiles.apply(account_id, None, mutation).await {
            Ok((profile, outcome)) => {
                release_blobs(self.blobs.clone(), outcome.released_blobs);
                Ok(profile)
            }
            Err(e) => {
                release_blobs(self.blobs.clone(), new_blobs);
                Err(e)
            }
        }
    }

    /// Point slots at stored blobs, replacing (and releasing) what they held
    pub async fn put_named_documents(
        &self,
        account_id: Uuid,
        documents: Vec<(DocumentSlot, String)>,
    ) -> Result<NamedDocuments> {
        let new_blobs = documents.iter().map(|(_, blob_ref)| blob_ref.clone()).collect();
        let profile = self
            .apply_with_new_blobs(account_id, ProfileMutation::PutDocuments(documents), new_blobs)
            .await?;

        info!("Named documents updated for {}", account_id);
        Ok(profile.documents)
    }

    pub async fn put_named_document(
        &self,
        account_id: Uuid,
        slot_key: &str,
        blob_ref: String,
    ) -> Result<NamedDocuments> {
        let slot: DocumentSlot = slot_key.parse()?;
        self.put_named_documents(account_id, vec![(slot, blob_ref)])
            .await
    }

    /// Store one file per slot-named field and record them in a single mutation.
    /// Field names are checked before anything is stored.
    pub async fn upload_named_documents(
        &self,
        account_id: Uuid,
        files: Vec<UploadedFile>,
    ) -> Result<NamedDocuments> {
        if files.is_empty() {
            return Err(AppError::Validation("No documents uploaded".to_string()));
        }

        let slots = files
            .iter()
            .map(|file| file.field.parse::<DocumentSlot>())
            .collect::<Result<Vec<_>>>()?;
        for file in &files {
            file.validate()?;
        }

        let stored = self.store_all(files).await?;
        let documents = slots
            .into_iter()
            .zip(stored)
            .map(|(slot, (_, blob_ref))| (slot, blob_ref))
            .collect();

        self.put_named_documents(account_id, documents).await
    }

    /// Clear a slot and release its blob. An empty slot is not an error.
    pub async fn remove_named_document(
        &self,
        account_id: Uuid,
        slot_key: &str,
    ) -> Result<NamedDocuments> {
        let slot: DocumentSlot = slot_key
            .parse()
            .map_err(|_| AppError::NotFound(format!("Unknown document '{}'", slot_key.trim())))?;

        let (profile, outcome) = self
            .profiles
            .apply(account_id, None, ProfileMutation::RemoveDocument(slot))
            .await?;
        release_blobs(self.blobs.clone(), outcome.released_blobs);

        info!("Document {} removed for {}", slot, account_id);
        Ok(profile.documents)
    }

    /// Append attachments, returning the entries just added
    pub async fn add_extra_documents(
        &self,
        account_id: Uuid,
        entries: Vec<NewExtraDocument>,
    ) -> Result<Vec<ExtraDocument>> {
        let added = entries.len();
        let new_blobs = entries.iter().map(|entry| entry.path.clone()).collect();
        let profile = self
            .apply_with_new_blobs(account_id, ProfileMutation::AddExtraDocuments(entries), new_blobs)
            .await?;

        info!("{} attachment(s) added for {}", added, account_id);
        let start = profile.extra_documents.len().saturating_sub(added);
        Ok(profile.extra_documents[start..].to_vec())
    }

    /// Store `extras` files and label the i-th with `names[i]`, falling back to
    /// the original file name and then to "Attachment".
    pub async fn upload_extra_documents(
        &self,
        account_id: Uuid,
        files: Vec<UploadedFile>,
        names: Vec<String>,
    ) -> Result<Vec<ExtraDocument>> {
        if files.is_empty() {
            return Err(AppError::Validation("No files".to_string()));
        }
        for file in &files {
            file.validate()?;
        }

        let sizes: Vec<i64> = files.iter().map(|file| file.data.len() as i64).collect();
        let stored = self.store_all(files).await?;

        let entries = stored
            .into_iter()
            .zip(sizes)
            .enumerate()
            .map(|(i, ((file, blob_ref), size))| {
                let name = names
                    .get(i)
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .or_else(|| Some(file.file_name.trim()).filter(|name| !name.is_empty()))
                    .unwrap_or("Attachment")
                    .to_string();

                NewExtraDocument {
                    name,
                    path: blob_ref,
                    size,
                    original_name: file.file_name,
                }
            })
            .collect();

        self.add_extra_documents(account_id, entries).await
    }

    /// Remove every attachment with the given reference, returning what remains
    pub async fn remove_extra_document(
        &self,
        account_id: Uuid,
        blob_ref: Option<String>,
    ) -> Result<Vec<ExtraDocument>> {
        let blob_ref = blob_ref
            .filter(|path| !path.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Missing path".to_string()))?;

        let (profile, outcome) = self
            .profiles
            .apply(account_id, None, ProfileMutation::RemoveExtraDocument(blob_ref))
            .await?;
        release_blobs(self.blobs.clone(), outcome.released_blobs);

        Ok(profile.extra_documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::models::AccountRole;
    use crate::features::students::models::ApprovalStatus;
    use crate::features::students::workflow::ApprovalDecision;
    use crate::shared::test_helpers::{wait_until, InMemoryBlobStore, InMemoryStore};

    struct Fixture {
        store: Arc<InMemoryStore>,
        blobs: Arc<InMemoryBlobStore>,
        service: DocumentService,
        account_id: Uuid,
    }

    fn fixture() -> Fixture {
        let store = InMemoryStore::new();
        let blobs = InMemoryBlobStore::new();
        let account = store.insert_account("Ravi Kumar", "ravi@gmail.com", AccountRole::Student);
        let service = DocumentService::new(store.clone(), blobs.clone());
        Fixture {
            store,
            blobs,
            service,
            account_id: account.id,
        }
    }

    fn pdf(field: &str, file_name: &str) -> UploadedFile {
        UploadedFile {
            field: field.to_string(),
            file_name: file_name.to_string(),
            content_type: "application/pdf".to_string(),
            data: b"%PDF-1.4".to_vec(),
        }
    }

    async fn approve(fx: &Fixture) {
        fx.store
            .apply(
                fx.account_id,
                None,
                ProfileMutation::SetApproval(
                    ApprovalDecision::new(ApprovalStatus::Approved, "").unwrap(),
                ),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_upload_named_documents_resets_review() {
        let fx = fixture();
        approve(&fx).await;

        let documents = fx
            .service
            .upload_named_documents(
                fx.account_id,
                vec![pdf("aadhar", "aadhar.pdf"), pdf("pan", "pan.pdf")],
            )
            .await
            .unwrap();

        assert!(documents.aadhar.is_some());
        assert!(documents.pan.is_some());
        assert_eq!(fx.blobs.stored_count(), 2);

        let profile = fx.store.profile(fx.account_id).unwrap();
        assert_eq!(profile.approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_invalid_slot_stores_nothing() {
        let fx = fixture();
        fx.service
            .put_named_document(fx.account_id, "pan", "/uploads/pan.pdf".to_string())
            .await
            .unwrap();

        let err = fx
            .service
            .upload_named_documents(fx.account_id, vec![pdf("ssn", "ssn.pdf")])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = fx
            .service
            .put_named_document(fx.account_id, "ssn", "/uploads/ssn.pdf".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let profile = fx.store.profile(fx.account_id).unwrap();
        assert_eq!(profile.documents.pan.as_deref(), Some("/uploads/pan.pdf"));
        assert_eq!(profile.documents.aadhar, None);
        assert_eq!(fx.blobs.stored_count(), 0);
    }

    #[tokio::test]
    async fn test_rejects_disallowed_type_and_oversized_file() {
        let fx = fixture();

        let mut exe = pdf("pan", "run.exe");
        exe.content_type = "application/x-msdownload".to_string();
        let err = fx
            .service
            .upload_named_documents(fx.account_id, vec![exe])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let mut big = pdf("extras", "big.pdf");
        big.data = vec![0; MAX_FILE_SIZE + 1];
        let err = fx
            .service
            .upload_extra_documents(fx.account_id, vec![big], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(fx.blobs.stored_count(), 0);
    }

    #[tokio::test]
    async fn test_replacing_slot_releases_old_blob() {
        let fx = fixture();
        let first = fx
            .service
            .upload_named_documents(fx.account_id, vec![pdf("tenth", "a.pdf")])
            .await
            .unwrap()
            .tenth
            .unwrap();

        fx.service
            .upload_named_documents(fx.account_id, vec![pdf("tenth", "b.pdf")])
            .await
            .unwrap();

        let blobs = fx.blobs.clone();
        wait_until(|| blobs.was_deleted(&first)).await;
    }

    #[tokio::test]
    async fn test_remove_named_document() {
        let fx = fixture();
        let blob_ref = fx
            .service
            .upload_named_documents(fx.account_id, vec![pdf("income", "income.pdf")])
            .await
            .unwrap()
            .income
            .unwrap();
        approve(&fx).await;

        let documents = fx
            .service
            .remove_named_document(fx.account_id, "income")
            .await
            .unwrap();
        assert_eq!(documents.income, None);
        let blobs = fx.blobs.clone();
        wait_until(|| blobs.was_deleted(&blob_ref)).await;

        // Removing again is a no-op success
        fx.service
            .remove_named_document(fx.account_id, "income")
            .await
            .unwrap();

        let profile = fx.store.profile(fx.account_id).unwrap();
        assert_eq!(profile.approval_status, ApprovalStatus::Pending);
    }

    #[tokio::test]
    async fn test_remove_unknown_slot_is_not_found() {
        let fx = fixture();
        let err = fx
            .service
            .remove_named_document(fx.account_id, "passport")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_blob_delete_failure_is_swallowed() {
        let fx = fixture();
        fx.service
            .put_named_document(fx.account_id, "caste", "/uploads/caste.pdf".to_string())
            .await
            .unwrap();
        fx.blobs.fail_deletes();

        let documents = fx
            .service
            .remove_named_document(fx.account_id, "caste")
            .await
            .unwrap();
        assert_eq!(documents.caste, None);
    }

    #[tokio::test]
    async fn test_add_and_remove_extra_document() {
        let fx = fixture();
        let added = fx
            .service
            .add_extra_documents(
                fx.account_id,
                vec![NewExtraDocument {
                    name: "X".to_string(),
                    path: "/u/1.pdf".to_string(),
                    size: 10,
                    original_name: "f.pdf".to_string(),
                }],
            )
            .await
            .unwrap();
        assert_eq!(added.len(), 1);
        assert_eq!(fx.store.profile(fx.account_id).unwrap().extra_documents.len(), 1);

        let remaining = fx
            .service
            .remove_extra_document(fx.account_id, Some("/u/1.pdf".to_string()))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }

    #[tokio::test]
    async fn test_upload_extras_names_fallback() {
        let fx = fixture();
        let mut unnamed = pdf("extras", "");
        unnamed.content_type = "image/png".to_string();

        let added = fx
            .service
            .upload_extra_documents(
                fx.account_id,
                vec![
                    pdf("extras", "first.pdf"),
                    pdf("extras", "second.pdf"),
                    unnamed,
                ],
                vec!["Transfer certificate".to_string(), " ".to_string()],
            )
            .await
            .unwrap();

        let names: Vec<_> = added.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Transfer certificate", "second.pdf", "Attachment"]);
        assert_eq!(added[0].size, 8);
        assert_eq!(added[1].original_name, "second.pdf");
    }

    #[tokio::test]
    async fn test_extra_document_validation() {
        let fx = fixture();

        let err = fx
            .service
            .upload_extra_documents(fx.account_id, vec![], vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = fx
            .service
            .remove_extra_document(fx.account_id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let remaining = fx
            .service
            .remove_extra_document(fx.account_id, Some("/u/unknown.pdf".to_string()))
            .await
            .unwrap();
        assert!(remaining.is_empty());
    }
}
