use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::students::models::{ExtraDocument, NamedDocuments};

/// Named document upload form for OpenAPI documentation.
/// The handler reads the multipart stream directly; every field is optional
/// and its name selects the slot.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadDocumentsDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub aadhar: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub pan: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub caste: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub tenth: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub inter: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub degree: Option<String>,
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub income: Option<String>,
}

/// Attachment upload form for OpenAPI documentation.
/// `names[i]` labels the i-th file in `extras`.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadAttachmentsDto {
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub extras: Vec<String>,
    pub names: Vec<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DocumentKeyQuery {
    /// Document slot, e.g. `aadhar`
    pub key: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AttachmentPathQuery {
    /// Blob reference of the attachment
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DocumentsResponseDto {
    pub documents: NamedDocuments,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddedAttachmentsResponseDto {
    pub added: Vec<ExtraDocument>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentsResponseDto {
    pub extra_documents: Vec<ExtraDocument>,
}

/// Allowed MIME types for document uploads
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
];

/// Maximum size of a single uploaded file (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Upper bound on files in one upload request
pub const MAX_FILES_PER_REQUEST: usize = 10;

pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}
