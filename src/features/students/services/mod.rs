mod document_service;
mod profile_service;

pub use document_service::{DocumentService, UploadedFile};
pub use profile_service::ProfileService;
