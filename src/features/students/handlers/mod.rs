pub mod document_handler;
pub mod profile_handler;

pub use document_handler::{
    __path_delete_attachment, __path_delete_document, __path_upload_attachments,
    __path_upload_documents, delete_attachment, delete_document, upload_attachments,
    upload_documents,
};
pub use profile_handler::{
    __path_get_me, __path_get_my_profile, __path_update_my_profile, get_me, get_my_profile,
    update_my_profile,
};
