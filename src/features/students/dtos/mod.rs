mod document_dto;
mod profile_dto;

pub use document_dto::*;
pub use profile_dto::*;
