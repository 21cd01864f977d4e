use axum::{
    extract::{multipart::Field, Multipart, Query, State},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::students::dtos::{
    AddedAttachmentsResponseDto, AttachmentPathQuery, AttachmentsResponseDto, DocumentKeyQuery,
    DocumentsResponseDto, UploadAttachmentsDto, UploadDocumentsDto, MAX_FILES_PER_REQUEST,
};
use crate::features::students::services::{DocumentService, UploadedFile};
use crate::shared::types::ApiResponse;

async fn read_file(field: Field<'_>) -> Result<UploadedFile> {
    let name = field.name().unwrap_or("").to_string();
    let file_name = field.file_name().unwrap_or("").to_string();
    let content_type = field
        .content_type()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let data = field.bytes().await.map_err(|e| {
        debug!("Failed to read file bytes: {}", e);
        AppError::BadRequest(format!("Failed to read file data: {}", e))
    })?;

    Ok(UploadedFile {
        field: name,
        file_name,
        content_type,
        data: data.to_vec(),
    })
}

fn check_file_count(files: &[UploadedFile]) -> Result<()> {
    if files.len() >= MAX_FILES_PER_REQUEST {
        return Err(AppError::BadRequest(format!(
            "Too many files. At most {} per request",
            MAX_FILES_PER_REQUEST
        )));
    }
    Ok(())
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    debug!("Failed to read multipart field: {}", e);
    AppError::BadRequest(format!("Failed to read multipart data: {}", e))
}

/// Upload or replace named documents
///
/// Each file field is named after the slot it fills
/// (`aadhar`, `pan`, `caste`, `tenth`, `inter`, `degree`, `income`).
#[utoipa::path(
    post,
    path = "/api/students/me/documents",
    tag = "students",
    request_body(
        content = UploadDocumentsDto,
        content_type = "multipart/form-data",
        description = "One file per document slot",
    ),
    responses(
        (status = 200, description = "Documents stored", body = ApiResponse<DocumentsResponseDto>),
        (status = 400, description = "Unknown slot, invalid file or no file"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_documents(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<DocumentsResponseDto>>> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.file_name().is_none() {
            debug!("Ignoring non-file field: {:?}", field.name());
            continue;
        }
        check_file_count(&files)?;
        files.push(read_file(field).await?);
    }

    let documents = service
        .upload_named_documents(user.account_id, files)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(DocumentsResponseDto { documents }),
        None,
        None,
    )))
}

/// Remove a named document
#[utoipa::path(
    delete,
    path = "/api/students/me/documents",
    tag = "students",
    params(DocumentKeyQuery),
    responses(
        (status = 200, description = "Document removed", body = ApiResponse<DocumentsResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown document key")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_document(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<DocumentKeyQuery>,
) -> Result<Json<ApiResponse<DocumentsResponseDto>>> {
    let documents = service
        .remove_named_document(user.account_id, query.key.as_deref().unwrap_or(""))
        .await?;

    Ok(Json(ApiResponse::success(
        Some(DocumentsResponseDto { documents }),
        None,
        None,
    )))
}

/// Add extra attachments
///
/// Files are sent as repeated `extras` fields; the optional `names` fields
/// label them in order.
#[utoipa::path(
    post,
    path = "/api/students/me/attachments",
    tag = "students",
    request_body(
        content = UploadAttachmentsDto,
        content_type = "multipart/form-data",
        description = "Attachment files with optional display names",
    ),
    responses(
        (status = 200, description = "Attachments added", body = ApiResponse<AddedAttachmentsResponseDto>),
        (status = 400, description = "No files or invalid file"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upload_attachments(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<AddedAttachmentsResponseDto>>> {
    let mut files = Vec::new();
    let mut names = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "extras" | "extras[]" => {
                check_file_count(&files)?;
                files.push(read_file(field).await?);
            }
            "names" | "names[]" => {
                let text = field.text().await.map_err(|e| {
                    AppError::BadRequest(format!("Failed to read names field: {}", e))
                })?;
                names.push(text);
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let added = service
        .upload_extra_documents(user.account_id, files, names)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(AddedAttachmentsResponseDto { added }),
        None,
        None,
    )))
}

/// Remove extra attachments by blob reference
#[utoipa::path(
    delete,
    path = "/api/students/me/attachments",
    tag = "students",
    params(AttachmentPathQuery),
    responses(
        (status = 200, description = "Remaining attachments", body = ApiResponse<AttachmentsResponseDto>),
        (status = 400, description = "Missing path"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_attachment(
    user: AuthenticatedUser,
    State(service): State<Arc<DocumentService>>,
    Query(query): Query<AttachmentPathQuery>,
) -> Result<Json<ApiResponse<AttachmentsResponseDto>>> {
    let extra_documents = service
        .remove_extra_document(user.account_id, query.path)
        .await?;

    Ok(Json(ApiResponse::success(
        Some(AttachmentsResponseDto { extra_documents }),
        None,
        None,
    )))
}
