use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::admin::dtos::*;
use crate::features::admin::services::AdminService;
use crate::features::auth::guards::RequireAdmin;
use crate::shared::types::{ApiResponse, Meta};

/// List students with filters, pagination and status counters
#[utoipa::path(
    get,
    path = "/api/admin/students",
    params(StudentQueryParams),
    responses(
        (status = 200, description = "Page of students with global counts", body = ApiResponse<StudentListResponseDto>),
        (status = 400, description = "Invalid status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_students(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Query(params): Query<StudentQueryParams>,
) -> Result<Json<ApiResponse<StudentListResponseDto>>> {
    let (page, total) = service.list_students(&params).await?;

    Ok(Json(ApiResponse::success(
        Some(page),
        None,
        Some(Meta { total }),
    )))
}

/// Get one student and mark the profile as viewed
#[utoipa::path(
    get,
    path = "/api/admin/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    responses(
        (status = 200, description = "Student detail", body = ApiResponse<StudentDetailDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Student not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_student(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<StudentDetailDto>>> {
    let detail = service.get_student_detail(id).await?;
    Ok(Json(ApiResponse::success(Some(detail), None, None)))
}

/// Approve or reject a student profile
#[utoipa::path(
    patch,
    path = "/api/admin/students/{id}/approval",
    params(
        ("id" = Uuid, Path, description = "Account ID")
    ),
    request_body = SetApprovalDto,
    responses(
        (status = 200, description = "Decision recorded", body = ApiResponse<ApprovalResponseDto>),
        (status = 400, description = "Invalid status or missing rejection note"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - Admin access required"),
        (status = 404, description = "Student not found")
    ),
    tag = "admin",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn set_approval(
    RequireAdmin(user): RequireAdmin,
    State(service): State<Arc<AdminService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<SetApprovalDto>,
) -> Result<Json<ApiResponse<ApprovalResponseDto>>> {
    tracing::debug!("Reviewer {} deciding on {}", user.account_id, id);
    let response = service.set_approval(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(response), None, None)))
}
