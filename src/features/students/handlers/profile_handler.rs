use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::students::dtos::{ProfileViewDto, UpdateProfileDto};
use crate::features::students::services::ProfileService;
use crate::shared::types::ApiResponse;
use axum::{extract::State, Json};
use std::sync::Arc;

/// Get own account and profile
#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileViewDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "students",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_my_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<ProfileViewDto>>> {
    let profile = service.get_profile(user.account_id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Boot endpoint used by the frontend after login
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Profile retrieved successfully", body = ApiResponse<ProfileViewDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "students",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_me(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
) -> Result<Json<ApiResponse<ProfileViewDto>>> {
    let profile = service.get_profile(user.account_id).await?;
    Ok(Json(ApiResponse::success(Some(profile), None, None)))
}

/// Update own profile. Sends the profile back for review.
#[utoipa::path(
    put,
    path = "/api/students/me",
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated successfully", body = ApiResponse<ProfileViewDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already registered")
    ),
    tag = "students",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_my_profile(
    user: AuthenticatedUser,
    State(service): State<Arc<ProfileService>>,
    AppJson(dto): AppJson<UpdateProfileDto>,
) -> Result<Json<ApiResponse<ProfileViewDto>>> {
    let profile = service.submit_edit(user.account_id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(profile),
        Some("Profile submitted for review".to_string()),
        None,
    )))
}
