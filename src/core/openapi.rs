use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::admin::{dtos as admin_dtos, handlers as admin_handlers};
use crate::features::auth::{self, models as auth_models};
use crate::features::students::{
    dtos as students_dtos, handlers as students_handlers, models as students_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handlers::register,
        auth::handlers::login,
        auth::handlers::get_me,
        // Students
        students_handlers::get_me,
        students_handlers::get_my_profile,
        students_handlers::update_my_profile,
        students_handlers::upload_documents,
        students_handlers::delete_document,
        students_handlers::upload_attachments,
        students_handlers::delete_attachment,
        // Admin
        admin_handlers::list_students,
        admin_handlers::get_student,
        admin_handlers::set_approval,
    ),
    components(
        schemas(
            Meta,
            // Auth
            auth_models::AccountRole,
            auth_models::AccountSummary,
            auth::model::AuthenticatedUser,
            auth::dtos::RegisterRequestDto,
            auth::dtos::LoginRequestDto,
            auth::dtos::AuthResponseDto,
            auth::dtos::MeResponseDto,
            ApiResponse<auth::dtos::AuthResponseDto>,
            ApiResponse<auth::dtos::MeResponseDto>,
            // Students
            students_models::ApprovalStatus,
            students_models::EducationRecord,
            students_models::Schooling,
            students_models::FamilyDetails,
            students_models::NamedDocuments,
            students_models::ExtraDocument,
            students_models::StudentListRow,
            students_models::StatusCounts,
            students_dtos::PersonalDetailsDto,
            students_dtos::UpdateProfileDto,
            students_dtos::ProfileViewDto,
            students_dtos::UploadDocumentsDto,
            students_dtos::UploadAttachmentsDto,
            students_dtos::DocumentsResponseDto,
            students_dtos::AddedAttachmentsResponseDto,
            students_dtos::AttachmentsResponseDto,
            ApiResponse<students_dtos::ProfileViewDto>,
            ApiResponse<students_dtos::DocumentsResponseDto>,
            ApiResponse<students_dtos::AddedAttachmentsResponseDto>,
            ApiResponse<students_dtos::AttachmentsResponseDto>,
            // Admin
            admin_dtos::StudentListResponseDto,
            admin_dtos::AdminProfileDto,
            admin_dtos::StudentDetailDto,
            admin_dtos::SetApprovalDto,
            admin_dtos::ApprovalResponseDto,
            ApiResponse<admin_dtos::StudentListResponseDto>,
            ApiResponse<admin_dtos::StudentDetailDto>,
            ApiResponse<admin_dtos::ApprovalResponseDto>,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and the current account"),
        (name = "students", description = "Student profile and document uploads"),
        (name = "admin", description = "Profile review (staff only)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Student Portal API",
        version = "0.1.0",
        description = "API documentation for the student records portal",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documents_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/auth/me",
            "/api/me",
            "/api/students/me",
            "/api/students/me/documents",
            "/api/students/me/attachments",
            "/api/admin/students",
            "/api/admin/students/{id}",
            "/api/admin/students/{id}/approval",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("bearer_auth")));
    }
}
