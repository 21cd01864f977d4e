use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::students::dtos::{MAX_FILES_PER_REQUEST, MAX_FILE_SIZE};
use crate::features::students::handlers;
use crate::features::students::services::{DocumentService, ProfileService};

/// Profile routes for the signed-in student
pub fn profile_routes(service: Arc<ProfileService>) -> Router {
    Router::new()
        .route("/api/me", get(handlers::get_me))
        .route(
            "/api/students/me",
            get(handlers::get_my_profile).put(handlers::update_my_profile),
        )
        .with_state(service)
}

/// Room for a full request of maximum-size files plus multipart overhead
fn upload_limit() -> DefaultBodyLimit {
    DefaultBodyLimit::max(MAX_FILE_SIZE * MAX_FILES_PER_REQUEST + 1024 * 1024)
}

/// Document and attachment routes for the signed-in student
pub fn document_routes(service: Arc<DocumentService>) -> Router {
    Router::new()
        .route(
            "/api/students/me/documents",
            post(handlers::upload_documents)
                .delete(handlers::delete_document)
                .layer(upload_limit()),
        )
        .route(
            "/api/students/me/attachments",
            post(handlers::upload_attachments)
                .delete(handlers::delete_attachment)
                .layer(upload_limit()),
        )
        .with_state(service)
}
