use std::sync::Arc;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::features::admin::handlers;
use crate::features::admin::services::AdminService;

/// Create admin routes (all require admin access). Nested under `/api/admin`.
pub fn routes(admin_service: Arc<AdminService>) -> Router {
    Router::new()
        .route("/students", get(handlers::list_students))
        .route("/students/{id}", get(handlers::get_student))
        .route("/students/{id}/approval", patch(handlers::set_approval))
        .with_state(admin_service)
}
