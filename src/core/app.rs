use std::sync::Arc;

use axum::{http::StatusCode, middleware::from_fn_with_state, routing::get, Router};

use crate::core::config::AuthConfig;
use crate::core::middleware;
use crate::features::admin::{routes as admin_routes, AdminService};
use crate::features::auth::routes as auth_routes;
use crate::features::auth::{AccountRepository, AuthService, PasswordHasher, TokenService};
use crate::features::students::routes as students_routes;
use crate::features::students::{DocumentService, ProfileRepository, ProfileService};
use crate::modules::notify::Notifier;
use crate::modules::storage::BlobStore;

/// Services shared by the HTTP routes
pub struct AppServices {
    pub tokens: Arc<TokenService>,
    pub hasher: Arc<PasswordHasher>,
    pub auth: Arc<AuthService>,
    pub profiles: Arc<ProfileService>,
    pub documents: Arc<DocumentService>,
    pub admin: Arc<AdminService>,
}

impl AppServices {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        profiles: Arc<dyn ProfileRepository>,
        blobs: Arc<dyn BlobStore>,
        notifier: Arc<dyn Notifier>,
        auth_config: &AuthConfig,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(auth_config));
        let hasher = Arc::new(PasswordHasher::new());

        Self {
            auth: Arc::new(AuthService::new(
                Arc::clone(&accounts),
                Arc::clone(&tokens),
                Arc::clone(&hasher),
            )),
            profiles: Arc::new(ProfileService::new(
                Arc::clone(&accounts),
                Arc::clone(&profiles),
            )),
            documents: Arc::new(DocumentService::new(Arc::clone(&profiles), blobs)),
            admin: Arc::new(AdminService::new(accounts, profiles, notifier)),
            tokens,
            hasher,
        }
    }
}

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// API routes. Everything except registration, login and `/health` requires a bearer token.
pub fn build_router(services: &AppServices) -> Router {
    let protected_routes = Router::new()
        .merge(auth_routes::protected_routes(Arc::clone(&services.auth)))
        .merge(students_routes::profile_routes(Arc::clone(&services.profiles)))
        .merge(students_routes::document_routes(Arc::clone(&services.documents)))
        .nest(
            "/api/admin",
            admin_routes::routes(Arc::clone(&services.admin)),
        )
        .route_layer(from_fn_with_state(
            Arc::clone(&services.tokens),
            middleware::auth_middleware,
        ));

    let public_routes = Router::new()
        .merge(auth_routes::public_routes(Arc::clone(&services.auth)))
        .route("/health", get(health_check));

    Router::new().merge(protected_routes).merge(public_routes)
}
