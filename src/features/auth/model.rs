use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::models::AccountRole;

/// Identity carried by a verified bearer token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub account_id: Uuid,
    pub role: AccountRole,
}

impl AuthenticatedUser {
    /// Check if user is staff
    pub fn is_admin(&self) -> bool {
        self.role == AccountRole::Admin
    }
}

/// JWT claims issued by this service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: Uuid,
    pub role: AccountRole,
    pub iat: i64,
    pub exp: i64,
}
