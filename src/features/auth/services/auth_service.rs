use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    AuthResponseDto, LoginRequestDto, MeResponseDto, RegisterRequestDto,
};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::auth::models::{Account, AccountRole, AccountSummary, NewAccount};
use crate::features::auth::repositories::AccountRepository;
use crate::features::auth::services::{PasswordHasher, TokenService};
use crate::shared::validation::{is_full_name, is_personal_email, normalize_email};
use std::sync::Arc;

/// Service for authentication operations (register, login)
pub struct AuthService {
    accounts: Arc<dyn AccountRepository>,
    tokens: Arc<TokenService>,
    hasher: Arc<PasswordHasher>,
}

impl AuthService {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        tokens: Arc<TokenService>,
        hasher: Arc<PasswordHasher>,
    ) -> Self {
        Self {
            accounts,
            tokens,
            hasher,
        }
    }

    /// Register a new student together with an empty profile
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<AuthResponseDto> {
        let name = dto.name.trim().to_string();
        let email = normalize_email(&dto.email);
        let course = dto.course.trim().to_string();

        if name.is_empty() || email.is_empty() || dto.password.is_empty() || course.is_empty() {
            return Err(AppError::Validation("Missing fields".to_string()));
        }
        if !is_full_name(&name) {
            return Err(AppError::Validation("Enter full name".to_string()));
        }
        if !is_personal_email(&email) {
            return Err(AppError::Validation("Email must be Gmail".to_string()));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash(&dto.password)?;
        let account = self
            .accounts
            .create_with_profile(NewAccount {
                name,
                email,
                password_hash,
                role: AccountRole::Student,
                course,
            })
            .await?;

        tracing::info!("Student registered: {}", account.id);
        self.auth_response(&account)
    }

    /// Login with email and password
    pub async fn login(&self, dto: LoginRequestDto) -> Result<AuthResponseDto> {
        let email = normalize_email(&dto.email);
        if email.is_empty() || dto.password.is_empty() {
            return Err(AppError::Validation("Missing credentials".to_string()));
        }

        let account = self
            .accounts
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::Auth("Invalid credentials".to_string()))?;

        if !self.hasher.verify(&dto.password, &account.password_hash) {
            return Err(AppError::Auth("Invalid credentials".to_string()));
        }

        tracing::debug!("Login succeeded for {}", account.id);
        self.auth_response(&account)
    }

    /// Get current authenticated account
    pub async fn get_current_user(&self, user: AuthenticatedUser) -> Result<MeResponseDto> {
        let account = self
            .accounts
            .find_by_id(user.account_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Account not found".to_string()))?;

        Ok(MeResponseDto {
            user: AccountSummary::from(&account),
            course: account.course,
        })
    }

    fn auth_response(&self, account: &Account) -> Result<AuthResponseDto> {
        let token = self.tokens.issue(account)?;
        Ok(AuthResponseDto {
            token: token.access_token,
            token_type: token.token_type,
            expires_in: token.expires_in,
            role: account.role,
            user: AccountSummary::from(account),
        })
    }
}
