use crate::core::config::AdminSeedConfig;
use crate::core::error::Result;
use crate::features::auth::models::{AccountRole, NewAccount};
use crate::features::auth::repositories::AccountRepository;
use crate::features::auth::services::PasswordHasher;

/// Make sure the staff account exists with the configured password.
///
/// Creates it (with an empty profile) when missing, otherwise promotes it to
/// admin and resets its password. Does nothing when no password is configured.
pub async fn ensure_admin(
    accounts: &dyn AccountRepository,
    hasher: &PasswordHasher,
    config: &AdminSeedConfig,
) -> Result<()> {
    let Some(password) = config.password.as_deref() else {
        tracing::info!("ADMIN_PASSWORD not set, skipping admin seeding");
        return Ok(());
    };

    let password_hash = hasher.hash(password)?;

    match accounts.find_by_email(&config.email).await? {
        None => {
            accounts
                .create_with_profile(NewAccount {
                    name: config.name.clone(),
                    email: config.email.clone(),
                    password_hash,
                    role: AccountRole::Admin,
                    course: config.course.clone(),
                })
                .await?;
            tracing::info!("Seeded admin account: {}", config.email);
        }
        Some(existing) => {
            accounts
                .promote_to_admin(existing.id, &password_hash)
                .await?;
            tracing::info!("Ensured admin account: {}", config.email);
        }
    }

    Ok(())
}
