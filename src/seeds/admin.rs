//! Platform admin seeding

use anyhow::Result;

use crate::accounts::{AccountService, UserProfile};
use crate::config::BootstrapConfig;

/// Create the platform admin from the bootstrap settings unless one exists.
///
/// Without a configured secret nothing is created; the install then has no
/// admin until one is seeded.
pub async fn seed_admin(
    accounts: &AccountService,
    bootstrap: &BootstrapConfig,
) -> Result<Option<UserProfile>> {
    let Some(secret) = bootstrap.admin_secret.as_deref() else {
        log::warn!("LEADSHUNTER_BOOTSTRAP_ADMIN_SECRET is not set, skipping admin seeding");
        return Ok(None);
    };

    match accounts
        .seed_admin_master(&bootstrap.admin_email, secret)
        .await?
    {
        Some(admin) => {
            log::info!("Created platform admin '{}'", admin.email);
            Ok(Some(admin))
        }
        None => {
            log::info!("Platform admin already exists, skipping");
            Ok(None)
        }
    }
}
