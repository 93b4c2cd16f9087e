//! Test utilities for database testing.
//!
//! In-memory SQLite databases with migrations applied, plus fixtures for
//! companies, members and the platform admin.

use anyhow::Result;
use leadshunter::accounts::{
    AccountService, ClientInfo, LoginOutcome, NewMember, RegistrationOutcome,
    RegistrationRequest, UserProfile,
};
use leadshunter::config::BillingConfig;
use leadshunter::models::company::CompanyStatus;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use uuid::Uuid;

#[allow(dead_code)]
pub const ADMIN_EMAIL: &str = "admin@leadshunter.com";
#[allow(dead_code)]
pub const ADMIN_SECRET: &str = "admin-secret";

/// Sets up an in-memory SQLite database with all migrations applied.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;

    Migrator::up(&db, None).await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "PRAGMA foreign_keys = OFF".to_string(),
    ))
    .await?;

    Ok(db)
}

/// Account engine with the default pricing (50 base, 25 per member).
#[allow(dead_code)]
pub fn account_service(db: &DatabaseConnection) -> AccountService {
    AccountService::new(db.clone(), BillingConfig::default())
}

#[allow(dead_code)]
pub fn client(user_agent: &str) -> ClientInfo {
    ClientInfo {
        user_agent: user_agent.to_string(),
        ip: "203.0.113.7".to_string(),
    }
}

/// Registers a company; it stays pending until approved.
#[allow(dead_code)]
pub async fn register_company(
    accounts: &AccountService,
    company_name: &str,
    owner_email: &str,
) -> Result<RegistrationOutcome> {
    let outcome = accounts
        .register_company_request(RegistrationRequest {
            company_name: company_name.to_string(),
            owner_name: format!("Owner of {company_name}"),
            email: owner_email.to_string(),
            secret: "owner-secret".to_string(),
        })
        .await?;
    Ok(outcome)
}

/// Registers and approves a company, returning its id and owner.
#[allow(dead_code)]
pub async fn active_company(
    accounts: &AccountService,
    company_name: &str,
    owner_email: &str,
) -> Result<(Uuid, UserProfile)> {
    let outcome = register_company(accounts, company_name, owner_email).await?;
    accounts
        .master_update_company_status(outcome.company.id, CompanyStatus::Active)
        .await?;
    Ok((outcome.company.id, outcome.owner))
}

#[allow(dead_code)]
pub async fn add_member(
    accounts: &AccountService,
    company_id: Uuid,
    email: &str,
) -> Result<UserProfile> {
    let member = accounts
        .owner_create_user(
            company_id,
            NewMember {
                name: format!("Member {email}"),
                email: email.to_string(),
                secret: "member-secret".to_string(),
            },
        )
        .await?;
    Ok(member)
}

#[allow(dead_code)]
pub async fn login_owner(accounts: &AccountService, email: &str) -> Result<LoginOutcome> {
    Ok(accounts
        .login(email, "owner-secret", client("test-agent"))
        .await?)
}

#[allow(dead_code)]
pub async fn seed_admin(accounts: &AccountService) -> Result<UserProfile> {
    accounts
        .seed_admin_master(ADMIN_EMAIL, ADMIN_SECRET)
        .await?
        .ok_or_else(|| anyhow::anyhow!("admin already seeded"))
}
