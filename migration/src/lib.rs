//! Database migrations for the Leads Hunter accounts service.
//!
//! This module contains all database migrations using SeaORM Migration.

pub use sea_orm_migration::prelude::*;

mod m2024_01_01_000001_create_companies;
mod m2024_01_01_000002_create_users;
mod m2024_01_01_000003_create_access_logs;
mod m2024_01_01_000004_create_leads;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m2024_01_01_000001_create_companies::Migration),
            Box::new(m2024_01_01_000002_create_users::Migration),
            Box::new(m2024_01_01_000003_create_access_logs::Migration),
            Box::new(m2024_01_01_000004_create_leads::Migration),
        ]
    }
}
