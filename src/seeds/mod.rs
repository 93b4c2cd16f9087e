//! Database seeding
//!
//! Bootstraps the platform admin so a fresh install can approve its first
//! companies.

pub mod admin;

pub use admin::seed_admin;
