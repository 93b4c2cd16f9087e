//! # Repository Layer
//!
//! This module contains repository implementations that encapsulate SeaORM operations
//! for database entities. Each repository borrows any `ConnectionTrait`, so callers
//! can pass either the pool or an open transaction.

pub mod access_log;
pub mod company;
pub mod lead;
pub mod user;

pub use access_log::{AccessLogRepository, MAX_ACCESS_LOGS_PER_USER};
pub use company::{CompanyRepository, NewCompany};
pub use lead::LeadRepository;
pub use user::{NewUser, UserRepository};
