use thiserror::Error;
use uuid::Uuid;

use crate::error::RepositoryError;

/// Failures surfaced by the account engine. Messages are shown to end users.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Your user has been deactivated by the company administrator")]
    UserDeactivated,
    #[error("User is not linked to a company")]
    CompanyUnlinked,
    #[error("Your company is awaiting approval by the platform administrator")]
    CompanyPendingApproval,
    #[error("Access blocked due to a pending payment. Please settle your subscription")]
    CompanyBlocked,
    #[error("This email is already in use")]
    EmailAlreadyInUse,
    #[error("User {0} not found")]
    UserNotFound(Uuid),
    #[error("Company {0} not found")]
    CompanyNotFound(Uuid),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
