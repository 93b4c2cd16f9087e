//! Login, heartbeat and session validation.
//!
//! A user holds at most one live session. Logging in overwrites the stored
//! session id, so any other device holding the previous id fails its next
//! validation.

use chrono::Utc;
use metrics::counter;
use rand::{Rng, distributions::Alphanumeric};
use sea_orm::TransactionTrait;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;
use subtle::ConstantTimeEq;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{
    AccountError, AccountService, ClientInfo, CompanyProfile, LoginOutcome, UserProfile,
    check_company_access, load_company,
};
use crate::error::RepositoryError;
use crate::models::company::CompanyStatus;
use crate::models::user::{Model as UserModel, UserRole, UserStatus};
use crate::repositories::{AccessLogRepository, UserRepository};

const SESSION_PREFIX: &str = "sess-";
const SESSION_RANDOM_LEN: usize = 24;

/// Why a held session stopped being valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InvalidationReason {
    /// Explicit logout, here or elsewhere
    LoggedOut,
    /// A later login replaced the session
    Preempted,
    UserMissing,
    /// No user holds the presented token
    SessionUnknown,
    UserDeactivated,
    CompanyUnlinked,
    /// Company pending approval or blocked
    CompanyUnavailable,
}

impl InvalidationReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvalidationReason::LoggedOut => "logged_out",
            InvalidationReason::Preempted => "preempted",
            InvalidationReason::UserMissing => "user_missing",
            InvalidationReason::SessionUnknown => "session_unknown",
            InvalidationReason::UserDeactivated => "user_deactivated",
            InvalidationReason::CompanyUnlinked => "company_unlinked",
            InvalidationReason::CompanyUnavailable => "company_unavailable",
        }
    }
}

impl std::fmt::Display for InvalidationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A session that passed validation, re-read from the store
#[derive(Debug, Clone, PartialEq)]
pub struct AuthenticatedSession {
    pub session_id: String,
    pub user: UserProfile,
    pub company: Option<CompanyProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCheck {
    Valid(AuthenticatedSession),
    Invalid(InvalidationReason),
}

impl AccountService {
    /// Authenticate and open a new session, preempting any other.
    ///
    /// Rejected attempts leave the session and access log untouched.
    #[instrument(skip(self, secret, client), fields(email = %email))]
    pub async fn login(
        &self,
        email: &str,
        secret: &str,
        client: ClientInfo,
    ) -> Result<LoginOutcome, AccountError> {
        let user = match UserRepository::new(&self.db).find_by_email(email).await? {
            Some(user) if secrets_match(&user.secret, secret) => user,
            _ => return Err(login_rejected(AccountError::InvalidCredentials, "invalid_credentials")),
        };

        if user.status == UserStatus::Inactive {
            return Err(login_rejected(AccountError::UserDeactivated, "user_deactivated"));
        }

        let company = load_company(&self.db, &user).await?;
        if let Err(err) = check_company_access(&user, company.as_ref()) {
            let reason = match err {
                AccountError::CompanyUnlinked => "company_unlinked",
                AccountError::CompanyPendingApproval => "company_pending",
                _ => "company_blocked",
            };
            return Err(login_rejected(err, reason));
        }

        let session_id = generate_session_id();
        let now: DateTimeWithTimeZone = Utc::now().into();

        let txn = self
            .db
            .begin()
            .await
            .map_err(RepositoryError::database_error)?;
        UserRepository::new(&txn)
            .start_session(user.id, &session_id, now)
            .await?;
        AccessLogRepository::new(&txn)
            .record(user.id, now, client.user_agent, client.ip)
            .await?;
        txn.commit().await.map_err(RepositoryError::database_error)?;

        counter!("leadshunter_logins_total", "outcome" => "success").increment(1);
        info!(user_id = %user.id, role = ?user.role, "User logged in");

        let account = self.account_snapshot(user.id).await?;
        Ok(LoginOutcome {
            session_id,
            account,
        })
    }

    /// Stamp liveness for `session_id`. Returns false once the session was
    /// replaced or cleared; `last_seen` is then left alone.
    pub async fn heartbeat(&self, user_id: Uuid, session_id: &str) -> Result<bool, AccountError> {
        let alive = UserRepository::new(&self.db)
            .touch_if_session(user_id, session_id, Utc::now().into())
            .await?;

        counter!(
            "leadshunter_heartbeats_total",
            "outcome" => if alive { "alive" } else { "stale" }
        )
        .increment(1);
        debug!(%user_id, alive, "Heartbeat");

        Ok(alive)
    }

    /// Clear the live session. Idempotent; unknown users are ignored.
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AccountError> {
        UserRepository::new(&self.db).clear_session(user_id).await?;
        info!(%user_id, "User logged out");
        Ok(())
    }

    /// Re-derive a session held by a known user.
    pub async fn validate_session(
        &self,
        user_id: Uuid,
        session_id: &str,
    ) -> Result<SessionCheck, AccountError> {
        match UserRepository::new(&self.db).find_by_id(user_id).await? {
            Some(user) => self.check_session(user, session_id).await,
            None => Ok(invalidated(InvalidationReason::UserMissing, user_id)),
        }
    }

    /// Resolve a bearer token to its session.
    pub async fn authenticate_token(&self, token: &str) -> Result<SessionCheck, AccountError> {
        if !token.starts_with(SESSION_PREFIX) {
            return Ok(SessionCheck::Invalid(InvalidationReason::SessionUnknown));
        }

        match UserRepository::new(&self.db).find_by_session(token).await? {
            Some(user) => self.check_session(user, token).await,
            None => Ok(SessionCheck::Invalid(InvalidationReason::SessionUnknown)),
        }
    }

    async fn check_session(
        &self,
        user: UserModel,
        session_id: &str,
    ) -> Result<SessionCheck, AccountError> {
        match user.current_session_id.as_deref() {
            None => return Ok(invalidated(InvalidationReason::LoggedOut, user.id)),
            Some(current) if current != session_id => {
                return Ok(invalidated(InvalidationReason::Preempted, user.id));
            }
            Some(_) => {}
        }

        if user.status == UserStatus::Inactive {
            return Ok(invalidated(InvalidationReason::UserDeactivated, user.id));
        }

        let company = load_company(&self.db, &user).await?;
        if user.role != UserRole::AdminMaster {
            match company.as_ref().map(|c| c.status) {
                None => return Ok(invalidated(InvalidationReason::CompanyUnlinked, user.id)),
                Some(CompanyStatus::Pending) | Some(CompanyStatus::Blocked) => {
                    return Ok(invalidated(InvalidationReason::CompanyUnavailable, user.id));
                }
                Some(CompanyStatus::Active) | Some(CompanyStatus::Suspended) => {}
            }
        }

        Ok(SessionCheck::Valid(AuthenticatedSession {
            session_id: session_id.to_string(),
            user: user.into(),
            company: company.map(CompanyProfile::from),
        }))
    }
}

fn invalidated(reason: InvalidationReason, user_id: Uuid) -> SessionCheck {
    counter!("leadshunter_session_invalidations_total", "reason" => reason.as_str()).increment(1);
    info!(%user_id, reason = %reason, "Session invalidated");
    SessionCheck::Invalid(reason)
}

fn login_rejected(err: AccountError, reason: &'static str) -> AccountError {
    counter!("leadshunter_logins_total", "outcome" => reason).increment(1);
    warn!(reason, "Login rejected");
    err
}

fn secrets_match(stored: &str, presented: &str) -> bool {
    stored.as_bytes().ct_eq(presented.as_bytes()).into()
}

/// Opaque `sess-` token; it only tells devices apart.
fn generate_session_id() -> String {
    let random: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_RANDOM_LEN)
        .map(char::from)
        .collect();
    format!("{SESSION_PREFIX}{random}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_prefixed_and_distinct() {
        let first = generate_session_id();
        let second = generate_session_id();
        assert!(first.starts_with("sess-"));
        assert_eq!(first.len(), SESSION_PREFIX.len() + SESSION_RANDOM_LEN);
        assert_ne!(first, second);
    }

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("hunter2", "hunter2"));
        assert!(!secrets_match("hunter2", "hunter3"));
        assert!(!secrets_match("hunter2", "hunter22"));
    }

    #[test]
    fn invalidation_reason_serializes_snake_case() {
        let json = serde_json::to_string(&InvalidationReason::CompanyUnavailable).unwrap();
        assert_eq!(json, "\"company_unavailable\"");
        assert_eq!(InvalidationReason::Preempted.to_string(), "preempted");
    }
}
