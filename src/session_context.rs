//! # Tenant Session Context
//!
//! In-process cache of the signed-in user and company. The cache is never a
//! second source of truth: every heartbeat tick re-derives it from the store
//! and tears it down when the stored session moved on (a later login
//! elsewhere), the user was deactivated or the company lost access.
//!
//! State changes are published on a `watch` channel so callers can observe
//! forced logouts.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::accounts::{
    AccountError, AccountService, AuthenticatedSession, ClientInfo, InvalidationReason,
    LoginOutcome, SessionCheck,
};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated(AuthenticatedSession),
    /// Transient; immediately followed by `Unauthenticated`
    Invalidated(InvalidationReason),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated(_))
    }
}

#[derive(Clone)]
pub struct SessionContext {
    accounts: AccountService,
    heartbeat_interval: Duration,
    state: Arc<watch::Sender<AuthState>>,
    last_invalidation: Arc<Mutex<Option<InvalidationReason>>>,
}

impl SessionContext {
    pub fn new(accounts: AccountService, heartbeat_interval: Duration) -> Self {
        let (state, _) = watch::channel(AuthState::Unauthenticated);
        Self {
            accounts,
            heartbeat_interval,
            state: Arc::new(state),
            last_invalidation: Arc::new(Mutex::new(None)),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// The cached session, if signed in
    pub fn current(&self) -> Option<AuthenticatedSession> {
        match &*self.state.borrow() {
            AuthState::Authenticated(session) => Some(session.clone()),
            _ => None,
        }
    }

    /// Reason for the most recent forced or explicit logout
    pub fn last_invalidation(&self) -> Option<InvalidationReason> {
        *self
            .last_invalidation
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
    }

    pub fn heartbeat_interval(&self) -> Duration {
        self.heartbeat_interval
    }

    #[instrument(skip(self, secret, client))]
    pub async fn login(
        &self,
        email: &str,
        secret: &str,
        client: ClientInfo,
    ) -> Result<LoginOutcome, AccountError> {
        self.state.send_replace(AuthState::Authenticating);

        match self.accounts.login(email, secret, client).await {
            Ok(outcome) => {
                self.state
                    .send_replace(AuthState::Authenticated(AuthenticatedSession {
                        session_id: outcome.session_id.clone(),
                        user: outcome.account.user.clone(),
                        company: outcome.account.company.clone(),
                    }));
                Ok(outcome)
            }
            Err(err) => {
                self.state.send_replace(AuthState::Unauthenticated);
                Err(err)
            }
        }
    }

    /// Adopt a session obtained earlier, re-deriving it from the store.
    pub async fn resume(&self, user_id: Uuid, session_id: &str) -> Result<bool, AccountError> {
        match self.accounts.validate_session(user_id, session_id).await? {
            SessionCheck::Valid(session) => {
                self.state.send_replace(AuthState::Authenticated(session));
                Ok(true)
            }
            SessionCheck::Invalid(reason) => {
                self.invalidate(reason);
                Ok(false)
            }
        }
    }

    /// Clear the stored session and drop the cache. No-op when signed out.
    pub async fn logout(&self) -> Result<(), AccountError> {
        let Some(session) = self.current() else {
            return Ok(());
        };

        self.accounts.logout(session.user.id).await?;
        self.invalidate(InvalidationReason::LoggedOut);
        Ok(())
    }

    /// Re-derive the cached user and company. Returns whether the session
    /// is still valid.
    pub async fn refresh(&self) -> Result<bool, AccountError> {
        let Some(held) = self.current() else {
            return Ok(false);
        };

        match self
            .accounts
            .validate_session(held.user.id, &held.session_id)
            .await?
        {
            SessionCheck::Valid(fresh) => {
                // A logout racing this refresh wins.
                self.state.send_if_modified(|state| match state {
                    AuthState::Authenticated(current)
                        if current.session_id == fresh.session_id =>
                    {
                        let changed = *current != fresh;
                        *current = fresh;
                        changed
                    }
                    _ => false,
                });
                Ok(self.state.borrow().is_authenticated())
            }
            SessionCheck::Invalid(reason) => {
                warn!(user_id = %held.user.id, reason = %reason, "Held session is no longer valid");
                self.invalidate(reason);
                Ok(false)
            }
        }
    }

    /// One heartbeat: stamp liveness, then re-derive.
    pub async fn tick(&self) -> Result<bool, AccountError> {
        let Some(held) = self.current() else {
            return Ok(false);
        };

        let alive = self
            .accounts
            .heartbeat(held.user.id, &held.session_id)
            .await?;
        if alive {
            return self.refresh().await;
        }

        // No row holds this session any more; only the reason is left to find.
        let reason = match self
            .accounts
            .validate_session(held.user.id, &held.session_id)
            .await?
        {
            SessionCheck::Invalid(reason) => reason,
            SessionCheck::Valid(_) => InvalidationReason::Preempted,
        };
        warn!(user_id = %held.user.id, reason = %reason, "Heartbeat rejected, dropping session");
        self.invalidate(reason);
        Ok(false)
    }

    /// Tick every heartbeat interval until shutdown or sign-out.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            interval_ms = self.heartbeat_interval.as_millis() as u64,
            "Starting session heartbeat"
        );

        loop {
            if !self.state.borrow().is_authenticated() {
                break;
            }

            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Session heartbeat shutdown requested");
                    break;
                }
                _ = sleep(self.heartbeat_interval) => {
                    match self.tick().await {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(err) => error!(error = %err, "Session heartbeat failed"),
                    }
                }
            }
        }

        info!("Session heartbeat stopped");
    }

    fn invalidate(&self, reason: InvalidationReason) {
        *self
            .last_invalidation
            .lock()
            .unwrap_or_else(|poison| poison.into_inner()) = Some(reason);
        self.state.send_replace(AuthState::Invalidated(reason));
        self.state.send_replace(AuthState::Unauthenticated);
    }
}
