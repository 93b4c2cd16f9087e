//! Session cache behaviour when the stored account changes underneath it.

mod test_utils;

use std::time::Duration;

use leadshunter::accounts::{AccountError, InvalidationReason};
use leadshunter::models::company::CompanyStatus;
use leadshunter::session_context::{AuthState, SessionContext};
use test_utils::*;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn login_populates_the_cache() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    let (company_id, owner) = active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    assert_eq!(context.state(), AuthState::Unauthenticated);

    context
        .login("dono@sul.com", "owner-secret", client("desktop"))
        .await
        .unwrap();

    let session = context.current().expect("signed in");
    assert_eq!(session.user.id, owner.id);
    assert_eq!(session.company.map(|c| c.id), Some(company_id));
    assert!(context.tick().await.unwrap());
}

#[tokio::test]
async fn failed_login_returns_to_unauthenticated() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts, Duration::from_secs(15));
    let err = context
        .login("dono@sul.com", "wrong", client("desktop"))
        .await
        .unwrap_err();

    assert!(matches!(err, AccountError::InvalidCredentials));
    assert_eq!(context.state(), AuthState::Unauthenticated);
    assert_eq!(context.last_invalidation(), None);
}

#[tokio::test]
async fn login_elsewhere_tears_down_the_cache() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let laptop = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    laptop
        .login("dono@sul.com", "owner-secret", client("laptop"))
        .await
        .unwrap();
    let mut observed = laptop.subscribe();

    let phone = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    phone
        .login("dono@sul.com", "owner-secret", client("phone"))
        .await
        .unwrap();

    assert!(!laptop.tick().await.unwrap());
    assert_eq!(laptop.state(), AuthState::Unauthenticated);
    assert_eq!(laptop.last_invalidation(), Some(InvalidationReason::Preempted));
    assert!(observed.has_changed().unwrap());
    assert_eq!(*observed.borrow_and_update(), AuthState::Unauthenticated);

    assert!(phone.refresh().await.unwrap());
}

#[tokio::test]
async fn remote_deactivation_is_picked_up_on_refresh() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    let (company_id, _) = active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();
    let member = add_member(&accounts, company_id, "a@sul.com").await.unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    context
        .login("a@sul.com", "member-secret", client("desktop"))
        .await
        .unwrap();

    accounts.owner_toggle_user_status(member.id).await.unwrap();

    assert!(!context.refresh().await.unwrap());
    assert_eq!(
        context.last_invalidation(),
        Some(InvalidationReason::UserDeactivated)
    );
    assert!(context.current().is_none());
}

#[tokio::test]
async fn company_block_is_picked_up_on_refresh() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    let (company_id, _) = active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    context
        .login("dono@sul.com", "owner-secret", client("desktop"))
        .await
        .unwrap();

    accounts
        .master_update_company_status(company_id, CompanyStatus::Blocked)
        .await
        .unwrap();

    assert!(!context.refresh().await.unwrap());
    assert_eq!(
        context.last_invalidation(),
        Some(InvalidationReason::CompanyUnavailable)
    );
}

#[tokio::test]
async fn refresh_picks_up_company_changes() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    let (company_id, _) = active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    context
        .login("dono@sul.com", "owner-secret", client("desktop"))
        .await
        .unwrap();

    accounts
        .master_update_company_status(company_id, CompanyStatus::Suspended)
        .await
        .unwrap();

    assert!(context.refresh().await.unwrap());
    let company = context.current().and_then(|s| s.company).expect("company cached");
    assert_eq!(company.status, CompanyStatus::Suspended);
}

#[tokio::test]
async fn rejected_heartbeat_drops_the_session() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    let (_, owner) = active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    context
        .login("dono@sul.com", "owner-secret", client("laptop"))
        .await
        .unwrap();
    let mut observed = context.subscribe();

    accounts.logout(owner.id).await.unwrap();

    assert!(!context.tick().await.unwrap());
    assert_eq!(context.state(), AuthState::Unauthenticated);
    assert_eq!(context.last_invalidation(), Some(InvalidationReason::LoggedOut));
    assert!(observed.has_changed().unwrap());
    assert!(context.current().is_none());

    assert!(!context.tick().await.unwrap());
}

#[tokio::test]
async fn resume_and_logout() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    let (_, owner) = active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();
    let outcome = login_owner(&accounts, "dono@sul.com").await.unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_secs(15));
    assert!(context.resume(owner.id, &outcome.session_id).await.unwrap());

    context.logout().await.unwrap();
    assert_eq!(context.state(), AuthState::Unauthenticated);
    assert_eq!(context.last_invalidation(), Some(InvalidationReason::LoggedOut));

    // Signed out already; nothing to do.
    context.logout().await.unwrap();

    assert!(!context.resume(owner.id, &outcome.session_id).await.unwrap());
    assert_eq!(context.last_invalidation(), Some(InvalidationReason::LoggedOut));
}

#[tokio::test]
async fn heartbeat_loop_stops_once_preempted() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts.clone(), Duration::from_millis(10));
    context
        .login("dono@sul.com", "owner-secret", client("laptop"))
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let heartbeat = tokio::spawn(context.clone().run(shutdown.clone()));

    login_owner(&accounts, "dono@sul.com").await.unwrap();

    tokio::time::timeout(Duration::from_secs(5), heartbeat)
        .await
        .expect("heartbeat loop exits")
        .unwrap();
    assert_eq!(context.last_invalidation(), Some(InvalidationReason::Preempted));
}

#[tokio::test]
async fn heartbeat_loop_honours_shutdown() {
    let db = setup_test_db().await.unwrap();
    let accounts = account_service(&db);
    active_company(&accounts, "Etiquetas Sul", "dono@sul.com")
        .await
        .unwrap();

    let context = SessionContext::new(accounts, Duration::from_secs(60));
    context
        .login("dono@sul.com", "owner-secret", client("laptop"))
        .await
        .unwrap();

    let shutdown = CancellationToken::new();
    let heartbeat = tokio::spawn(context.clone().run(shutdown.clone()));
    shutdown.cancel();

    tokio::time::timeout(Duration::from_secs(5), heartbeat)
        .await
        .expect("heartbeat loop exits")
        .unwrap();
    assert!(context.state().is_authenticated());
}
