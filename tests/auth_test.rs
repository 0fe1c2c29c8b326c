mod common;

use std::time::Duration;

use common::{Call, FakeService, Failure, credentials, expired_token, token_for};
use genrelist::{
    config::SpotifyEndpoints,
    error::AppError,
    management::{AuthProgress, AuthState, AuthorizationManager, SessionStore},
};
use url::Url;

fn manager() -> AuthorizationManager {
    AuthorizationManager::new(
        credentials(),
        SpotifyEndpoints::default(),
        SessionStore::new(Duration::from_secs(3600)),
    )
}

fn query_param(url: &str, key: &str) -> Option<String> {
    Url::parse(url)
        .unwrap()
        .query_pairs()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[tokio::test]
async fn test_authorization_url_carries_session_state() {
    let auth = manager();
    let session = auth.sessions().open(None).await;

    let url = auth.build_authorization_url(&session).await.unwrap();
    assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
    assert_eq!(query_param(&url, "client_id").as_deref(), Some("client-id"));
    assert_eq!(query_param(&url, "response_type").as_deref(), Some("code"));
    assert_eq!(
        query_param(&url, "redirect_uri").as_deref(),
        Some("http://127.0.0.1:8501/")
    );

    // The same state is reused for every link of the session
    let state = query_param(&url, "state").unwrap();
    let again = auth.build_authorization_url(&session).await.unwrap();
    assert_eq!(query_param(&again, "state"), Some(state.clone()));

    // And it resolves back to the session that holds it
    assert_eq!(
        auth.resolve_redirect(Some(&state), &session).await.unwrap(),
        session
    );
}

#[tokio::test]
async fn test_unknown_or_missing_state_is_rejected() {
    let auth = manager();
    let session = auth.sessions().open(None).await;

    assert!(matches!(
        auth.resolve_redirect(Some("forged"), &session).await,
        Err(AppError::AuthorizationFailed(_))
    ));
    assert!(matches!(
        auth.resolve_redirect(None, &session).await,
        Err(AppError::AuthorizationFailed(_))
    ));
}

#[tokio::test]
async fn test_state_of_another_browser_is_rejected() {
    let auth = manager();
    let attacker = auth.sessions().open(None).await;
    let victim = auth.sessions().open(None).await;
    let url = auth.build_authorization_url(&attacker).await.unwrap();
    let state = query_param(&url, "state").unwrap();

    // A redirect carrying someone else's state never lands in their session
    assert!(matches!(
        auth.resolve_redirect(Some(&state), &victim).await,
        Err(AppError::AuthorizationFailed(_))
    ));
}

#[tokio::test]
async fn test_headless_session_accepts_redirect_from_any_browser() {
    let auth = manager();
    let terminal = auth.sessions().open_headless().await;
    let browser = auth.sessions().open(None).await;
    let url = auth.build_authorization_url(&terminal).await.unwrap();
    let state = query_param(&url, "state").unwrap();

    assert_eq!(
        auth.resolve_redirect(Some(&state), &browser).await.unwrap(),
        terminal
    );
}

#[tokio::test]
async fn test_state_is_retired_after_redemption() {
    let auth = manager();
    let service = FakeService::default();
    let session = auth.sessions().open(None).await;
    let url = auth.build_authorization_url(&session).await.unwrap();
    let state = query_param(&url, "state").unwrap();

    auth.exchange_code(&service, &session, "abc").await.unwrap();

    // The old consent link is dead, the next one carries a new state
    assert!(auth.resolve_redirect(Some(&state), &session).await.is_err());
    let next = auth.build_authorization_url(&session).await.unwrap();
    assert_ne!(query_param(&next, "state"), Some(state));
}

#[tokio::test]
async fn test_cancelled_exchange_does_not_block_the_session() {
    let auth = manager();
    let slow = FakeService {
        exchange_delay: Some(Duration::from_secs(5)),
        ..FakeService::default()
    };
    let session = auth.sessions().open(None).await;

    // The client goes away while the token request is in flight
    let cancelled = tokio::time::timeout(
        Duration::from_millis(50),
        auth.exchange_code(&slow, &session, "code-1"),
    )
    .await;
    assert!(cancelled.is_err());
    assert_eq!(auth.auth_state(&session).await, AuthState::Unauthenticated);

    // A fresh code is redeemed normally afterwards
    let fast = FakeService::default();
    let token = auth.exchange_code(&fast, &session, "code-2").await.unwrap();
    assert_eq!(token, token_for("code-2"));
}

#[tokio::test]
async fn test_cancelled_exchange_keeps_previous_token() {
    let auth = manager();
    let session = auth.sessions().open(None).await;
    let first = auth
        .exchange_code(&FakeService::default(), &session, "good")
        .await
        .unwrap();

    let slow = FakeService {
        exchange_delay: Some(Duration::from_secs(5)),
        ..FakeService::default()
    };
    let cancelled = tokio::time::timeout(
        Duration::from_millis(50),
        auth.exchange_code(&slow, &session, "next"),
    )
    .await;

    assert!(cancelled.is_err());
    assert_eq!(auth.current_token(&session).await, Some(first));
}

#[tokio::test]
async fn test_progress_reports_failure_without_waiting() {
    let auth = manager();
    let session = auth.sessions().open_headless().await;
    assert_eq!(auth.progress(&session).await, AuthProgress::Pending);

    let failing = FakeService {
        fail_exchange: Some(Failure::Status(400)),
        ..FakeService::default()
    };
    let _ = auth.exchange_code(&failing, &session, "bad").await;

    match auth.progress(&session).await {
        AuthProgress::Failed(reason) => assert!(reason.starts_with("authorization failed")),
        other => panic!("unexpected progress {:?}", other),
    }
}

#[tokio::test]
async fn test_progress_reports_denied_consent() {
    let auth = manager();
    let terminal = auth.sessions().open_headless().await;
    let browser = auth.sessions().open(None).await;
    let url = auth.build_authorization_url(&terminal).await.unwrap();
    let state = query_param(&url, "state").unwrap();

    auth.record_failure(Some(&state), &browser, "access_denied").await;

    assert_eq!(
        auth.progress(&terminal).await,
        AuthProgress::Failed("access_denied".into())
    );
}

#[tokio::test]
async fn test_progress_is_ready_after_exchange() {
    let auth = manager();
    let session = auth.sessions().open_headless().await;
    let token = auth
        .exchange_code(&FakeService::default(), &session, "abc")
        .await
        .unwrap();

    assert_eq!(auth.progress(&session).await, AuthProgress::Ready(token));
}

#[tokio::test]
async fn test_exchange_is_idempotent_per_code() {
    let auth = manager();
    let service = FakeService::default();
    let session = auth.sessions().open(None).await;

    let first = auth.exchange_code(&service, &session, "abc").await.unwrap();
    let second = auth.exchange_code(&service, &session, "abc").await.unwrap();

    // Replaying the code (e.g. a page reload) issues no second remote call
    assert_eq!(first, second);
    assert_eq!(service.calls(), vec![Call::Exchange("abc".into())]);
    assert_eq!(auth.current_token(&session).await, Some(first));
}

#[tokio::test]
async fn test_failed_exchange_keeps_previous_token() {
    let auth = manager();
    let ok = FakeService::default();
    let session = auth.sessions().open(None).await;
    let first = auth.exchange_code(&ok, &session, "good").await.unwrap();

    let failing = FakeService {
        fail_exchange: Some(Failure::Status(400)),
        ..FakeService::default()
    };
    let err = auth
        .exchange_code(&failing, &session, "bad")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::AuthorizationFailed(_)));
    assert_eq!(auth.current_token(&session).await, Some(first.clone()));
    assert_eq!(auth.auth_state(&session).await, AuthState::Authenticated(first));
}

#[tokio::test]
async fn test_failed_first_exchange_leaves_session_unauthenticated() {
    let auth = manager();
    let failing = FakeService {
        fail_exchange: Some(Failure::Status(400)),
        ..FakeService::default()
    };
    let session = auth.sessions().open(None).await;

    assert!(auth.exchange_code(&failing, &session, "bad").await.is_err());
    assert_eq!(auth.auth_state(&session).await, AuthState::Unauthenticated);

    // A consumed code that failed cannot be replayed into a token
    assert!(matches!(
        auth.exchange_code(&failing, &session, "bad").await,
        Err(AppError::AuthorizationFailed(_))
    ));
    assert_eq!(failing.calls().len(), 1);
}

#[tokio::test]
async fn test_expired_token_is_not_current() {
    let auth = manager();
    let session = auth.sessions().open(None).await;
    auth.sessions()
        .update(&session, |s| s.auth = AuthState::Authenticated(expired_token()))
        .await;

    assert_eq!(auth.current_token(&session).await, None);
    assert!(AuthorizationManager::is_expired(&expired_token()));
    assert!(!AuthorizationManager::is_expired(&token_for("x")));
}

#[tokio::test]
async fn test_invalidate_clears_the_token() {
    let auth = manager();
    let service = FakeService::default();
    let session = auth.sessions().open(None).await;
    auth.exchange_code(&service, &session, "abc").await.unwrap();

    auth.invalidate(&session).await;

    assert_eq!(auth.current_token(&session).await, None);
    assert_eq!(auth.auth_state(&session).await, AuthState::Unauthenticated);
}

#[tokio::test]
async fn test_sessions_do_not_share_tokens() {
    let auth = manager();
    let service = FakeService::default();
    let alice = auth.sessions().open(None).await;
    let bob = auth.sessions().open(None).await;

    auth.exchange_code(&service, &alice, "abc").await.unwrap();

    assert!(auth.current_token(&alice).await.is_some());
    assert_eq!(auth.current_token(&bob).await, None);
}
