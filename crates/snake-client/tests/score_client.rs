#[allow(dead_code)]
mod common;

use std::sync::atomic::Ordering;

use common::TestBackend;
use snake_client::score_client::{AccountService, BackendClient, ScoreService};
use snake_core::api::UserId;
use snake_core::error::ClientError;

#[tokio::test]
async fn health_reports_service_info() {
    let backend = TestBackend::start().await;
    let info = backend.client().health().await.unwrap();
    assert_eq!(info.mensagem, "Back-end funcionando!");
    assert_eq!(info.versao, "1.0.0");
}

#[tokio::test]
async fn register_then_login() {
    let backend = TestBackend::start().await;
    let client = backend.client();

    client.register("ana", "s3cret").await.unwrap();
    let user = client.login("ana", "s3cret").await.unwrap();

    assert_eq!(user.username, "ana");
    assert_eq!(user.id, UserId::Number(1));
}

#[tokio::test]
async fn duplicate_register_carries_service_error() {
    let backend = TestBackend::start().await;
    backend.seed_user("ana", "pw");

    let err = backend.client().register("ana", "other").await.unwrap_err();
    assert_eq!(err, ClientError::Service {
        status: 400,
        message: Some("Usuário já existe".to_string()),
    });
}

#[tokio::test]
async fn wrong_password_rejected() {
    let backend = TestBackend::start().await;
    backend.seed_user("ana", "pw");

    let err = backend.client().login("ana", "nope").await.unwrap_err();
    assert!(matches!(err, ClientError::Service { status: 401, .. }));
    assert_eq!(err.service_message(), Some("Credenciais inválidas"));
}

#[tokio::test]
async fn empty_credentials_never_reach_service() {
    let backend = TestBackend::start().await;
    let client = backend.client();

    let err = client.login("", "pw").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    let err = client.register("ana", "").await.unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));

    assert_eq!(backend.state.login_calls.load(Ordering::SeqCst), 0);
    assert_eq!(backend.state.register_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn best_score_absent_until_submitted() {
    let backend = TestBackend::start().await;
    let user = backend.seed_user("ana", "pw");
    let client = backend.client();

    assert_eq!(client.fetch_best_score(&user.id).await.unwrap(), None);

    client.submit_score(&user.id, "ana", 40).await.unwrap();
    client.submit_score(&user.id, "ana", 20).await.unwrap();

    assert_eq!(client.fetch_best_score(&user.id).await.unwrap(), Some(40));
    assert_eq!(backend.state.submitted(), vec![
        (1, "ana".to_string(), 40),
        (1, "ana".to_string(), 20)
    ]);
}

#[tokio::test]
async fn leaderboard_is_ranked_and_limited() {
    let backend = TestBackend::start().await;
    let ana = backend.seed_user("ana", "pw");
    let rui = backend.seed_user("rui", "pw");
    let eva = backend.seed_user("eva", "pw");
    backend.seed_score(&ana, 50);
    backend.seed_score(&rui, 90);
    backend.seed_score(&eva, 10);
    backend.seed_score(&ana, 70);

    let board = backend.client().fetch_leaderboard(2).await.unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!((board[0].rank, board[0].username.as_str(), board[0].score), (1, "rui", 90));
    assert_eq!((board[1].rank, board[1].username.as_str(), board[1].score), (2, "ana", 70));
}

#[tokio::test]
async fn empty_leaderboard() {
    let backend = TestBackend::start().await;
    let board = backend.client().fetch_leaderboard(10).await.unwrap();
    assert!(board.is_empty());
}

#[tokio::test]
async fn server_error_is_service_error() {
    let backend = TestBackend::start().await;
    backend.state.fail_leaderboard.store(true, Ordering::SeqCst);

    let err = backend.client().fetch_leaderboard(10).await.unwrap_err();
    assert_eq!(err, ClientError::Service {
        status: 500,
        message: Some("db down".to_string()),
    });
}

#[tokio::test]
async fn undecodable_body_is_network_error() {
    let backend = TestBackend::start().await;
    backend.state.garbage_leaderboard.store(true, Ordering::SeqCst);

    let err = backend.client().fetch_leaderboard(10).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}

#[tokio::test]
async fn unreachable_service_is_network_error() {
    // Grab a free port, then close it
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::new(&format!("http://{addr}"), None).unwrap();
    let err = client.fetch_leaderboard(10).await.unwrap_err();
    assert!(matches!(err, ClientError::Network(_)));
}
