use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};

use snake_client::score_client::{AccountService, BackendClient, ScoreService};
use snake_client::session::{Display, Frontend, GameSession, SessionInput, SessionSettings};
use snake_core::api::{Credentials, LeaderboardEntry, SubmitScoreRequest, User, UserId};
use snake_core::error::ClientError;
use snake_core::game::GameState;
use snake_core::render::{CommandRecorder, Theme, render};

struct Account {
    id: u64,
    password: String,
}

/// In-memory stand-in for the score service.
#[derive(Default)]
pub struct BackendState {
    accounts: Mutex<HashMap<String, Account>>,
    scores: Mutex<Vec<(u64, String, u32)>>,
    next_id: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub register_calls: AtomicUsize,
    pub score_posts: AtomicUsize,
    /// Milliseconds `POST /api/scores` waits before answering.
    pub score_delay_ms: AtomicU64,
    pub fail_scores: AtomicBool,
    pub fail_leaderboard: AtomicBool,
    pub garbage_leaderboard: AtomicBool,
}

impl BackendState {
    fn create_account(&self, username: &str, password: &str) -> Option<u64> {
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(username) {
            return None;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1;
        accounts.insert(username.to_string(), Account {
            id,
            password: password.to_string(),
        });
        Some(id)
    }

    fn best_score(&self, id: u64) -> Option<u32> {
        self.scores
            .lock()
            .unwrap()
            .iter()
            .filter(|(uid, _, _)| *uid == id)
            .map(|&(_, _, score)| score)
            .max()
    }

    fn leaderboard(&self, limit: usize) -> Vec<Value> {
        let scores = self.scores.lock().unwrap();
        let mut best: HashMap<&str, u32> = HashMap::new();
        for (_, name, score) in scores.iter() {
            let entry = best.entry(name.as_str()).or_insert(0);
            *entry = (*entry).max(*score);
        }
        let mut rows: Vec<(&str, u32)> = best.into_iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        rows.into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, (username, score))| {
                json!({"rank": i + 1, "username": username, "score": score})
            })
            .collect()
    }

    pub fn submitted(&self) -> Vec<(u64, String, u32)> {
        self.scores.lock().unwrap().clone()
    }
}

type Shared = Arc<BackendState>;

async fn health() -> Json<Value> {
    Json(json!({
        "mensagem": "Back-end funcionando!",
        "versao": "1.0.0",
        "timestamp": "2026-01-01T00:00:00.000Z"
    }))
}

async fn register(
    State(state): State<Shared>,
    Json(body): Json<Credentials>,
) -> (StatusCode, Json<Value>) {
    state.register_calls.fetch_add(1, Ordering::SeqCst);
    match state.create_account(&body.username, &body.password) {
        Some(_) => (StatusCode::CREATED, Json(json!({"success": true}))),
        None => (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "Usuário já existe"})),
        ),
    }
}

async fn login(
    State(state): State<Shared>,
    Json(body): Json<Credentials>,
) -> (StatusCode, Json<Value>) {
    state.login_calls.fetch_add(1, Ordering::SeqCst);
    let accounts = state.accounts.lock().unwrap();
    match accounts.get(&body.username) {
        Some(account) if account.password == body.password => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "user": {"id": account.id, "username": body.username}
            })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"success": false, "error": "Credenciais inválidas"})),
        ),
    }
}

async fn best_score(State(state): State<Shared>, Path(id): Path<u64>) -> Json<Value> {
    let best = state.best_score(id).map(|score| json!({"score": score}));
    Json(json!({"success": true, "bestScore": best}))
}

#[derive(Deserialize)]
struct LeaderboardQuery {
    limit: Option<usize>,
}

async fn leaderboard(
    State(state): State<Shared>,
    Query(query): Query<LeaderboardQuery>,
) -> (StatusCode, String) {
    if state.fail_leaderboard.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"success": false, "error": "db down"}).to_string(),
        );
    }
    if state.garbage_leaderboard.load(Ordering::SeqCst) {
        return (StatusCode::OK, "<html>oops</html>".to_string());
    }
    let rows = state.leaderboard(query.limit.unwrap_or(10));
    (
        StatusCode::OK,
        json!({"success": true, "leaderboard": rows}).to_string(),
    )
}

async fn submit_score(
    State(state): State<Shared>,
    Json(body): Json<SubmitScoreRequest>,
) -> (StatusCode, Json<Value>) {
    state.score_posts.fetch_add(1, Ordering::SeqCst);
    let delay = state.score_delay_ms.load(Ordering::SeqCst);
    if delay > 0 {
        tokio::time::sleep(Duration::from_millis(delay)).await;
    }
    if state.fail_scores.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"success": false, "error": "Erro interno"})),
        );
    }
    let UserId::Number(id) = body.user_id else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"success": false, "error": "userId inválido"})),
        );
    };
    state.scores.lock().unwrap().push((id, body.username, body.score));
    (StatusCode::CREATED, Json(json!({"success": true})))
}

pub struct TestBackend {
    pub addr: SocketAddr,
    pub state: Shared,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestBackend {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(BackendState::default());
        let app = Router::new()
            .route("/", get(health))
            .route("/api/register", post(register))
            .route("/api/login", post(login))
            .route("/api/users/{id}/best-score", get(best_score))
            .route("/api/leaderboard", get(leaderboard))
            .route("/api/scores", post(submit_score))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            state,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn client(&self) -> BackendClient {
        BackendClient::new(&self.base_url(), Some(Duration::from_secs(5))).unwrap()
    }

    /// Register an account directly in the fake and return its user record.
    pub fn seed_user(&self, username: &str, password: &str) -> User {
        let id = self.state.create_account(username, password).unwrap();
        User {
            id: UserId::Number(id),
            username: username.to_string(),
        }
    }

    pub fn seed_score(&self, user: &User, score: u32) {
        let UserId::Number(id) = user.id else {
            panic!("fake backend issues numeric ids");
        };
        self.state
            .scores
            .lock()
            .unwrap()
            .push((id, user.username.clone(), score));
    }
}

/// What a frontend has put on screen so far, shared with the test while
/// the session runs.
#[derive(Debug, Default)]
pub struct FrameLog {
    pub frames: usize,
    /// Every distinct message text drawn, in order of first appearance.
    pub messages: Vec<String>,
    pub best_score: String,
    pub leaderboard: Vec<String>,
}

pub type SharedFrameLog = Arc<Mutex<FrameLog>>;

/// Frontend that keeps the last frame's draw commands.
#[derive(Default)]
pub struct RecordingFrontend {
    pub frames: usize,
    pub last: CommandRecorder,
    pub last_messages: Vec<String>,
    pub log: SharedFrameLog,
}

impl Frontend for RecordingFrontend {
    fn draw(&mut self, state: &GameState, _user: Option<&User>, display: &Display) {
        self.frames += 1;
        self.last.clear_commands();
        render(state, &Theme::default(), &mut self.last);
        self.last_messages = display
            .messages
            .visible()
            .iter()
            .map(|m| m.text.clone())
            .collect();

        let mut log = self.log.lock().unwrap();
        log.frames += 1;
        for text in &self.last_messages {
            if !log.messages.contains(text) {
                log.messages.push(text.clone());
            }
        }
        log.best_score = display.scoreboard.best_score_text();
        log.leaderboard = display.scoreboard.leaderboard_lines();
    }
}

/// Service whose login never answers; everything else succeeds at once.
pub struct StalledLoginService;

impl ScoreService for StalledLoginService {
    async fn submit_score(&self, _: &UserId, _: &str, _: u32) -> Result<(), ClientError> {
        Ok(())
    }

    async fn fetch_best_score(&self, _: &UserId) -> Result<Option<u32>, ClientError> {
        Ok(None)
    }

    async fn fetch_leaderboard(&self, _: u32) -> Result<Vec<LeaderboardEntry>, ClientError> {
        Ok(Vec::new())
    }
}

impl AccountService for StalledLoginService {
    async fn register(&self, _: &str, _: &str) -> Result<(), ClientError> {
        Ok(())
    }

    async fn login(&self, _: &str, _: &str) -> Result<User, ClientError> {
        std::future::pending().await
    }
}

pub type TestSession = GameSession<BackendClient, RecordingFrontend>;

fn fast_settings() -> SessionSettings {
    SessionSettings {
        seed: Some(7),
        tick_interval: Duration::from_millis(10),
        ..SessionSettings::default()
    }
}

/// Session against `backend` with a fast tick and a fixed seed.
pub fn make_session(backend: &TestBackend) -> TestSession {
    make_session_with(backend.client())
}

pub fn make_session_with<S>(service: S) -> GameSession<S, RecordingFrontend>
where
    S: ScoreService + AccountService,
{
    GameSession::new(fast_settings(), service, RecordingFrontend::default())
}

/// Log in and wait for the best score and leaderboard to load.
pub async fn sign_in(session: &mut TestSession, username: &str, password: &str) {
    session
        .handle_input(SessionInput::Login {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await;
    session.settle().await;
}
