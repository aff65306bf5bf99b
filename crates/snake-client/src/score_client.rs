use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;

use snake_core::api::{
    ApiAck, BestScoreResponse, Credentials, HealthInfo, LeaderboardEntry, LeaderboardResponse,
    LoginResponse, SubmitScoreRequest, User, UserId,
};
use snake_core::config::SnakeConfig;
use snake_core::error::ClientError;

/// Score operations the game session depends on.
pub trait ScoreService: Send + Sync + 'static {
    fn submit_score(
        &self,
        user_id: &UserId,
        username: &str,
        score: u32,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// `None` when the user has no recorded score yet.
    fn fetch_best_score(
        &self,
        user_id: &UserId,
    ) -> impl Future<Output = Result<Option<u32>, ClientError>> + Send;

    fn fetch_leaderboard(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<LeaderboardEntry>, ClientError>> + Send;
}

/// Account operations: sign-up and sign-in.
pub trait AccountService: Send + Sync + 'static {
    fn register(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<User, ClientError>> + Send;
}

/// Error body some endpoints send with a non-2xx status.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
}

/// HTTP client for the score service.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let mut builder = reqwest::Client::builder().user_agent("snake-client/0.1");
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &SnakeConfig) -> Result<Self, ClientError> {
        Self::new(&config.backend.base_url, config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `/api/users/{id}/best-score`, with the id escaped as one path segment.
    fn best_score_url(&self, user_id: &UserId) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Validation(format!("invalid backend URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Validation("backend URL cannot take a path".to_string()))?
            .pop_if_empty()
            .extend(["api", "users", &user_id.to_string(), "best-score"]);
        Ok(url)
    }

    /// Service status check (`GET /`).
    pub async fn health(&self) -> Result<HealthInfo, ClientError> {
        let resp = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        read_json(resp).await
    }
}

impl AccountService for BackendClient {
    /// Create an account. Empty credentials are rejected without a request.
    async fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let body = credentials(username, password)?;
        let resp = self
            .client
            .post(self.url("/api/register"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let ack: ApiAck = read_json(resp).await?;
        ensure_success(ack.success, status, ack.error)?;
        tracing::info!(username, "Registered");
        Ok(())
    }

    /// Authenticate and return the user record.
    async fn login(&self, username: &str, password: &str) -> Result<User, ClientError> {
        let body = credentials(username, password)?;
        let resp = self
            .client
            .post(self.url("/api/login"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let login: LoginResponse = read_json(resp).await?;
        ensure_success(login.success, status, login.error)?;
        let user = login.user.ok_or_else(|| {
            ClientError::Network("login response is missing the user".to_string())
        })?;
        tracing::info!(username = %user.username, user_id = %user.id, "Logged in");
        Ok(user)
    }
}

impl ScoreService for BackendClient {
    async fn submit_score(
        &self,
        user_id: &UserId,
        username: &str,
        score: u32,
    ) -> Result<(), ClientError> {
        let body = SubmitScoreRequest {
            user_id: user_id.clone(),
            username: username.to_string(),
            score,
        };
        let resp = self
            .client
            .post(self.url("/api/scores"))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let ack: ApiAck = read_json(resp).await?;
        ensure_success(ack.success, status, ack.error)
    }

    async fn fetch_best_score(&self, user_id: &UserId) -> Result<Option<u32>, ClientError> {
        let resp = self
            .client
            .get(self.best_score_url(user_id)?)
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let best: BestScoreResponse = read_json(resp).await?;
        ensure_success(best.success, status, best.error)?;
        Ok(best.best_score.map(|b| b.score))
    }

    async fn fetch_leaderboard(&self, limit: u32) -> Result<Vec<LeaderboardEntry>, ClientError> {
        let resp = self
            .client
            .get(self.url("/api/leaderboard"))
            .query(&[("limit", limit)])
            .send()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let board: LeaderboardResponse = read_json(resp).await?;
        ensure_success(board.success, status, board.error)?;
        Ok(board.leaderboard)
    }
}

fn credentials(username: &str, password: &str) -> Result<Credentials, ClientError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ClientError::Validation(
            "username must not be empty".to_string(),
        ));
    }
    if password.is_empty() {
        return Err(ClientError::Validation(
            "password must not be empty".to_string(),
        ));
    }
    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

fn ensure_success(success: bool, status: u16, error: Option<String>) -> Result<(), ClientError> {
    if success {
        Ok(())
    } else {
        Err(ClientError::Service {
            status,
            message: error,
        })
    }
}

/// Decode a 2xx body as `T`. Non-2xx responses become `Service` errors,
/// keeping the body's `error` text when present.
async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error);
        return Err(ClientError::Service {
            status: status.as_u16(),
            message,
        });
    }
    resp.json()
        .await
        .map_err(|e| ClientError::Network(e.to_string()))
}
