//! HTTP client for the Sehat Pulse API, used by the reminder daemon.

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::{
    auth::dto::{LoginRequest, LoginResponse, MessageResponse, PublicUser, RegisterRequest},
    logs::{
        dto::{RecordLogRequest, RecordedLogResponse},
        DoseLog, DoseStatus,
    },
    schedules::{
        dto::{CreateScheduleRequest, CreatedScheduleResponse, DeleteResponse},
        Schedule,
    },
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("not logged in")]
    NotLoggedIn,
}

impl ClientError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Api { status: 401, .. } | ClientError::NotLoggedIn)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Transport(e) if e.is_timeout())
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ping {
    pub ok: bool,
    pub time: String,
}

/// Default per-request timeout, connect included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Every request fails with a transport error once `timeout` elapses.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Reuses a token obtained earlier instead of logging in.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}/api{}", self.base_url, path))
    }

    fn authed(&self, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::NotLoggedIn)?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String, ClientError> {
        let body = RegisterRequest {
            name: Some(name.into()),
            email: Some(email.into()),
            password: Some(password.into()),
        };
        let res = self.request(Method::POST, "/auth/register").json(&body).send().await?;
        Ok(decode::<MessageResponse>(res).await?.message)
    }

    /// Logs in and keeps the token for subsequent calls.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<PublicUser, ClientError> {
        let body = LoginRequest {
            email: Some(email.into()),
            password: Some(password.into()),
        };
        let res = self.request(Method::POST, "/auth/login").json(&body).send().await?;
        let login: LoginResponse = decode(res).await?;
        self.token = Some(login.token);
        debug!(user_id = %login.user.id, "logged in");
        Ok(login.user)
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    pub async fn ping(&self) -> Result<Ping, ClientError> {
        decode(self.request(Method::GET, "/ping").send().await?).await
    }

    pub async fn create_schedule(&self, req: &CreateScheduleRequest) -> Result<Schedule, ClientError> {
        let res = self.authed(Method::POST, "/schedules")?.json(req).send().await?;
        Ok(decode::<CreatedScheduleResponse>(res).await?.schedule)
    }

    pub async fn list_schedules(&self) -> Result<Vec<Schedule>, ClientError> {
        decode(self.authed(Method::GET, "/schedules")?.send().await?).await
    }

    pub async fn delete_schedule(&self, id: Uuid) -> Result<bool, ClientError> {
        let res = self
            .authed(Method::DELETE, &format!("/schedules/{id}"))?
            .send()
            .await?;
        Ok(decode::<DeleteResponse>(res).await?.success)
    }

    pub async fn delete_all_schedules(&self) -> Result<bool, ClientError> {
        let res = self.authed(Method::DELETE, "/schedules/deleteAll")?.send().await?;
        Ok(decode::<DeleteResponse>(res).await?.success)
    }

    pub async fn record_log(&self, schedule_id: Uuid, status: DoseStatus) -> Result<DoseLog, ClientError> {
        let body = RecordLogRequest {
            schedule_id: Some(schedule_id.to_string()),
            status: Some(status.as_str().into()),
        };
        let res = self.authed(Method::POST, "/logs")?.json(&body).send().await?;
        Ok(decode::<RecordedLogResponse>(res).await?.log)
    }

    pub async fn history(&self) -> Result<Vec<DoseLog>, ClientError> {
        decode(self.authed(Method::GET, "/logs/history")?.send().await?).await
    }
}

async fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if status.is_success() {
        return Ok(res.json::<T>().await?);
    }
    let fallback = status.canonical_reason().unwrap_or("request failed").to_string();
    let message = res
        .json::<ErrorBody>()
        .await
        .map(|b| b.error)
        .unwrap_or(fallback);
    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Figures shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_medicines: usize,
    pub taken: usize,
    /// Percentage in `0..=100`.
    pub success_rate: u8,
}

impl DashboardStats {
    /// `logs` is the recent history window, so the rate is taken doses in
    /// that window over the current number of schedules, capped at 100.
    pub fn compute(schedules: &[Schedule], logs: &[DoseLog]) -> Self {
        let total = schedules.len();
        let taken = logs.iter().filter(|l| l.status == DoseStatus::Taken).count();
        let success_rate = if total == 0 {
            0
        } else {
            ((taken as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };
        Self {
            total_medicines: total,
            taken,
            success_rate,
        }
    }
}
