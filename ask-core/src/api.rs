use crate::answer::AnswerPayload;
use crate::config::ClientConfig;
use crate::dto::{ErrorBody, IssuePayload, LogIssueResponse, RegisterRequest};
use crate::error::ClientError;
use crate::session::SessionStore;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::RequestBuilder;
use serde_json::Value;

pub const ASK_FAILED: &str = "Server error";
pub const REGISTRATION_FAILED: &str = "Registration failed";
pub const LOG_ISSUE_FAILED: &str = "Failed to log issue";
pub const LOGIN_REQUIRED: &str = "You must be logged in to trigger simulations.";

#[async_trait(?Send)]
pub trait AskBackend {
    async fn ask(&self, question: &str, team_id: Option<&str>) -> Result<AnswerPayload, ClientError>;
}

#[async_trait(?Send)]
pub trait IssueBackend {
    async fn log_issue(&self, payload: &IssuePayload) -> Result<LogIssueResponse, ClientError>;
}

#[async_trait(?Send)]
pub trait RegistrationBackend {
    async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError>;
}

/// HTTP client for the answering backend. Reads the bearer token from the
/// session store on every call.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    config: ClientConfig,
    sessions: SessionStore,
}

impl BackendClient {
    pub fn new(config: ClientConfig, sessions: SessionStore) -> Self {
        Self::with_http(reqwest::Client::new(), config, sessions)
    }

    pub fn with_http(http: reqwest::Client, config: ClientConfig, sessions: SessionStore) -> Self {
        Self {
            http,
            config,
            sessions,
        }
    }

    async fn authorize(&self, request: RequestBuilder, endpoint: &str) -> RequestBuilder {
        match self.sessions.fresh_access_token().await {
            Some(token) => request.bearer_auth(token),
            None => {
                tracing::warn!(endpoint, "no session token, sending request without credentials");
                request
            }
        }
    }
}

#[async_trait(?Send)]
impl AskBackend for BackendClient {
    async fn ask(&self, question: &str, team_id: Option<&str>) -> Result<AnswerPayload, ClientError> {
        let mut request = self
            .http
            .post(self.config.backend_endpoint("ask"))
            .header(CONTENT_TYPE, "text/plain")
            .body(question.to_string());
        if let Some(team) = team_id {
            request = request.query(&[("team_id", team)]);
        }

        tracing::debug!(team = team_id, "ask");
        let response = self.authorize(request, "ask").await.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::server(status.as_u16(), ASK_FAILED));
        }

        let body: Value = response.json().await?;
        Ok(AnswerPayload::from_value(body))
    }
}

#[async_trait(?Send)]
impl RegistrationBackend for BackendClient {
    async fn register(&self, request: &RegisterRequest) -> Result<Value, ClientError> {
        tracing::debug!(email = %request.email, team = %request.team, "register");
        let response = self
            .http
            .post(self.config.backend_endpoint("register"))
            .json(request)
            .send()
            .await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .and_then(|b| b.message())
                .unwrap_or_else(|| REGISTRATION_FAILED.to_string());
            return Err(ClientError::server(status.as_u16(), message));
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait(?Send)]
impl IssueBackend for BackendClient {
    async fn log_issue(&self, payload: &IssuePayload) -> Result<LogIssueResponse, ClientError> {
        let token = self
            .sessions
            .fresh_access_token()
            .await
            .ok_or_else(|| ClientError::NotAuthenticated(LOGIN_REQUIRED.into()))?;

        tracing::debug!(kind = %payload.kind, "log_issue");
        let response = self
            .http
            .post(self.config.backend_endpoint("log_issue"))
            .bearer_auth(token)
            .json(payload)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::server(status.as_u16(), LOG_ISSUE_FAILED));
        }

        Ok(response.json().await?)
    }
}
