//! GoTrue / PostgREST adapter for [`IdentityProvider`].

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::notify::{Broadcaster, Subscription};
use crate::session::{AuthEvent, IdentityProvider, Session, SessionEvent};
use crate::team::Profile;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use std::cell::RefCell;

const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: TokenUser,
}

#[derive(Deserialize)]
struct TokenUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        let expires_at = self
            .expires_at
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .unwrap_or_else(|| {
                now + Duration::seconds(self.expires_in.unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS))
            });
        Session {
            user_id: self.user.id,
            email: self.user.email,
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
        }
    }
}

#[derive(Default, Deserialize)]
struct ProviderError {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ProviderError {
    fn into_message(self) -> Option<String> {
        [self.error_description, self.msg, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

#[derive(Deserialize)]
struct ProfileRow {
    #[serde(default)]
    team_name: Option<String>,
}

pub struct GoTrueIdentity {
    http: reqwest::Client,
    config: ClientConfig,
    current: RefCell<Option<Session>>,
    events: Broadcaster<SessionEvent>,
}

impl GoTrueIdentity {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_http(reqwest::Client::new(), config)
    }

    pub fn with_http(http: reqwest::Client, config: ClientConfig) -> Self {
        Self {
            http,
            config,
            current: RefCell::new(None),
            events: Broadcaster::new(),
        }
    }

    /// Seeds a previously persisted session. No event is published; the
    /// session store picks it up through `get_session`.
    pub fn restore(&self, session: Option<Session>) {
        self.current.replace(session);
    }

    fn request(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.config.identity_anon_key)
    }

    fn set_session(&self, kind: AuthEvent, session: Option<Session>) {
        self.current.replace(session.clone());
        self.events.publish(SessionEvent { kind, session });
    }

    async fn token_grant(
        &self,
        grant_type: &str,
        body: serde_json::Value,
    ) -> Result<Session, ClientError> {
        let response = self
            .request(self.http.post(self.config.identity_endpoint("auth/v1/token")))
            .query(&[("grant_type", grant_type)])
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.into_session(Utc::now()))
    }

    async fn refresh(&self, refresh_token: &str) -> Result<Session, ClientError> {
        self.token_grant("refresh_token", json!({ "refresh_token": refresh_token }))
            .await
    }
}

async fn provider_error(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ProviderError>(&text)
        .ok()
        .and_then(ProviderError::into_message)
        .unwrap_or_else(|| format!("identity provider returned {status}"));
    ClientError::Identity(message)
}

#[async_trait(?Send)]
impl IdentityProvider for GoTrueIdentity {
    async fn get_session(&self) -> Result<Option<Session>, ClientError> {
        let Some(session) = self.current.borrow().clone() else {
            return Ok(None);
        };
        if !session.is_expired_at(Utc::now()) {
            return Ok(Some(session));
        }

        let Some(refresh_token) = session.refresh_token.as_deref() else {
            tracing::info!(user_id = %session.user_id, "stored session expired");
            self.set_session(AuthEvent::SignedOut, None);
            return Ok(None);
        };

        match self.refresh(refresh_token).await {
            Ok(fresh) => {
                self.set_session(AuthEvent::TokenRefreshed, Some(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(err) => {
                tracing::warn!(error = %err, "session refresh failed");
                self.set_session(AuthEvent::SignedOut, None);
                Ok(None)
            }
        }
    }

    fn subscribe(&self) -> Subscription<SessionEvent> {
        self.events.subscribe()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError> {
        let session = self
            .token_grant("password", json!({ "email": email, "password": password }))
            .await?;
        tracing::info!(user_id = %session.user_id, "signed in");
        self.set_session(AuthEvent::SignedIn, Some(session.clone()));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), ClientError> {
        let token = self.current.borrow().as_ref().map(|s| s.access_token.clone());
        let result = match token {
            Some(token) => {
                let sent = self
                    .request(self.http.post(self.config.identity_endpoint("auth/v1/logout")))
                    .bearer_auth(token)
                    .send()
                    .await;
                match sent {
                    Ok(response) if response.status().is_success() => Ok(()),
                    Ok(response) => Err(provider_error(response).await),
                    Err(err) => Err(err.into()),
                }
            }
            None => Ok(()),
        };
        // Local state goes regardless of what the server said.
        self.set_session(AuthEvent::SignedOut, None);
        result
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ClientError> {
        let bearer = self
            .current
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone())
            .unwrap_or_else(|| self.config.identity_anon_key.clone());
        let response = self
            .request(self.http.get(self.config.identity_endpoint("rest/v1/profiles")))
            .query(&[("id", format!("eq.{user_id}")), ("select", "team_name".into())])
            .bearer_auth(bearer)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(provider_error(response).await);
        }

        let rows: Vec<ProfileRow> = response.json().await?;
        Ok(rows.into_iter().next().map(|row| Profile {
            user_id: user_id.to_string(),
            team_name: row.team_name,
        }))
    }
}
