use crate::error::ClientError;
use crate::notify::Subscription;
use crate::routes::Route;
use crate::team::{Profile, TeamAssignment, TeamContext};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: String,
    pub email: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(with = "chrono::serde::ts_seconds")]
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    TokenRefreshed,
    SignedOut,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionEvent {
    pub kind: AuthEvent,
    pub session: Option<Session>,
}

/// Boundary to the external identity service.
#[async_trait(?Send)]
pub trait IdentityProvider {
    async fn get_session(&self) -> Result<Option<Session>, ClientError>;

    fn subscribe(&self) -> Subscription<SessionEvent>;

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, ClientError>;

    async fn sign_out(&self) -> Result<(), ClientError>;

    /// At most one profile row for `user_id`.
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, ClientError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    /// First session, or a session for a different user.
    Established { user_id: String },
    /// Same user, new credentials.
    Rotated,
    Cleared,
    Unchanged,
}

/// Sole owner of the published session. Clones share state.
#[derive(Clone)]
pub struct SessionStore {
    identity: Rc<dyn IdentityProvider>,
    current: Rc<RefCell<Option<Session>>>,
    team: TeamContext,
}

impl SessionStore {
    pub fn new(identity: Rc<dyn IdentityProvider>) -> Self {
        let team = TeamContext::new(Rc::clone(&identity));
        Self {
            identity,
            current: Rc::new(RefCell::new(None)),
            team,
        }
    }

    pub fn identity(&self) -> &Rc<dyn IdentityProvider> {
        &self.identity
    }

    pub fn session(&self) -> Option<Session> {
        self.current.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.current.borrow().as_ref().map(|s| s.access_token.clone())
    }

    /// Bearer token for an outbound call. An expired session is re-read
    /// through the identity provider first, so a rotated token replaces the
    /// published one (or the session is cleared if refresh fails).
    pub async fn fresh_access_token(&self) -> Option<String> {
        let expired = self
            .current
            .borrow()
            .as_ref()
            .map(|s| s.is_expired_at(Utc::now()))?;
        if expired {
            match self.identity.get_session().await {
                Ok(session) => {
                    let kind = if session.is_some() {
                        AuthEvent::TokenRefreshed
                    } else {
                        AuthEvent::SignedOut
                    };
                    self.process(SessionEvent { kind, session }).await;
                }
                Err(err) => tracing::warn!(error = %err, "could not refresh expired session"),
            }
        }
        self.access_token()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.borrow().is_some()
    }

    pub fn team(&self) -> &TeamContext {
        &self.team
    }

    pub fn team_assignment(&self) -> TeamAssignment {
        self.team.assignment()
    }

    pub fn subscribe(&self) -> Subscription<SessionEvent> {
        self.identity.subscribe()
    }

    pub async fn initialize(&self) -> Result<SessionChange, ClientError> {
        let session = self.identity.get_session().await?;
        Ok(self
            .process(SessionEvent {
                kind: AuthEvent::InitialSession,
                session,
            })
            .await)
    }

    /// Replaces the published session without touching the network.
    pub fn publish(&self, next: Option<Session>) -> SessionChange {
        let previous = self.current.replace(next.clone());
        let change = match (previous, next) {
            (Some(_), None) => SessionChange::Cleared,
            (None, None) => SessionChange::Unchanged,
            (None, Some(n)) => SessionChange::Established { user_id: n.user_id },
            (Some(p), Some(n)) if p.user_id != n.user_id => {
                SessionChange::Established { user_id: n.user_id }
            }
            (Some(p), Some(n)) if p == n => SessionChange::Unchanged,
            (Some(_), Some(_)) => SessionChange::Rotated,
        };

        match &change {
            SessionChange::Cleared | SessionChange::Established { .. } => self.team.clear(),
            SessionChange::Rotated | SessionChange::Unchanged => {}
        }
        change
    }

    pub async fn process(&self, event: SessionEvent) -> SessionChange {
        let change = self.publish(event.session);
        tracing::info!(kind = ?event.kind, change = ?change, "session event");
        if let SessionChange::Established { user_id } = &change {
            self.team.resolve(user_id).await;
        }
        change
    }

    /// Drives `process` for every event until the subscription ends or the
    /// returned future is dropped.
    pub async fn run(
        &self,
        mut events: Subscription<SessionEvent>,
        mut on_change: impl FnMut(&SessionChange),
    ) {
        while let Some(event) = events.next().await {
            let change = self.process(event).await;
            on_change(&change);
        }
    }

    pub async fn logout(&self) -> Route {
        if let Err(err) = self.identity.sign_out().await {
            tracing::warn!(error = %err, "sign-out request failed");
        }
        self.publish(None);
        Route::Login
    }
}
