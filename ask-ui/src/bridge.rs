//! Browser glue: service wiring, history and session persistence.

use ask_core::api::BackendClient;
use ask_core::config::ClientConfig;
use ask_core::identity::GoTrueIdentity;
use ask_core::routes::Route;
use ask_core::session::{Session, SessionStore};
use ask_core::team::TeamAssignment;
use ask_core::ClientError;
use leptos::*;
use std::rc::Rc;
use wasm_bindgen::JsValue;

const SESSION_KEY: &str = "rag-console.session";

/// Everything the views talk to. Built once at the root and passed down
/// through context.
#[derive(Clone)]
pub struct Services {
    pub sessions: SessionStore,
    pub backend: BackendClient,
}

pub fn build_services() -> Result<Services, ClientError> {
    let config = ClientConfig::from_values(
        option_env!("RAG_BACKEND_URL"),
        option_env!("SUPABASE_URL"),
        option_env!("SUPABASE_ANON_KEY"),
    )?;

    let identity = Rc::new(GoTrueIdentity::new(config.clone()));
    identity.restore(load_session());
    let sessions = SessionStore::new(identity);
    let backend = BackendClient::new(config, sessions.clone());

    Ok(Services { sessions, backend })
}

/// Reactive mirror of the session store for the views.
#[derive(Clone, Copy)]
pub struct SessionSignals {
    pub ready: RwSignal<bool>,
    pub session: RwSignal<Option<Session>>,
    pub team: RwSignal<TeamAssignment>,
}

impl SessionSignals {
    pub fn new() -> Self {
        Self {
            ready: create_rw_signal(false),
            session: create_rw_signal(None),
            team: create_rw_signal(TeamAssignment::Unknown),
        }
    }

    pub fn sync(&self, store: &SessionStore) {
        let session = store.session();
        save_session(session.as_ref());
        self.session.set(session);
        self.team.set(store.team_assignment());
    }
}

#[derive(Clone, Copy)]
pub struct Navigator {
    pub path: RwSignal<String>,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            path: create_rw_signal(current_path()),
        }
    }

    pub fn go(&self, route: Route) {
        self.update_history(route, false);
    }

    pub fn replace(&self, route: Route) {
        self.update_history(route, true);
    }

    fn update_history(&self, route: Route, replace: bool) {
        if let Ok(history) = window().history() {
            let result = if replace {
                history.replace_state_with_url(&JsValue::NULL, "", Some(route.path()))
            } else {
                history.push_state_with_url(&JsValue::NULL, "", Some(route.path()))
            };
            if let Err(err) = result {
                tracing::warn!(?err, path = route.path(), "history update failed");
            }
        }
        self.path.set(route.path().to_string());
    }
}

pub fn current_path() -> String {
    window().location().pathname().unwrap_or_else(|_| "/".into())
}

fn load_session() -> Option<Session> {
    let storage = window().local_storage().ok().flatten()?;
    let raw = storage.get_item(SESSION_KEY).ok().flatten()?;
    match serde_json::from_str(&raw) {
        Ok(session) => Some(session),
        Err(err) => {
            tracing::warn!(error = %err, "discarding unreadable stored session");
            let _ = storage.remove_item(SESSION_KEY);
            None
        }
    }
}

fn save_session(session: Option<&Session>) {
    let Some(storage) = window().local_storage().ok().flatten() else {
        return;
    };
    let result = match session.map(serde_json::to_string) {
        Some(Ok(raw)) => storage.set_item(SESSION_KEY, &raw),
        Some(Err(err)) => {
            tracing::warn!(error = %err, "session not persisted");
            return;
        }
        None => storage.remove_item(SESSION_KEY),
    };
    if let Err(err) = result {
        tracing::warn!(?err, "local storage write failed");
    }
}

/// Browser-local time of day for a Unix timestamp in milliseconds.
pub fn local_time(epoch_millis: i64) -> String {
    let date = js_sys::Date::new(&JsValue::from_f64(epoch_millis as f64));
    date.to_locale_time_string("en-US").into()
}
