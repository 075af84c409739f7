use crate::error::ClientError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub backend_url: String,
    pub identity_url: String,
    pub identity_anon_key: String,
}

impl ClientConfig {
    /// Builds a config from already-resolved values. The UI passes the
    /// `option_env!` values captured at compile time.
    pub fn from_values(
        backend_url: Option<&str>,
        identity_url: Option<&str>,
        identity_anon_key: Option<&str>,
    ) -> Result<Self, ClientError> {
        let identity_url = non_empty(identity_url)
            .ok_or_else(|| ClientError::Config("SUPABASE_URL is not set".into()))?;
        let identity_anon_key = non_empty(identity_anon_key)
            .ok_or_else(|| ClientError::Config("SUPABASE_ANON_KEY is not set".into()))?;
        let backend_url = non_empty(backend_url).unwrap_or(DEFAULT_BACKEND_URL);

        Ok(Self {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            identity_url: identity_url.trim_end_matches('/').to_string(),
            identity_anon_key: identity_anon_key.to_string(),
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let backend = std::env::var("RAG_BACKEND_URL").ok();
        let url = std::env::var("SUPABASE_URL").ok();
        let key = std::env::var("SUPABASE_ANON_KEY").ok();
        Self::from_values(backend.as_deref(), url.as_deref(), key.as_deref())
    }

    pub fn backend_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.backend_url, path.trim_start_matches('/'))
    }

    pub fn identity_endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.identity_url, path.trim_start_matches('/'))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
