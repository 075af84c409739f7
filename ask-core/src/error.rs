use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The request never produced an HTTP response.
    #[error("{0}")]
    Transport(String),
    /// Non-2xx response. `message` is the backend's `detail` when it sent one.
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{0}")]
    NotAuthenticated(String),
    #[error("{0}")]
    Identity(String),
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    Validation(String),
}

impl ClientError {
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::server(status.as_u16(), err.to_string()),
            None => Self::Transport(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
