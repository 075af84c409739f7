use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub team: String,
}

/// Body of `POST /log_issue`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IssuePayload {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogIssueResponse {
    #[serde(default)]
    pub status: Option<String>,
    pub event: LoggedEvent,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoggedEvent {
    #[serde(default)]
    pub team_tag: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// Error body returned by the backend on non-2xx responses.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<Value>,
}

impl ErrorBody {
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn issue_payload_serializes_kind_as_type() {
        let mut metadata = Map::new();
        metadata.insert("source".into(), json!("Jira"));
        let payload = IssuePayload {
            text: "Checkout is down".into(),
            kind: "bug".into(),
            metadata,
        };
        assert_eq!(
            serde_json::to_value(&payload).expect("json"),
            json!({"text": "Checkout is down", "type": "bug", "metadata": {"source": "Jira"}})
        );
    }

    #[test]
    fn log_issue_response_tolerates_missing_team_tag() {
        let resp: LogIssueResponse = serde_json::from_value(json!({
            "status": "logged",
            "event": {"type": "bug", "text": "x", "metadata": {}, "timestamp": "2024-01-01T00:00:00"}
        }))
        .expect("decode");
        assert_eq!(resp.event.team_tag, None);
        assert_eq!(resp.event.kind.as_deref(), Some("bug"));
    }

    #[test]
    fn error_body_detail_strings_and_structures() {
        let body: ErrorBody = serde_json::from_value(json!({"detail": "Email taken"})).expect("decode");
        assert_eq!(body.message().as_deref(), Some("Email taken"));

        let body: ErrorBody =
            serde_json::from_value(json!({"detail": [{"msg": "field required"}]})).expect("decode");
        assert_eq!(body.message().as_deref(), Some(r#"[{"msg":"field required"}]"#));

        assert_eq!(ErrorBody::default().message(), None);
    }
}
