use crate::api::LOGIN_REQUIRED;
use crate::dto::{IssuePayload, LogIssueResponse};
use crate::error::ClientError;
use crate::session::Session;
use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};

#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    pub id: String,
    pub label: String,
    pub color: String,
    pub payload: IssuePayload,
}

fn metadata(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn canned(id: &str, label: &str, color: &str, text: &str, kind: &str, meta: Value) -> Scenario {
    Scenario {
        id: id.into(),
        label: label.into(),
        color: color.into(),
        payload: IssuePayload {
            text: text.into(),
            kind: kind.into(),
            metadata: metadata(meta),
        },
    }
}

pub fn catalog() -> Vec<Scenario> {
    vec![
        canned(
            "jira-bug",
            "Jira: Critical Bug",
            "#3b82f6",
            "Checkout page returns 500 error when user clicks 'Pay Now'. Payment gateway timeout.",
            "bug",
            json!({"priority": "Blocker", "source": "Jira", "ticket_id": "PROD-2391"}),
        ),
        canned(
            "pd-alert",
            "PagerDuty: DB High CPU",
            "#ef4444",
            "CRITICAL: Database primary node (db-01) CPU usage > 95% for 5 minutes.",
            "alert",
            json!({"severity": "Critical", "source": "PagerDuty", "region": "us-east-1"}),
        ),
        canned(
            "jenkins-deploy",
            "Jenkins: Deploy Failed",
            "#f59e0b",
            "Deployment #8841 to production failed. Health check timed out after 300s.",
            "deployment",
            json!({"service": "api-gateway", "source": "Jenkins", "build_url": "jenkins/job/deploy/8841"}),
        ),
        canned(
            "splunk-log",
            "Splunk: Security Warning",
            "#10b981",
            "Multiple failed login attempts detected from IP 192.168.1.55 (Brute Force Pattern).",
            "security_event",
            json!({"level": "Warning", "source": "Splunk", "user_agent": "Unknown"}),
        ),
    ]
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IssueKind {
    #[default]
    Incident,
    Bug,
    Deployment,
    Alert,
}

impl IssueKind {
    pub const ALL: [IssueKind; 4] = [
        IssueKind::Incident,
        IssueKind::Bug,
        IssueKind::Deployment,
        IssueKind::Alert,
    ];

    pub fn id(self) -> &'static str {
        match self {
            IssueKind::Incident => "incident",
            IssueKind::Bug => "bug",
            IssueKind::Deployment => "deployment",
            IssueKind::Alert => "alert",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IssueKind::Incident => "Incident",
            IssueKind::Bug => "Bug Report",
            IssueKind::Deployment => "Deployment",
            IssueKind::Alert => "Alert",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.id() == id)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

/// Free-form "log custom issue" form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CustomIssueForm {
    pub text: String,
    pub kind: IssueKind,
    pub severity: Severity,
}

impl CustomIssueForm {
    pub fn to_scenario(&self) -> Result<Scenario, ClientError> {
        let text = self.text.trim();
        if text.is_empty() {
            return Err(ClientError::Validation("Issue description is required".into()));
        }
        Ok(Scenario {
            id: "custom".into(),
            label: "Custom Issue".into(),
            color: "#4f46e5".into(),
            payload: IssuePayload {
                text: text.to_string(),
                kind: self.kind.id().to_string(),
                metadata: metadata(json!({
                    "source": "Manual Entry",
                    "severity": self.severity.id(),
                })),
            },
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryOutcome {
    Logged { detail: String },
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub outcome: EntryOutcome,
}

impl EventLogEntry {
    pub fn is_error(&self) -> bool {
        self.outcome == EntryOutcome::Failed
    }

    pub fn detail(&self) -> Option<&str> {
        match &self.outcome {
            EntryOutcome::Logged { detail } => Some(detail),
            EntryOutcome::Failed => None,
        }
    }
}

/// A trigger that passed the local session check and is waiting on the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingTrigger {
    pub label: String,
    pub payload: IssuePayload,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SimulationLog {
    entries: Vec<EventLogEntry>,
    in_flight: usize,
}

impl SimulationLog {
    /// Newest first.
    pub fn entries(&self) -> &[EventLogEntry] {
        &self.entries
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    /// Checks for a session before anything goes on the wire. Without one an
    /// error entry is recorded and no trigger is handed out.
    pub fn begin(&mut self, scenario: &Scenario, session: Option<&Session>) -> Option<PendingTrigger> {
        if session.is_none() {
            self.record_failure(&ClientError::NotAuthenticated(LOGIN_REQUIRED.into()));
            return None;
        }
        self.in_flight += 1;
        Some(PendingTrigger {
            label: scenario.label.clone(),
            payload: scenario.payload.clone(),
        })
    }

    pub fn complete(&mut self, pending: PendingTrigger, result: Result<LogIssueResponse, ClientError>) {
        self.in_flight = self.in_flight.saturating_sub(1);
        match result {
            Ok(response) => {
                let team = response.event.team_tag.as_deref().unwrap_or("unknown");
                self.prepend(EventLogEntry {
                    timestamp: Utc::now(),
                    message: format!("Triggered {}", pending.label),
                    outcome: EntryOutcome::Logged {
                        detail: format!("Tagged as Team: {team}"),
                    },
                });
            }
            Err(err) => self.record_failure(&err),
        }
    }

    fn record_failure(&mut self, err: &ClientError) {
        tracing::warn!(error = %err, "simulation trigger failed");
        self.prepend(EventLogEntry {
            timestamp: Utc::now(),
            message: format!("Error: {err}"),
            outcome: EntryOutcome::Failed,
        });
    }

    fn prepend(&mut self, entry: EventLogEntry) {
        self.entries.insert(0, entry);
    }
}
