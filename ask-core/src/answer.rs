use serde_json::Value;

/// The shapes `/ask` is known to answer with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerPayload {
    Text(String),
    Answer(String),
    Output(String),
    /// Anything else, pretty-printed so the user still sees what came back.
    Raw(String),
}

impl AnswerPayload {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => {
                if let Some(answer) = present_scalar(&other, "answer") {
                    Self::Answer(answer)
                } else if let Some(output) = present_scalar(&other, "output") {
                    Self::Output(output)
                } else {
                    Self::Raw(pretty(&other))
                }
            }
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Text(s) | Self::Answer(s) | Self::Output(s) | Self::Raw(s) => s,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Text(s) | Self::Answer(s) | Self::Output(s) | Self::Raw(s) => s,
        }
    }
}

/// A non-empty string or a non-zero number. `false`, `null`, `0`, `""` and
/// structured values do not count as an answer.
fn present_scalar(value: &Value, field: &str) -> Option<String> {
    match value.get(field)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
