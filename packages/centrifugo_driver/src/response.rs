//! Decoded broker replies.

use serde_json::Value;

/// One decoded reply. `error` is set when the broker rejected the command.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
    pub error: Option<String>,
}

impl Response {
    /// Classify a decoded body: an `error` member marks the reply as failed.
    pub fn from_body(status: u16, body: Value) -> Self {
        let error = body.get("error").and_then(error_message);
        Self {
            status,
            body,
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn decoded_body(&self) -> &Value {
        &self.body
    }

    pub fn into_body(self) -> Value {
        self.body
    }

    /// Split a broadcast reply into one response per channel.
    ///
    /// The broker answers `{"result": {"responses": [...]}}`; each entry is
    /// `{"result": ...}` or `{"error": ...}`. A reply without that list is kept whole.
    pub fn split_broadcast(self) -> Vec<Response> {
        let status = self.status;
        let mut body = self.body;
        match body.pointer_mut("/result/responses") {
            Some(Value::Array(entries)) => std::mem::take(entries)
                .into_iter()
                .map(|entry| Response::from_body(status, entry))
                .collect(),
            _ => vec![Response::from_body(status, body)],
        }
    }
}

fn error_message(error: &Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        Value::Object(fields) => Some(match (fields.get("message"), fields.get("code")) {
            (Some(Value::String(message)), _) => message.clone(),
            (_, Some(code)) => format!("broker error {code}"),
            _ => error.to_string(),
        }),
        other => Some(other.to_string()),
    }
}
