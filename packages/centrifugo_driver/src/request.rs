//! Outbound broker API calls.

use std::fmt;

use serde_json::{Map, Value, json};

/// Broker HTTP API key. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

/// One API command addressed to the broker.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub endpoint: String,
    pub api_key: ApiKey,
    pub method: String,
    pub params: Map<String, Value>,
}

impl Request {
    /// HTTP headers for this call, in send order.
    pub fn headers(&self) -> [(&'static str, String); 2] {
        [
            ("Content-Type", "application/json".to_string()),
            ("Authorization", format!("apikey {}", self.api_key.as_str())),
        ]
    }

    /// JSON command envelope: `{"method": ..., "params": {...}}`.
    pub fn body(&self) -> Value {
        json!({
            "method": self.method,
            "params": self.params,
        })
    }
}

/// Assembles requests against one endpoint with one API key.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    endpoint: String,
    api_key: ApiKey,
}

impl RequestBuilder {
    pub fn new(endpoint: impl Into<String>, api_key: ApiKey) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
        }
    }

    pub fn build(&self, method: &str, params: Map<String, Value>) -> Request {
        Request {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone(),
            method: method.to_string(),
            params,
        }
    }

    pub fn publish(&self, channel: &str, data: Value) -> Request {
        self.build(
            "publish",
            params([("channel", Value::from(channel)), ("data", data)]),
        )
    }

    pub fn presence(&self, channel: &str) -> Request {
        self.build("presence", params([("channel", Value::from(channel))]))
    }

    pub fn unsubscribe(&self, channel: &str, user: &str) -> Request {
        self.build(
            "unsubscribe",
            params([("channel", Value::from(channel)), ("user", Value::from(user))]),
        )
    }

    /// One call fanning `data` out to every channel in `channels`.
    pub fn broadcast(&self, channels: &[String], data: Value) -> Request {
        self.build(
            "broadcast",
            params([("channels", Value::from(channels)), ("data", data)]),
        )
    }
}

fn params<const N: usize>(entries: [(&str, Value); N]) -> Map<String, Value> {
    entries
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}
