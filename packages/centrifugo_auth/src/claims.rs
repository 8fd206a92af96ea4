//! Claim sets carried in the payload segment of issued tokens.
//!
//! Field declaration order is the serialized order, so the encoded payload is
//! byte-for-byte reproducible for the same inputs.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Constant JOSE header for every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub typ: String,
    pub alg: String,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: "HS256".to_string(),
        }
    }
}

/// Claims authorizing a client connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionClaims {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl ConnectionClaims {
    /// `expiry == 0` means "no expiry" and drops the claim.
    pub fn new(user: impl Into<String>, expiry: i64, info: &Value) -> Self {
        Self {
            sub: user.into(),
            info: non_empty(info),
            exp: (expiry != 0).then_some(expiry),
        }
    }
}

/// Claims authorizing one client to subscribe to one private channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelClaims {
    pub channel: String,
    pub client: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<Value>,
}

impl ChannelClaims {
    pub fn new(client: impl Into<String>, channel: impl Into<String>, info: &Value) -> Self {
        Self {
            channel: channel.into(),
            client: client.into(),
            info: non_empty(info),
        }
    }
}

/// `null` and `""` both count as "no info".
fn non_empty(info: &Value) -> Option<Value> {
    match info {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        other => Some(other.clone()),
    }
}
