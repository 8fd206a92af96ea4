//! Connection parameters handed to front-end clients.
//!
//! The assembled object is memoized per driver instance: once non-empty it is
//! returned as-is for every later call, whatever user id is passed. Call
//! [`ClientParamsCache::clear`] to force a rebuild.

use std::io;
use std::sync::{Mutex, PoisonError};

use centrifugo_auth::TokenSigner;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ClientConfig;
use crate::user_id;

/// Lifetime of the connection token embedded in client params.
pub const CLIENT_TOKEN_TTL_SECS: i64 = 600;

/// Build the parameter object for `user`, with keys in wire order:
/// `url, user, info, token, timestamp, refreshEndpoint, authEndpoint, subscribeEndpoint`.
///
/// A user that normalizes to `0` gets no credentials (anonymous connection).
pub fn assemble(
    config: &ClientConfig,
    user: &Value,
    now: i64,
    signer: &TokenSigner,
) -> Map<String, Value> {
    let mut params = Map::new();

    if let Some(url) = &config.url {
        params.insert("url".into(), Value::from(url.as_str()));
    }

    if user_id::normalize(user) != 0 {
        let timestamp = now + CLIENT_TOKEN_TTL_SECS;
        let user = user_id::display(user);
        let info = config
            .token_info
            .clone()
            .unwrap_or_else(|| Value::from(""));
        let token = signer.issue_connection_token(&user, timestamp, &info);

        params.insert("user".into(), Value::from(user));
        params.insert("info".into(), Value::Null);
        params.insert("token".into(), Value::from(token));
        params.insert("timestamp".into(), Value::from(timestamp.to_string()));
    }

    let endpoints = [
        ("refreshEndpoint", &config.refresh_endpoint),
        ("authEndpoint", &config.auth_endpoint),
        ("subscribeEndpoint", &config.subscribe_endpoint),
    ];
    for (key, endpoint) in endpoints {
        if let Some(endpoint) = endpoint {
            params.insert(key.into(), Value::from(endpoint.as_str()));
        }
    }

    params
}

/// Populate-once cell for assembled params.
#[derive(Debug, Default)]
pub struct ClientParamsCache {
    params: Mutex<Map<String, Value>>,
}

impl ClientParamsCache {
    /// Return the cached JSON, or build, store and return it.
    ///
    /// An empty result is not stored, so the next call builds again.
    pub fn get_or_build(&self, build: impl FnOnce() -> Map<String, Value>) -> String {
        let mut params = self.params.lock().unwrap_or_else(PoisonError::into_inner);
        if params.is_empty() {
            *params = build();
        }
        to_json(&params)
    }

    /// Cached JSON without building.
    pub fn snapshot(&self) -> String {
        to_json(&self.params.lock().unwrap_or_else(PoisonError::into_inner))
    }

    pub fn clear(&self) {
        self.params
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

/// Serialize with `/` escaped as `\/`, the form existing front-ends were built against.
pub fn to_json(params: &Map<String, Value>) -> String {
    let mut out = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, EscapeSlashes);
    if params.serialize(&mut serializer).is_err() {
        return "{}".to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| "{}".to_string())
}

struct EscapeSlashes;

impl serde_json::ser::Formatter for EscapeSlashes {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut parts = fragment.split('/');
        if let Some(first) = parts.next() {
            writer.write_all(first.as_bytes())?;
        }
        for part in parts {
            writer.write_all(b"\\/")?;
            writer.write_all(part.as_bytes())?;
        }
        Ok(())
    }
}
