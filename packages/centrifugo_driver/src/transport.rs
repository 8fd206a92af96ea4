//! Delivery of requests to the broker.

use std::time::Duration;

use tracing::debug;

use crate::error::{BrokerError, ConfigError};
use crate::request::Request;
use crate::response::Response;

/// Sends requests to the broker and decodes the replies.
///
/// Implementations block until the reply arrives or the call fails.
pub trait Transport: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response, BrokerError>;

    /// Send a `broadcast` command and return one response per channel,
    /// in the order the broker listed them.
    fn send_broadcast(&self, request: &Request) -> Result<Vec<Response>, BrokerError> {
        Ok(self.send(request)?.split_broadcast())
    }
}

/// [`Transport`] over the broker's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &Request) -> Result<Response, BrokerError> {
        debug!(method = %request.method, endpoint = %request.endpoint, "sending broker request");

        let mut builder = self.client.post(&request.endpoint);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        let reply = builder.json(&request.body()).send()?;

        let status = reply.status();
        let text = reply.text()?;
        if !status.is_success() {
            return Err(BrokerError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let body = if text.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&text)?
        };
        let response = Response::from_body(status.as_u16(), body);
        debug!(
            method = %request.method,
            status = response.status,
            rejected = response.is_error(),
            "broker replied"
        );
        Ok(response)
    }
}
