use std::sync::Arc;

use centrifugo_auth::TokenSigner;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::broadcast::{Batch, BroadcastItem, collect_bodies};
use crate::client_params::{self, ClientParamsCache};
use crate::config::{ClientConfig, DriverConfig, FileConfig};
use crate::error::{BrokerError, ConfigError};
use crate::presence;
use crate::report::{ErrorReporter, TracingReporter};
use crate::request::{Request, RequestBuilder};
use crate::response::Response;
use crate::transport::{HttpTransport, Transport};
use crate::user_id;

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Broker driver: publishes, broadcasts, queries presence and issues client tokens.
///
/// Broker failures never surface as errors. They go to the [`ErrorReporter`]
/// and the operation returns `None`, `false` or an empty list instead.
pub struct Centrifugo {
    requests: RequestBuilder,
    signer: TokenSigner,
    transport: Arc<dyn Transport>,
    reporter: Arc<dyn ErrorReporter>,
    client: Option<ClientConfig>,
    client_params: ClientParamsCache,
    clock: fn() -> i64,
}

impl Centrifugo {
    pub fn new(
        config: DriverConfig,
        transport: Arc<dyn Transport>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self {
            requests: RequestBuilder::new(config.endpoint, config.api_key),
            signer: TokenSigner::new(config.secret),
            transport,
            reporter,
            client: config.client,
            client_params: ClientParamsCache::default(),
            clock: system_clock,
        }
    }

    /// Driver over HTTP that reports through `tracing`.
    pub fn from_config(config: DriverConfig) -> Result<Self, ConfigError> {
        let transport = HttpTransport::new(config.timeout)?;
        Ok(Self::new(
            config,
            Arc::new(transport),
            Arc::new(TracingReporter),
        ))
    }

    /// Validate `fc` and build an HTTP driver. Fails before any network use.
    pub fn from_file_config(fc: &FileConfig) -> Result<Self, ConfigError> {
        Self::from_config(DriverConfig::from_file(fc)?)
    }

    /// Replace the unix-seconds clock used for client token expiry.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    fn report(&self, err: &BrokerError, context: Value) {
        self.reporter.error(&err.to_string(), &context);
    }

    /// Publish `data` to `channel`, wrapped as `{"event": data}`.
    pub fn publish(&self, channel: &str, data: Value) -> Option<Response> {
        let request = self.requests.publish(channel, json!({ "event": data }));
        self.transport
            .send(&request)
            .inspect_err(|err| {
                self.report(err, json!({"method": "publish", "data": {"channel": channel}}));
            })
            .ok()
    }

    /// Decoded presence reply for `channel`.
    pub fn presence(&self, channel: &str) -> Option<Value> {
        let request = self.requests.presence(channel);
        match self.transport.send(&request) {
            Ok(response) => Some(response.into_body()),
            Err(err) => {
                self.report(&err, json!({"method": "presence", "data": {"channel": channel}}));
                None
            }
        }
    }

    /// Send one payload to many channels in a single call.
    ///
    /// See [`Batch::from_items`] for which items take part. Returns the decoded
    /// bodies of the channels that succeeded, in the order the broker replied.
    pub fn broadcast(&self, items: &[BroadcastItem]) -> Vec<Value> {
        let Some(batch) = Batch::from_items(items) else {
            debug!(items = items.len(), "nothing to broadcast");
            return Vec::new();
        };

        let context = json!({"method": "broadcastRequest", "data": {"params": items}});
        let request = self.requests.broadcast(&batch.channels, batch.payload);
        match self.transport.send_broadcast(&request) {
            Ok(responses) => collect_bodies(responses, self.reporter.as_ref(), &context),
            Err(err) => {
                self.report(&err, context);
                Vec::new()
            }
        }
    }

    /// Whether `user` is currently subscribed to `channel`.
    pub fn is_user_online(&self, user: impl Into<Value>, channel: &str) -> bool {
        let user = user.into();
        let request = self.requests.presence(channel);
        match self.transport.send(&request) {
            Ok(response) => presence::contains_user(&response.body, user_id::normalize(&user)),
            Err(err) => {
                self.report(
                    &err,
                    json!({
                        "method": "is_user_online",
                        "data": {"userId": user, "channel": channel},
                    }),
                );
                false
            }
        }
    }

    /// Unsubscribe `user` from `channel`.
    pub fn remove_channel(&self, channel: &str, user: impl Into<Value>) -> Option<Response> {
        let user = user_id::display(&user.into());
        let request = self.requests.unsubscribe(channel, &user);
        self.transport
            .send(&request)
            .inspect_err(|err| {
                self.report(
                    err,
                    json!({"method": "remove_channel", "data": {"channel": channel, "user": user}}),
                );
            })
            .ok()
    }

    /// JSON connection parameters for a front-end client.
    ///
    /// The first non-empty result is cached and returned for every later call,
    /// whatever `user` is; see [`Centrifugo::invalidate_client_params`].
    pub fn get_client_params(&self, user: impl Into<Value>) -> String {
        let Some(client) = &self.client else {
            return self.client_params.snapshot();
        };
        let user = user.into();
        self.client_params.get_or_build(|| {
            client_params::assemble(client, &user, (self.clock)(), &self.signer)
        })
    }

    /// Drop cached client params so the next call rebuilds them.
    pub fn invalidate_client_params(&self) {
        self.client_params.clear();
    }

    /// Token authorizing connection `client` to subscribe to `channel`.
    pub fn channel_token(&self, client: &str, channel: &str, info: &Value) -> String {
        self.signer.issue_channel_token(client, channel, info)
    }

    /// Connection token for `user`; `expiry == 0` never expires.
    pub fn client_token(&self, user: impl Into<Value>, expiry: i64, info: &Value) -> String {
        let user = user_id::display(&user.into());
        self.signer.issue_connection_token(&user, expiry, info)
    }

    /// Raw request for any broker API method.
    pub fn request(&self, method: &str, params: Map<String, Value>) -> Request {
        self.requests.build(method, params)
    }
}
