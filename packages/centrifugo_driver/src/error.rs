//! Configuration faults and broker communication faults.

use centrifugo_auth::TokenError;

/// Fatal misconfiguration, raised while building the driver.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    #[error("invalid endpoint {0:?}")]
    InvalidEndpoint(String),

    #[error("failed to load configuration: {0}")]
    Load(#[from] figment::Error),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Failure talking to the broker. Never escapes a `Centrifugo` operation.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("broker request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("broker returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("undecodable broker response: {0}")]
    Decode(#[from] serde_json::Error),
}
