//! Centrifugo HTTP API driver.
//!
//! Publishes and broadcasts to channels, queries presence, and issues the
//! connection and channel tokens front-end clients need. All network I/O
//! goes through an injected [`Transport`]; failures are reported to an
//! [`ErrorReporter`] and downgraded to empty results rather than returned.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use centrifugo_driver::{BroadcastItem, Centrifugo, DriverConfig};
//! use serde_json::json;
//!
//! let config = DriverConfig::load(Path::new("centrifugo.toml")).unwrap();
//! let driver = Centrifugo::from_config(config).unwrap();
//!
//! driver.publish("news", json!({"title": "hello"}));
//! let delivered = driver.broadcast(&[
//!     BroadcastItem::new("user:1", json!({"ping": true})),
//!     BroadcastItem::new("user:2", json!({"ping": true})),
//! ]);
//! println!("{} channels accepted", delivered.len());
//!
//! let params = driver.get_client_params(1);
//! ```

pub mod broadcast;
pub mod client_params;
pub mod config;
mod driver;
pub mod error;
pub mod presence;
pub mod report;
pub mod request;
pub mod response;
#[cfg(test)]
mod test_helpers;
pub mod transport;
pub mod user_id;

pub use broadcast::BroadcastItem;
pub use config::{ClientConfig, DriverConfig, FileConfig};
pub use driver::Centrifugo;
pub use error::{BrokerError, ConfigError};
pub use report::{ErrorReporter, TracingReporter};
pub use request::{ApiKey, Request, RequestBuilder};
pub use response::Response;
pub use transport::{HttpTransport, Transport};
