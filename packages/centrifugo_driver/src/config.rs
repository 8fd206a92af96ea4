use std::path::Path;
use std::time::Duration;

use centrifugo_auth::Secret;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::request::ApiKey;

// =============================================================================
// File config (figment-deserialized from defaults / centrifugo.toml / env vars)
// =============================================================================
//
//   centrifugo.toml:  endpoint = "http://127.0.0.1:8000/api"
//                     [client_config]
//                     url = "ws://127.0.0.1:8000/connection/websocket"
//
//   env var:          CENTRIFUGO_CLIENT_CONFIG__URL=...   (double underscore = nesting)
//
// Legacy camelCase keys (`clientConfig`, `authEndpoint`, ...) are accepted
// as aliases so existing config files keep working.

/// Top-level tunable configuration, deserialized by figment.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileConfig {
    /// Broker HTTP API URL. `//host/api` takes its scheme from `https`.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::string"
    )]
    pub endpoint: Option<String>,
    /// Token signing secret shared with the broker.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::string"
    )]
    pub secret: Option<String>,
    /// Broker HTTP API key.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::string"
    )]
    pub apikey: Option<String>,
    /// Scheme for protocol-relative endpoints.
    #[serde(default)]
    pub https: bool,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default, alias = "clientConfig", skip_serializing_if = "Option::is_none")]
    pub client_config: Option<ClientConfig>,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            secret: None,
            apikey: None,
            https: false,
            timeout_secs: default_timeout_secs(),
            client_config: None,
        }
    }
}

/// Settings handed to front-end clients (lives under `[client_config]`).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Connection URL for the browser client.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, alias = "authEndpoint")]
    pub auth_endpoint: Option<String>,
    #[serde(default, alias = "refreshEndpoint")]
    pub refresh_endpoint: Option<String>,
    #[serde(default, alias = "subscribeEndpoint")]
    pub subscribe_endpoint: Option<String>,
    /// Attached as the `info` claim of issued connection tokens.
    #[serde(default, alias = "tokenInfo")]
    pub token_info: Option<Value>,
}

/// Env values are parsed before they reach serde: `CENTRIFUGO_SECRET=12345`
/// arrives as an integer and `CENTRIFUGO_APIKEY=true` as a bool. String
/// settings take scalars back in their text form. Leading zeros of an
/// all-digit env value are already gone at that point; set such values in
/// the TOML file, quoted.
mod lenient {
    use std::fmt;

    use serde::{Deserializer, de};

    pub fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct ScalarVisitor;

        impl<'de> de::Visitor<'de> for ScalarVisitor {
            type Value = Option<String>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a string or a scalar")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(Some(v.to_owned()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(Some(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_char<E: de::Error>(self, v: char) -> Result<Self::Value, E> {
                Ok(Some(v.to_string()))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(None)
            }

            fn visit_some<V: Deserializer<'de>>(self, d: V) -> Result<Self::Value, V::Error> {
                d.deserialize_any(ScalarVisitor)
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn default_timeout_secs() -> u64 {
    10
}

/// Build a figment that layers: defaults → config file → CENTRIFUGO_* env vars.
///
/// Env vars use double-underscore for nesting into sections:
///   `CENTRIFUGO_ENDPOINT=http://...`  →  `endpoint`
///   `CENTRIFUGO_CLIENT_CONFIG__TOKEN_INFO=vip`  →  `client_config.token_info`
pub fn load_config(path: &Path) -> figment::Figment {
    use figment::{
        Figment,
        providers::{Env, Format, Serialized, Toml},
    };

    Figment::from(Serialized::defaults(FileConfig::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CENTRIFUGO_").split("__"))
}

// =============================================================================
// Runtime config (validated view of FileConfig)
// =============================================================================

/// Validated driver settings. Holding one means every required setting was present.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub endpoint: String,
    pub secret: Secret,
    pub api_key: ApiKey,
    pub timeout: Duration,
    pub client: Option<ClientConfig>,
}

impl DriverConfig {
    pub fn from_file(fc: &FileConfig) -> Result<Self, ConfigError> {
        let endpoint = required(fc.endpoint.as_deref(), "endpoint")?;
        let secret = required(fc.secret.as_deref(), "secret")?;
        let api_key = required(fc.apikey.as_deref(), "apikey")?;

        Ok(Self {
            endpoint: resolve_endpoint(endpoint, fc.https)?,
            secret: Secret::new(secret)?,
            api_key: ApiKey::new(api_key),
            timeout: Duration::from_secs(fc.timeout_secs),
            client: fc.client_config.clone(),
        })
    }

    /// Load from `path` plus environment and validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let fc: FileConfig = load_config(path).extract()?;
        Self::from_file(&fc)
    }
}

fn required<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

/// Give protocol-relative endpoints an explicit scheme and check the result parses.
fn resolve_endpoint(endpoint: &str, https: bool) -> Result<String, ConfigError> {
    let endpoint = match endpoint.strip_prefix("//") {
        Some(rest) if https => format!("https://{rest}"),
        Some(rest) => format!("http://{rest}"),
        None => endpoint.to_string(),
    };
    reqwest::Url::parse(&endpoint).map_err(|_| ConfigError::InvalidEndpoint(endpoint.clone()))?;
    Ok(endpoint)
}
