//! Folding many `(channel, payload)` items into one broadcast call and
//! reducing the per-channel replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::report::ErrorReporter;
use crate::response::Response;

/// One broadcast input. Items lacking a channel or a payload are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastItem {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, rename = "data")]
    pub payload: Option<Value>,
}

impl BroadcastItem {
    pub fn new(channel: impl Into<String>, payload: Value) -> Self {
        Self {
            channel: Some(channel.into()),
            payload: Some(payload),
        }
    }
}

/// Channels plus the single payload they all receive.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub channels: Vec<String>,
    pub payload: Value,
}

impl Batch {
    /// Collect qualifying channels in input order (duplicates kept).
    ///
    /// Every channel gets the payload of the first qualifying item; payloads
    /// on later items are ignored. `None` when nothing qualifies.
    pub fn from_items(items: &[BroadcastItem]) -> Option<Self> {
        let mut qualifying = items.iter().filter_map(|item| {
            let payload = item.payload.as_ref().filter(|p| !p.is_null())?;
            Some((item.channel.as_ref()?, payload))
        });

        let (first_channel, payload) = qualifying.next()?;
        let mut channels = vec![first_channel.clone()];
        channels.extend(qualifying.map(|(channel, _)| channel.clone()));

        Some(Self {
            channels,
            payload: payload.clone(),
        })
    }
}

/// Keep successful bodies in reply order; report and drop the failures.
pub fn collect_bodies(
    responses: Vec<Response>,
    reporter: &dyn ErrorReporter,
    context: &Value,
) -> Vec<Value> {
    responses
        .into_iter()
        .filter_map(|response| match response.error {
            Some(message) => {
                reporter.error(&message, context);
                None
            }
            None => Some(response.body),
        })
        .collect()
}
