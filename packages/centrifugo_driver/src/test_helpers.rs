use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde_json::Value;

use crate::config::{ClientConfig, DriverConfig, FileConfig};
use crate::driver::Centrifugo;
use crate::error::BrokerError;
use crate::report::ErrorReporter;
use crate::request::Request;
use crate::response::Response;
use crate::transport::Transport;

/// Scripted reply for one `FakeTransport` call.
pub enum Reply {
    Ok(Vec<Response>),
    Fail(String),
}

/// In-memory transport: records every request and plays back scripted replies.
/// With no replies left it answers `{"result": {}}`.
#[derive(Default)]
pub struct FakeTransport {
    requests: Mutex<Vec<Request>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl FakeTransport {
    pub fn replying(bodies: Vec<Value>) -> Self {
        let fake = Self::default();
        fake.push(Reply::Ok(
            bodies
                .into_iter()
                .map(|body| Response::from_body(200, body))
                .collect(),
        ));
        fake
    }

    pub fn failing(message: &str) -> Self {
        let fake = Self::default();
        fake.push(Reply::Fail(message.to_string()));
        fake
    }

    pub fn push(&self, reply: Reply) {
        self.replies.lock().unwrap().push_back(reply);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &Request) -> Result<Vec<Response>, BrokerError> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Reply::Ok(responses)) => Ok(responses),
            Some(Reply::Fail(message)) => Err(BrokerError::Status {
                status: 500,
                body: message,
            }),
            None => Ok(vec![Response::from_body(
                200,
                serde_json::json!({"result": {}}),
            )]),
        }
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: &Request) -> Result<Response, BrokerError> {
        let mut responses = self.next(request)?;
        Ok(if responses.is_empty() {
            Response::from_body(200, Value::Null)
        } else {
            responses.remove(0)
        })
    }

    fn send_broadcast(&self, request: &Request) -> Result<Vec<Response>, BrokerError> {
        self.next(request)
    }
}

/// Reporter that keeps every report for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    reports: Mutex<Vec<(String, Value)>>,
}

impl RecordingReporter {
    pub fn messages(&self) -> Vec<String> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(message, _)| message.clone())
            .collect()
    }

    pub fn contexts(&self) -> Vec<Value> {
        self.reports
            .lock()
            .unwrap()
            .iter()
            .map(|(_, context)| context.clone())
            .collect()
    }
}

impl ErrorReporter for RecordingReporter {
    fn error(&self, message: &str, context: &Value) {
        self.reports
            .lock()
            .unwrap()
            .push((message.to_string(), context.clone()));
    }
}

/// Build a driver over `transport` with the given client config and a fixed clock.
///
/// Returns the driver plus handles to the fakes for assertions.
pub fn test_driver(
    transport: FakeTransport,
    client: Option<ClientConfig>,
) -> (Centrifugo, Arc<FakeTransport>, Arc<RecordingReporter>) {
    let config = DriverConfig::from_file(&FileConfig {
        endpoint: Some("http://127.0.0.1:8000/api".into()),
        secret: Some("secret".into()),
        apikey: Some("key".into()),
        client_config: client,
        ..Default::default()
    })
    .expect("config");

    let transport = Arc::new(transport);
    let reporter = Arc::new(RecordingReporter::default());
    let driver = Centrifugo::new(config, transport.clone(), reporter.clone())
        .with_clock(|| 1_700_000_000);
    (driver, transport, reporter)
}
