//! Scripted ResourceClient shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use middeploy::aws::client::{ResourceClient, ResourceKind};
use middeploy::errors::DeployError;

/// One recorded invocation
#[derive(Debug, Clone)]
pub struct Call {
    pub kind: ResourceKind,
    pub operation: String,
    pub params: Value,
}

/// Canned reply for one invocation
pub enum Reply {
    Ok(Value),
    /// Provider failure carrying an error code
    Err { code: String, message: String },
    /// Expired session token
    Expired,
}

/// Replays scripted replies in FIFO order per (service, operation)
/// pair and records every call it receives. Unscripted calls fail, so
/// a test that scripts nothing past a certain step also proves nothing
/// past that step was invoked.
#[derive(Default)]
pub struct MockClient {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<Call>>,
}

fn key(kind: ResourceKind, operation: &str) -> String {
    format!("{} {}", kind.as_str(), operation)
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply
    pub fn on_ok(&self, kind: ResourceKind, operation: &str, value: Value) {
        self.replies
            .lock()
            .unwrap()
            .entry(key(kind, operation))
            .or_default()
            .push_back(Reply::Ok(value));
    }

    /// Queue a provider failure with an error code
    pub fn on_err(&self, kind: ResourceKind, operation: &str, code: &str, message: &str) {
        self.replies
            .lock()
            .unwrap()
            .entry(key(kind, operation))
            .or_default()
            .push_back(Reply::Err {
                code: code.to_string(),
                message: message.to_string(),
            });
    }

    /// Queue an expired-credential failure
    pub fn on_expired(&self, kind: ResourceKind, operation: &str) {
        self.replies
            .lock()
            .unwrap()
            .entry(key(kind, operation))
            .or_default()
            .push_back(Reply::Expired);
    }

    /// All calls received so far, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls received for one (service, operation) pair
    pub fn calls_for(&self, kind: ResourceKind, operation: &str) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| c.kind == kind && c.operation == operation)
            .collect()
    }

    /// Number of calls received for one (service, operation) pair
    pub fn count(&self, kind: ResourceKind, operation: &str) -> usize {
        self.calls_for(kind, operation).len()
    }
}

#[async_trait]
impl ResourceClient for MockClient {
    async fn invoke(
        &self,
        kind: ResourceKind,
        operation: &str,
        params: Value,
    ) -> Result<Value, DeployError> {
        self.calls.lock().unwrap().push(Call {
            kind,
            operation: operation.to_string(),
            params,
        });

        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key(kind, operation))
            .and_then(VecDeque::pop_front);

        match reply {
            Some(Reply::Ok(value)) => Ok(value),
            Some(Reply::Err { code, message }) => {
                Err(DeployError::provider(kind, operation, Some(code), message))
            }
            Some(Reply::Expired) => Err(DeployError::ExpiredCredential(
                "session token expired, run 'aws sso login' and try again".to_string(),
            )),
            None => Err(DeployError::provider(
                kind,
                operation,
                None,
                "unscripted operation",
            )),
        }
    }
}
