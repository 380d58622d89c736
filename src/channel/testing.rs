//! In-memory channel for exercising the session core without a bus.
//!
//! [`MockChannel`] records every invocation and answers with canned
//! replies. By default it behaves like a healthy netplan service: the
//! session factory hands out a fresh object path per call, `Get` returns a
//! fixed document and every other method returns `true`. Individual
//! replies can be overridden per method, once or persistently.
//!
//! # Example
//!
//! ```ignore
//! use netplan_client::channel::testing::MockChannel;
//!
//! let channel = MockChannel::new();
//! channel.fail_next("Apply", "io.netplan.Netplan.Error", "apply failed");
//! ```

use super::{BusKind, ChannelError, ObjectHandle, RemoteError, ReplyKind, RpcChannel, Value};
use crate::env;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Document returned by `Get` unless overridden
pub const DEFAULT_DOCUMENT: &str = "network:\n  version: 2\n  renderer: networkd\n";

/// One invocation seen by the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub service: String,
    pub path: String,
    pub interface: String,
    pub method: String,
    pub args: Vec<Value>,
}

#[derive(Debug, Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    queued: HashMap<String, VecDeque<Result<Value, ChannelError>>>,
    fixed: HashMap<String, Result<Value, ChannelError>>,
    sessions_created: u32,
}

/// Recording, scriptable [`RpcChannel`]
#[derive(Debug)]
pub struct MockChannel {
    factory_method: String,
    document: String,
    state: Mutex<MockState>,
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            factory_method: env::netplan::SESSION_FACTORY_METHOD.to_string(),
            document: DEFAULT_DOCUMENT.to_string(),
            state: Mutex::new(MockState::default()),
        }
    }

    /// Use a different document for `Get`
    pub fn with_document(mut self, document: impl Into<String>) -> Self {
        self.document = document.into();
        self
    }

    /// Treat `method` as the session factory instead of `Config`
    pub fn with_factory_method(mut self, method: impl Into<String>) -> Self {
        self.factory_method = method.into();
        self
    }

    /// Answer the next call to `method` with `reply`
    pub fn push_reply(&self, method: &str, reply: Result<Value, ChannelError>) {
        let mut state = self.lock();
        state
            .queued
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Answer the next call to `method` with a remote error reply
    pub fn fail_next(&self, method: &str, name: &str, message: &str) {
        self.push_reply(method, Err(ChannelError::Remote(RemoteError::new(name, message))));
    }

    /// Answer every call to `method` with `reply` until cleared
    pub fn always(&self, method: &str, reply: Result<Value, ChannelError>) {
        self.lock().fixed.insert(method.to_string(), reply);
    }

    /// Drop a persistent override installed with [`MockChannel::always`]
    pub fn clear(&self, method: &str) {
        self.lock().fixed.remove(method);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    /// Method names in call order
    pub fn method_log(&self) -> Vec<String> {
        self.lock().calls.iter().map(|c| c.method.clone()).collect()
    }

    pub fn count(&self, method: &str) -> usize {
        self.lock().calls.iter().filter(|c| c.method == method).count()
    }

    pub fn sessions_created(&self) -> u32 {
        self.lock().sessions_created
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not hide the recorded calls from others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn default_reply(&self, state: &mut MockState, method: &str) -> Value {
        if method == self.factory_method {
            state.sessions_created += 1;
            return Value::ObjectPath(format!(
                "{}/config/S{:04}",
                env::netplan::ROOT_OBJECT_PATH,
                state.sessions_created
            ));
        }

        match method {
            "Get" => Value::Str(self.document.clone()),
            _ => Value::Bool(true),
        }
    }
}

#[async_trait]
impl RpcChannel for MockChannel {
    async fn invoke(
        &self,
        object: &ObjectHandle,
        interface: &str,
        method: &str,
        args: &[Value],
        _reply: ReplyKind,
    ) -> Result<Value, ChannelError> {
        let mut state = self.lock();
        state.calls.push(RecordedCall {
            service: object.service().to_string(),
            path: object.path().to_string(),
            interface: interface.to_string(),
            method: method.to_string(),
            args: args.to_vec(),
        });

        if let Some(reply) = state.queued.get_mut(method).and_then(VecDeque::pop_front) {
            return reply;
        }
        if let Some(reply) = state.fixed.get(method) {
            return reply.clone();
        }
        Ok(self.default_reply(&mut state, method))
    }

    fn bus(&self) -> BusKind {
        BusKind::Session
    }
}
