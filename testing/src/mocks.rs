//! Mock collaborators for middleware tests.

use apiflow_core::message::{Message, Status};
use apiflow_core::transport::{Transport, TransportError, TransportRequest, TransportResponse};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A scripted reply the mock transport hands out.
#[derive(Debug)]
pub enum ScriptedReply {
    /// A received HTTP response (any status, raw body text).
    Response(TransportResponse),
    /// A transport-level failure.
    Error(TransportError),
}

/// Scripted [`Transport`] double.
///
/// Replies are handed out in FIFO order, one per invocation; invoking with
/// an empty script fails like a dead network. Every request is recorded
/// for assertion.
///
/// # Example
///
/// ```
/// use apiflow_testing::MockTransport;
/// use serde_json::json;
///
/// let transport = MockTransport::new();
/// transport.reply_json(200, &json!({ "data": ["a", "b"] }));
/// transport.fail("connection refused");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    /// Create an empty-scripted transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response with a JSON body.
    pub fn reply_json(&self, status: u16, body: &Value) {
        self.reply_raw(status, body.to_string());
    }

    /// Script a response with raw body text (for unparsable-body cases).
    #[allow(clippy::expect_used)]
    pub fn reply_raw(&self, status: u16, body: impl Into<String>) {
        self.replies
            .lock()
            .expect("reply script lock poisoned")
            .push_back(ScriptedReply::Response(TransportResponse {
                status,
                body: body.into(),
            }));
    }

    /// Script a transport-level failure.
    #[allow(clippy::expect_used)]
    pub fn fail(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .expect("reply script lock poisoned")
            .push_back(ScriptedReply::Error(TransportError::RequestFailed(
                message.into(),
            )));
    }

    /// Every request invoked so far, in order.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests
            .lock()
            .expect("request log lock poisoned")
            .clone()
    }
}

impl Transport for MockTransport {
    #[allow(clippy::expect_used)]
    async fn invoke(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        self.requests
            .lock()
            .expect("request log lock poisoned")
            .push(request.clone());

        let reply = self
            .replies
            .lock()
            .expect("reply script lock poisoned")
            .pop_front();

        match reply {
            Some(ScriptedReply::Response(response)) => Ok(response),
            Some(ScriptedReply::Error(error)) => Err(error),
            None => Err(TransportError::RequestFailed(
                "no scripted reply".to_string(),
            )),
        }
    }
}

/// Captures every message forwarded by the middleware.
///
/// The mock-store analog: hand [`sink`](Self::sink) to the middleware as
/// the pipeline continuation, then assert on [`messages`](Self::messages)
/// or the condensed [`statuses`](Self::statuses).
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: Arc<Mutex<Vec<Message>>>,
}

impl RecordingSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A forward closure recording into this sink.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn sink(&self) -> impl FnMut(Message) + use<> {
        let messages = Arc::clone(&self.messages);
        move |message| {
            messages
                .lock()
                .expect("message log lock poisoned")
                .push(message);
        }
    }

    /// Every forwarded message so far, in order.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn messages(&self) -> Vec<Message> {
        self.messages
            .lock()
            .expect("message log lock poisoned")
            .clone()
    }

    /// The lifecycle statuses forwarded so far, in order.
    ///
    /// Non-lifecycle messages contribute nothing.
    #[must_use]
    pub fn statuses(&self) -> Vec<Status> {
        self.messages()
            .iter()
            .filter_map(|message| match message {
                Message::Lifecycle(lifecycle) => Some(lifecycle.stage.status()),
                Message::Plain(_) | Message::ApiCall(_) => None,
            })
            .collect()
    }
}
