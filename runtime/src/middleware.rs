//! The middleware stage: lifecycle orchestration around one API call.
//!
//! [`ApiMiddleware::handle`] is the pipeline entry point. Messages without
//! an actionable call descriptor are forwarded unchanged. For actionable
//! ones the middleware forwards a `LOADING` lifecycle message, performs the
//! derived request, classifies the outcome, optionally normalizes the
//! success body, and forwards exactly one terminal lifecycle message. The
//! returned [`CallOutcome`] resolves with the same success/failure split,
//! so callers can chain on the asynchronous outcome without a hidden
//! exception channel — no failure ever escapes `handle`.
//!
//! Concurrent calls share only `&self` (immutable configuration, transport
//! and normalizer); each handled message carries its own state, so two
//! overlapping calls cannot interleave inside one lifecycle pair.

use crate::config::ApiConfig;
use crate::request::derive_request;
use apiflow_core::message::{
    ApiCallMessage, CallDescriptor, CallOutcome, CallSuccess, Failure, LifecycleMessage,
    LifecycleStage, Message, SuccessResult,
};
use apiflow_core::normalize::{Normalized, Normalizer};
use apiflow_core::transport::{Transport, TransportRequest};
use serde_json::Value;

/// Dispatch-pipeline stage performing declarative API calls.
///
/// Generic over the [`Transport`] that performs requests and the
/// [`Normalizer`] that flattens success bodies, both injected at
/// construction the way reducers receive their environment.
#[derive(Debug, Clone)]
pub struct ApiMiddleware<T, N> {
    config: ApiConfig,
    transport: T,
    normalizer: N,
}

impl<T, N> ApiMiddleware<T, N>
where
    T: Transport,
    N: Normalizer,
{
    /// Create the middleware stage.
    #[must_use]
    pub const fn new(config: ApiConfig, transport: T, normalizer: N) -> Self {
        Self {
            config,
            transport,
            normalizer,
        }
    }

    /// The static configuration this stage was built with.
    #[must_use]
    pub const fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Handle one pipeline message.
    ///
    /// `forward` is the pipeline continuation. It is called exactly once
    /// (with the input, unchanged) for messages without an actionable call
    /// descriptor, and exactly twice (`LOADING`, then one terminal
    /// notification) for actionable ones. The `LOADING` message is
    /// forwarded before the first await point, so once this future is
    /// polled, observers see `LOADING` before any terminal notification
    /// regardless of request latency.
    #[tracing::instrument(skip_all, fields(kind = %message.kind()))]
    pub async fn handle<F>(&self, message: Message, forward: &mut F) -> CallOutcome
    where
        F: FnMut(Message),
    {
        // Closed-variant dispatch: anything but an API call passes through.
        let call_message = match message {
            Message::ApiCall(call_message) => call_message,
            other => {
                forward(other);
                return CallOutcome::PassedThrough;
            },
        };

        let ApiCallMessage { kind, call, fields } = call_message;
        let CallDescriptor {
            endpoint,
            method,
            params,
            schema,
        } = call;

        // A descriptor missing endpoint or method cannot produce a request;
        // treat the message like a plain one.
        let (endpoint, method) = match (endpoint, method) {
            (Some(endpoint), Some(method)) => (endpoint, method),
            (endpoint, method) => {
                tracing::debug!("descriptor not actionable, passing through");
                forward(Message::ApiCall(ApiCallMessage {
                    kind,
                    call: CallDescriptor {
                        endpoint,
                        method,
                        params,
                        schema,
                    },
                    fields,
                }));
                return CallOutcome::PassedThrough;
            },
        };

        let request = derive_request(&self.config, &endpoint, method, params.as_ref());

        forward(Message::Lifecycle(LifecycleMessage {
            kind: kind.clone(),
            stage: LifecycleStage::Loading,
            fields: fields.clone(),
        }));

        tracing::debug!(%method, %endpoint, url = %request.url, "issuing api call");

        let settled = match self.invoke_and_classify(&request).await {
            Ok(body) => {
                let normalized = match &schema {
                    Some(schema) => self.normalizer.normalize(&body, schema),
                    None => Normalized::raw(&body),
                };
                Ok(CallSuccess {
                    result: SuccessResult {
                        body: normalized.result,
                        raw_body: body,
                    },
                    entities: normalized.entities,
                })
            },
            Err(failure) => Err(failure),
        };

        let stage = match &settled {
            Ok(success) => LifecycleStage::Success {
                result: success.result.clone(),
                entities: success.entities.clone(),
            },
            Err(failure) => LifecycleStage::Failure {
                result: failure.clone().into_result(),
            },
        };

        forward(Message::Lifecycle(LifecycleMessage {
            kind,
            stage,
            fields,
        }));

        CallOutcome::Settled(settled)
    }

    /// Perform the request and classify the settled outcome.
    ///
    /// - transport-level failure → [`Failure::Unknown`]
    /// - non-2xx response → parse the error body ([`Failure::Http`]); an
    ///   unparsable error body escalates to [`Failure::Unknown`]
    /// - 2xx response → parse the success body; an unparsable body
    ///   escalates to [`Failure::Unknown`]
    ///
    /// HTTP libraries report received 4xx/5xx responses as non-exceptional;
    /// this is where they join genuine transport errors in one failure
    /// channel, keeping the distinguishing status when there is one.
    async fn invoke_and_classify(&self, request: &TransportRequest) -> Result<Value, Failure> {
        let response = match self.transport.invoke(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::error!(%error, url = %request.url, "transport failure");
                return Err(Failure::Unknown);
            },
        };

        let status = response.status;
        let body: Value = match serde_json::from_str(&response.body) {
            Ok(body) => body,
            Err(error) => {
                tracing::error!(%error, status, "unparsable response body");
                return Err(Failure::Unknown);
            },
        };

        if response.is_ok() {
            Ok(body)
        } else {
            Err(Failure::Http { body, status })
        }
    }
}
