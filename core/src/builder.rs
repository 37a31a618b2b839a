//! Fluent builder for API call messages.
//!
//! Assembles a [`Message::ApiCall`] step by step, validating each argument
//! eagerly so misuse fails at construction time, long before any network
//! activity. Every setter consumes the builder and returns a new value, so
//! a partially-built builder can be cloned and forked without shared
//! mutable state.
//!
//! # Example
//!
//! ```
//! use apiflow_core::builder::ApiCallBuilder;
//! use apiflow_core::message::Method;
//! use serde_json::json;
//!
//! let message = ApiCallBuilder::new("REFUNDS_CREATE")?
//!     .endpoint(Method::Post, "/charges/chrg_123/refunds")?
//!     .params(json!({ "amount": 5000 }))?
//!     .schema(json!({ "entity": "refunds", "key": "id" }))?
//!     .build();
//! # Ok::<(), apiflow_core::builder::BuildError>(())
//! ```

use crate::message::{ApiCallMessage, CallDescriptor, Message, Method};
use crate::normalize::Schema;
use serde_json::{Map, Value};
use thiserror::Error;

/// Eager validation failures raised by [`ApiCallBuilder`] setters.
///
/// These are programming errors in the calling code path; the middleware
/// itself never produces them.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    /// The message type was empty.
    #[error("message type must be a non-empty string")]
    EmptyKind,

    /// The endpoint was empty.
    #[error("endpoint must be a non-empty string")]
    EmptyEndpoint,

    /// `params(..)` was given something other than a JSON object.
    #[error("params must be a JSON object")]
    ParamsNotObject,

    /// `schema(..)` was given something other than a JSON object.
    #[error("schema must be a JSON object")]
    SchemaNotObject,
}

/// Immutable fluent accumulator for one [`Message::ApiCall`].
///
/// Constructing a builder and calling [`build`](Self::build) without ever
/// setting an endpoint is legal: the resulting message carries an empty
/// descriptor and the middleware passes it through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCallBuilder {
    kind: String,
    call: CallDescriptor,
    fields: Map<String, Value>,
}

impl ApiCallBuilder {
    /// Start a builder for a message of the given type.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyKind`] for an empty type.
    pub fn new(kind: impl Into<String>) -> Result<Self, BuildError> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(BuildError::EmptyKind);
        }

        Ok(Self {
            kind,
            call: CallDescriptor::default(),
            fields: Map::new(),
        })
    }

    /// Set the method and endpoint of the call.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::EmptyEndpoint`] for an empty endpoint.
    pub fn endpoint(
        mut self,
        method: Method,
        endpoint: impl Into<String>,
    ) -> Result<Self, BuildError> {
        let endpoint = endpoint.into();
        if endpoint.is_empty() {
            return Err(BuildError::EmptyEndpoint);
        }

        self.call.endpoint = Some(endpoint);
        self.call.method = Some(method);
        Ok(self)
    }

    /// Set the request parameters.
    ///
    /// Parameters are recorded on the call descriptor and mirrored into the
    /// outer message's passthrough fields under the `params` key, so
    /// lifecycle consumers can see what was requested.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::ParamsNotObject`] unless given a JSON object.
    pub fn params(mut self, params: Value) -> Result<Self, BuildError> {
        let Value::Object(params) = params else {
            return Err(BuildError::ParamsNotObject);
        };

        self.fields
            .insert("params".to_string(), Value::Object(params.clone()));
        self.call.params = Some(params);
        Ok(self)
    }

    /// Set the normalization schema.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::SchemaNotObject`] unless given a JSON object.
    pub fn schema(mut self, schema: Value) -> Result<Self, BuildError> {
        let Value::Object(schema) = schema else {
            return Err(BuildError::SchemaNotObject);
        };

        self.call.schema = Some(Schema::from_object(schema));
        Ok(self)
    }

    /// Attach an arbitrary passthrough field to the outer message.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.fields.insert(key.into(), value);
        self
    }

    /// Assemble the message.
    ///
    /// Idempotent and side-effect-free: calling it repeatedly on the same
    /// builder state produces equal messages.
    #[must_use]
    pub fn build(&self) -> Message {
        Message::ApiCall(ApiCallMessage {
            kind: self.kind.clone(),
            call: self.call.clone(),
            fields: self.fields.clone(),
        })
    }
}
