//! Message variants flowing through the dispatch pipeline.
//!
//! The pipeline carries a closed set of message shapes, discriminated on the
//! wire by key presence rather than an enum tag:
//!
//! - a **plain message** is any `{ "type": ..., ...fields }` object without
//!   the `CALL_API` key. The middleware forwards it untouched.
//! - an **API call message** additionally carries a [`CallDescriptor`] under
//!   the `CALL_API` key.
//! - a **lifecycle message** is derived by the middleware from an API call
//!   message. It carries a `_status` tag and, for terminal statuses, a
//!   `result` payload (plus `entities` on success).
//!
//! All three share the `type` discriminator and an opaque set of passthrough
//! `fields`, preserved verbatim on every derived message.
//!
//! # Example
//!
//! ```
//! use apiflow_core::message::Message;
//! use serde_json::json;
//!
//! let message = Message::from_value(json!({
//!     "type": "CHARGES_LIST",
//!     "CALL_API": { "endpoint": "/charges", "method": "GET" },
//! })).unwrap();
//!
//! assert!(matches!(message, Message::ApiCall(_)));
//! ```

use crate::normalize::Schema;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value, json};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Wire key under which an outer message carries its [`CallDescriptor`].
pub const CALL_API: &str = "CALL_API";

/// Wire key carrying the lifecycle [`Status`] tag on derived messages.
pub const STATUS_KEY: &str = "_status";

/// Sentinel substituted for transport- and parse-level failure bodies.
///
/// Consumers never see native error objects: any failure that did not come
/// from a parsed server response carries this fixed string as its body.
pub const UNKNOWN_ERROR: &str = "UNKNOWN_ERROR";

/// HTTP method of a call descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    /// GET — params travel in the query string, never in a body.
    #[serde(rename = "GET")]
    Get,
    /// POST
    #[serde(rename = "POST")]
    Post,
    /// PUT
    #[serde(rename = "PUT")]
    Put,
    /// PATCH
    #[serde(rename = "PATCH")]
    Patch,
    /// DELETE
    #[serde(rename = "DELETE")]
    Delete,
}

impl Method {
    /// Uppercase wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Whether this is a GET request.
    #[must_use]
    pub const fn is_get(self) -> bool {
        matches!(self, Self::Get)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a [`Method`] from a string.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown HTTP method: {0}")]
pub struct ParseMethodError(pub String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            other => Err(ParseMethodError(other.to_string())),
        }
    }
}

/// Lifecycle status tag carried under the `_status` wire key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// The request has been issued; no outcome yet.
    #[serde(rename = "LOADING")]
    Loading,
    /// The request settled with a parsed 2xx body.
    #[serde(rename = "SUCCESS")]
    Success,
    /// The request settled with a classified failure.
    #[serde(rename = "FAILURE")]
    Failure,
}

impl Status {
    /// Uppercase wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "LOADING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract description of one API call, carried under [`CALL_API`].
///
/// A descriptor is only *actionable* when both `endpoint` and `method` are
/// present; anything less is forwarded through the pipeline untouched, the
/// same as a message with no descriptor at all. A missing `schema` disables
/// normalization but never fails the call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CallDescriptor {
    /// API endpoint path, e.g. `/charges`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// HTTP method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<Method>,

    /// Request parameters: query string for GET, body otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Map<String, Value>>,

    /// Opaque normalization schema, interpreted only by a
    /// [`Normalizer`](crate::normalize::Normalizer).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

impl CallDescriptor {
    /// Whether this descriptor carries enough to perform a network call.
    #[must_use]
    pub const fn is_actionable(&self) -> bool {
        self.endpoint.is_some() && self.method.is_some()
    }
}

/// A message without a call descriptor; opaque to the middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainMessage {
    /// Message type discriminator (`type` on the wire).
    pub kind: String,
    /// Passthrough fields, preserved verbatim.
    pub fields: Map<String, Value>,
}

/// A message requesting an API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiCallMessage {
    /// Message type discriminator, shared by every derived lifecycle message.
    pub kind: String,
    /// The call to perform.
    pub call: CallDescriptor,
    /// Passthrough fields, copied onto every derived lifecycle message.
    pub fields: Map<String, Value>,
}

/// Success payload: `{ body, rawBody }` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessResult {
    /// Normalized result skeleton, or the raw body when no schema was set.
    pub body: Value,
    /// The parsed response body exactly as received.
    #[serde(rename = "rawBody")]
    pub raw_body: Value,
}

/// Failure payload: `{ body, httpStatus? }` on the wire.
///
/// `http_status` is present only when the server actually responded; it is
/// absent for transport- and parse-level failures, whose `body` is the
/// [`UNKNOWN_ERROR`] sentinel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureResult {
    /// Parsed server error payload, or the unknown-error sentinel.
    pub body: Value,
    /// HTTP status of the rejecting response, when one was received.
    #[serde(
        rename = "httpStatus",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub http_status: Option<u16>,
}

/// Classified outcome of a failed call.
///
/// Returned (never thrown) by the transport classification step so the
/// orchestration core can pattern-match instead of catching untyped errors.
#[derive(Debug, Clone, PartialEq)]
pub enum Failure {
    /// The server responded with a non-2xx status and a parseable body.
    Http {
        /// Parsed server error payload.
        body: Value,
        /// HTTP status of the response.
        status: u16,
    },
    /// Transport-level or parse-level failure; no usable server payload.
    Unknown,
}

impl Failure {
    /// Render this classification into the FAILURE `result` payload.
    #[must_use]
    pub fn into_result(self) -> FailureResult {
        match self {
            Self::Http { body, status } => FailureResult {
                body,
                http_status: Some(status),
            },
            Self::Unknown => FailureResult {
                body: Value::String(UNKNOWN_ERROR.to_string()),
                http_status: None,
            },
        }
    }
}

/// Settled success of one call: the result payload plus optional entities.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSuccess {
    /// The SUCCESS `result` payload.
    pub result: SuccessResult,
    /// Flattened entity map, present only when a schema was applied.
    pub entities: Option<Map<String, Value>>,
}

/// What the middleware resolves with for one handled message.
///
/// Callers chaining on the middleware observe the same success/failure
/// split as lifecycle consumers, without a hidden exception channel.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum CallOutcome {
    /// The message carried no actionable descriptor and was forwarded as-is.
    PassedThrough,
    /// The call settled; mirrors the terminal lifecycle message.
    Settled(Result<CallSuccess, Failure>),
}

/// Stage of a lifecycle message; result shape is fixed per stage.
///
/// Loading carries no result at all, success carries a result plus optional
/// entities, failure carries only a result. The type rules out malformed
/// combinations like a loading message with entities.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleStage {
    /// The request was issued; emitted before any suspension point.
    Loading,
    /// Terminal success.
    Success {
        /// The SUCCESS `result` payload.
        result: SuccessResult,
        /// Flattened entities, when a schema was applied.
        entities: Option<Map<String, Value>>,
    },
    /// Terminal failure.
    Failure {
        /// The FAILURE `result` payload.
        result: FailureResult,
    },
}

impl LifecycleStage {
    /// The `_status` tag of this stage.
    #[must_use]
    pub const fn status(&self) -> Status {
        match self {
            Self::Loading => Status::Loading,
            Self::Success { .. } => Status::Success,
            Self::Failure { .. } => Status::Failure,
        }
    }
}

/// A lifecycle notification derived from an [`ApiCallMessage`].
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleMessage {
    /// Message type, shared with the originating message.
    pub kind: String,
    /// Stage and stage-specific payload.
    pub stage: LifecycleStage,
    /// Passthrough fields, shared with the originating message.
    pub fields: Map<String, Value>,
}

/// The closed set of pipeline message variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// A message the middleware passes through unchanged.
    Plain(PlainMessage),
    /// A message requesting an API call.
    ApiCall(ApiCallMessage),
    /// A notification derived from an API call message.
    Lifecycle(LifecycleMessage),
}

/// Error decoding a [`Message`] from its wire representation.
#[derive(Debug, Error)]
pub enum MessageDecodeError {
    /// The wire value was not a JSON object.
    #[error("message must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// The `type` key was missing or not a string.
    #[error("message is missing a string `type` key")]
    MissingKind,

    /// A lifecycle or descriptor sub-object failed to decode.
    #[error("invalid `{key}` payload: {source}")]
    InvalidPayload {
        /// The offending wire key.
        key: &'static str,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },
}

impl Message {
    /// The `type` discriminator shared by all variants.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            Self::Plain(m) => &m.kind,
            Self::ApiCall(m) => &m.kind,
            Self::Lifecycle(m) => &m.kind,
        }
    }

    /// The passthrough fields of this message.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        match self {
            Self::Plain(m) => &m.fields,
            Self::ApiCall(m) => &m.fields,
            Self::Lifecycle(m) => &m.fields,
        }
    }

    /// Encode to the flat wire object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::String(self.kind().to_string()));

        match self {
            Self::Plain(_) => {},
            Self::ApiCall(m) => {
                out.insert(CALL_API.to_string(), json!(m.call));
            },
            Self::Lifecycle(m) => {
                out.insert(
                    STATUS_KEY.to_string(),
                    Value::String(m.stage.status().as_str().to_string()),
                );
                match &m.stage {
                    LifecycleStage::Loading => {},
                    LifecycleStage::Success { result, entities } => {
                        out.insert("result".to_string(), json!(result));
                        if let Some(entities) = entities {
                            out.insert("entities".to_string(), Value::Object(entities.clone()));
                        }
                    },
                    LifecycleStage::Failure { result } => {
                        out.insert("result".to_string(), json!(result));
                    },
                }
            },
        }

        for (key, value) in self.fields() {
            out.entry(key.clone()).or_insert_with(|| value.clone());
        }

        Value::Object(out)
    }

    /// Decode from the flat wire object.
    ///
    /// Discrimination order: a `_status` key makes a lifecycle message, a
    /// `CALL_API` key makes an API call message, anything else is plain.
    ///
    /// # Errors
    ///
    /// Returns [`MessageDecodeError`] when the value is not an object, lacks
    /// a string `type`, or carries a malformed descriptor/lifecycle payload.
    pub fn from_value(value: Value) -> Result<Self, MessageDecodeError> {
        let mut object = match value {
            Value::Object(object) => object,
            other => return Err(MessageDecodeError::NotAnObject(value_kind(&other))),
        };

        let kind = match object.remove("type") {
            Some(Value::String(kind)) => kind,
            _ => return Err(MessageDecodeError::MissingKind),
        };

        if let Some(status) = object.remove(STATUS_KEY) {
            let status: Status = serde_json::from_value(status)
                .map_err(|source| MessageDecodeError::InvalidPayload { key: STATUS_KEY, source })?;
            // Only the terminal statuses own the result/entities keys; a
            // LOADING message keeps them as passthrough fields.
            let stage = match status {
                Status::Loading => LifecycleStage::Loading,
                Status::Success => {
                    let result = object.remove("result").unwrap_or(Value::Null);
                    let entities = match object.remove("entities") {
                        Some(Value::Object(entities)) => Some(entities),
                        _ => None,
                    };
                    LifecycleStage::Success {
                        result: decode_payload("result", result)?,
                        entities,
                    }
                },
                Status::Failure => LifecycleStage::Failure {
                    result: decode_payload(
                        "result",
                        object.remove("result").unwrap_or(Value::Null),
                    )?,
                },
            };
            return Ok(Self::Lifecycle(LifecycleMessage {
                kind,
                stage,
                fields: object,
            }));
        }

        if let Some(call) = object.remove(CALL_API) {
            let call: CallDescriptor = serde_json::from_value(call)
                .map_err(|source| MessageDecodeError::InvalidPayload { key: CALL_API, source })?;
            return Ok(Self::ApiCall(ApiCallMessage {
                kind,
                call,
                fields: object,
            }));
        }

        Ok(Self::Plain(PlainMessage {
            kind,
            fields: object,
        }))
    }
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    key: &'static str,
    value: Value,
) -> Result<T, MessageDecodeError> {
    serde_json::from_value(value)
        .map_err(|source| MessageDecodeError::InvalidPayload { key, source })
}

const fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    #[test]
    fn plain_message_round_trips_passthrough_fields() {
        let wire = json!({
            "type": "GET_SOMETHING",
            "endpoint": "/test",
            "meta": { "page": 2 },
        });

        let message = Message::from_value(wire.clone()).unwrap();
        let Message::Plain(plain) = &message else {
            panic!("expected plain message");
        };
        assert_eq!(plain.kind, "GET_SOMETHING");
        assert_eq!(plain.fields.len(), 2);
        assert_eq!(message.to_value(), wire);
    }

    #[test]
    fn call_api_key_selects_api_call_variant() {
        let message = Message::from_value(json!({
            "type": "CHARGES_LIST",
            "CALL_API": { "endpoint": "/charges", "method": "GET" },
        }))
        .unwrap();

        let Message::ApiCall(call) = message else {
            panic!("expected api call message");
        };
        assert_eq!(call.call.endpoint.as_deref(), Some("/charges"));
        assert_eq!(call.call.method, Some(Method::Get));
        assert!(call.call.is_actionable());
    }

    #[test]
    fn descriptor_without_endpoint_is_not_actionable() {
        let message = Message::from_value(json!({
            "type": "CHARGES_LIST",
            "CALL_API": {},
        }))
        .unwrap();

        let Message::ApiCall(call) = message else {
            panic!("expected api call message");
        };
        assert!(!call.call.is_actionable());
    }

    #[test]
    fn status_key_selects_lifecycle_variant() {
        let message = Message::from_value(json!({
            "type": "CHARGES_LIST",
            "_status": "LOADING",
            "page": 3,
        }))
        .unwrap();

        let Message::Lifecycle(lifecycle) = &message else {
            panic!("expected lifecycle message");
        };
        assert_eq!(lifecycle.stage, LifecycleStage::Loading);
        assert_eq!(lifecycle.fields["page"], json!(3));
    }

    #[test]
    fn loading_keeps_result_named_passthrough_fields() {
        let wire = json!({
            "type": "GET_X",
            "_status": "LOADING",
            "result": { "carried": true },
            "entities": ["not", "ours"],
        });

        let message = Message::from_value(wire.clone()).unwrap();
        let Message::Lifecycle(lifecycle) = &message else {
            panic!("expected lifecycle message");
        };
        assert_eq!(lifecycle.stage, LifecycleStage::Loading);
        assert_eq!(lifecycle.fields["result"], json!({ "carried": true }));
        assert_eq!(message.to_value(), wire);
    }

    #[test]
    fn loading_wire_shape_has_no_result_key() {
        let message = Message::Lifecycle(LifecycleMessage {
            kind: "GET_X".to_string(),
            stage: LifecycleStage::Loading,
            fields: Map::new(),
        });

        assert_eq!(
            message.to_value(),
            json!({ "type": "GET_X", "_status": "LOADING" })
        );
    }

    #[test]
    fn success_without_entities_omits_the_key() {
        let message = Message::Lifecycle(LifecycleMessage {
            kind: "GET_X".to_string(),
            stage: LifecycleStage::Success {
                result: SuccessResult {
                    body: json!({ "a": 1 }),
                    raw_body: json!({ "a": 1 }),
                },
                entities: None,
            },
            fields: Map::new(),
        });

        let wire = message.to_value();
        assert_eq!(wire["_status"], json!("SUCCESS"));
        assert_eq!(wire["result"]["rawBody"], json!({ "a": 1 }));
        assert!(wire.get("entities").is_none());
    }

    #[test]
    fn failure_result_serializes_http_status_only_when_present() {
        let http = Failure::Http {
            body: json!({ "code": "not_found" }),
            status: 404,
        }
        .into_result();
        assert_eq!(
            json!(http),
            json!({ "body": { "code": "not_found" }, "httpStatus": 404 })
        );

        let unknown = Failure::Unknown.into_result();
        assert_eq!(json!(unknown), json!({ "body": "UNKNOWN_ERROR" }));
    }

    #[test]
    fn missing_type_is_rejected() {
        let err = Message::from_value(json!({ "endpoint": "/test" })).unwrap_err();
        assert!(matches!(err, MessageDecodeError::MissingKind));
    }

    #[test]
    fn method_parses_wire_strings() {
        assert_eq!("PATCH".parse::<Method>().unwrap(), Method::Patch);
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert!("get".parse::<Method>().is_err());
    }
}
