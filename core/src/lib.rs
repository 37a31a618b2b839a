//! # Apiflow Core
//!
//! Core message types and trait seams for the apiflow dispatch middleware.
//!
//! This crate defines the data that flows through a dispatch pipeline and
//! the seams the runtime plugs implementations into:
//!
//! - **Message**: the closed set of pipeline message variants — plain
//!   messages, API call messages, and derived lifecycle notifications
//! - **`CallDescriptor`**: the abstract description of one API call
//!   (endpoint, method, params, optional schema)
//! - **`ApiCallBuilder`**: fluent, eagerly-validated assembly of API call
//!   messages
//! - **Transport**: the network seam (perform a derived request)
//! - **Normalizer**: the flattening seam (reshape a success body per a
//!   declarative schema)
//!
//! No I/O happens here; the runtime crate wires real implementations into
//! these seams, and the testing crate provides scripted doubles.
//!
//! ## Lifecycle shape
//!
//! Dispatching an API call message makes the middleware forward exactly one
//! `LOADING` notification followed by exactly one terminal notification
//! (`SUCCESS` xor `FAILURE`), all sharing the originating message's type
//! and passthrough fields:
//!
//! ```text
//! { type: "GET_CHARGES", CALL_API: { endpoint: "/charges", method: GET } }
//!   ├─▶ { type: "GET_CHARGES", _status: "LOADING" }
//!   └─▶ { type: "GET_CHARGES", _status: "SUCCESS", result: { body, rawBody } }
//! ```

// Re-export commonly used types
pub use serde::{Deserialize, Serialize};

pub mod builder;
pub mod message;
pub mod normalize;
pub mod transport;

pub use builder::{ApiCallBuilder, BuildError};
pub use message::{
    ApiCallMessage, CallDescriptor, CallOutcome, CallSuccess, Failure, FailureResult,
    LifecycleMessage, LifecycleStage, Message, Method, PlainMessage, Status, SuccessResult,
    CALL_API, STATUS_KEY, UNKNOWN_ERROR,
};
pub use normalize::{NoopNormalizer, Normalized, Normalizer, Schema};
pub use transport::{
    RequestBody, Transport, TransportError, TransportRequest,
    TransportResponse,
};
