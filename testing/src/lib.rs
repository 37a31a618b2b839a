//! # Apiflow Testing
//!
//! Testing utilities and mock collaborators for apiflow.
//!
//! This crate provides:
//! - `MockTransport`: a scripted transport double with recorded requests
//! - `RecordingSink`: a pipeline continuation that captures every
//!   forwarded message, the mock-store analog for lifecycle assertions
//! - `SchemaNormalizer`: a reference implementation of the normalization
//!   seam driven by a small declarative schema format
//!
//! ## Example
//!
//! ```ignore
//! use apiflow_testing::{MockTransport, RecordingSink, SchemaNormalizer};
//!
//! let transport = MockTransport::new();
//! transport.reply_json(200, &json!({ "data": [] }));
//!
//! let middleware = ApiMiddleware::new(config, transport, SchemaNormalizer);
//! let sink = RecordingSink::new();
//! let mut forward = sink.sink();
//! middleware.handle(message, &mut forward).await;
//!
//! assert_eq!(sink.statuses(), [Status::Loading, Status::Success]);
//! ```

pub mod mocks;
pub mod normalizer;

pub use mocks::{MockTransport, RecordingSink};
pub use normalizer::SchemaNormalizer;
