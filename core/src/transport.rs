//! Transport seam.
//!
//! The middleware derives a [`TransportRequest`] from a call descriptor and
//! hands it to a [`Transport`] implementation. The transport performs the
//! network call and nothing else: it reports received responses (including
//! 4xx/5xx ones) as `Ok`, and errors only for transport-level failures
//! (DNS, connection refused, interrupted body reads). Classifying statuses
//! and parsing JSON stays with the caller so every parse failure lands in
//! the same failure channel.

use crate::message::Method;
use std::future::Future;
use thiserror::Error;

/// Encoded request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// A JSON document, sent with `Content-Type: application/json`.
    Json(String),
    /// Multipart form fields, sent as `multipart/form-data`.
    Form(Vec<(String, String)>),
}

/// A concrete request, fully derived from a call descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    /// Absolute URL, query string included.
    pub url: String,
    /// Wire-level method. Under form spoofing this is POST even when the
    /// descriptor's method is not.
    pub method: Method,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Request body; never present for GET.
    pub body: Option<RequestBody>,
}

/// A received HTTP response, body read in full but not yet parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body text.
    pub body: String,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure: the request never produced a usable response.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be sent or no response arrived.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// A response arrived but its body could not be read.
    #[error("failed to read response body: {0}")]
    BodyRead(String),
}

/// Performs the network call for a derived request.
pub trait Transport: Send + Sync {
    /// Issue the request and read the full response body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only for transport-level failures. A
    /// received non-2xx response is a successful invocation.
    fn invoke(
        &self,
        request: &TransportRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}
