//! reqwest-backed [`Transport`] implementation.

use apiflow_core::message::Method;
use apiflow_core::transport::{
    RequestBody, Transport, TransportError, TransportRequest, TransportResponse,
};
use thiserror::Error;

/// Failure to construct the underlying HTTP client at startup.
#[derive(Debug, Error)]
#[error("failed to build HTTP client: {0}")]
pub struct ClientBuildError(#[from] reqwest::Error);

/// HTTP transport over a shared `reqwest` client.
///
/// The client keeps a cookie store, so session cookies set by the backend
/// ride along on every subsequent request. Session cookies are the only
/// credential mechanism.
///
/// The transport reads response bodies in full and returns them unparsed:
/// JSON decoding belongs to the middleware's outcome classification, so a
/// malformed body on a 2xx response escalates to the same failure channel
/// as a connection error.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] if the TLS backend or system
    /// configuration cannot be initialized.
    pub fn new() -> Result<Self, ClientBuildError> {
        Ok(Self {
            client: reqwest::Client::builder().cookie_store(true).build()?,
        })
    }
}

const fn wire_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

impl Transport for HttpTransport {
    async fn invoke(
        &self,
        request: &TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .client
            .request(wire_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        match &request.body {
            Some(RequestBody::Json(json)) => {
                builder = builder.body(json.clone());
            },
            Some(RequestBody::Form(fields)) => {
                let mut form = reqwest::multipart::Form::new();
                for (name, value) in fields {
                    form = form.text(name.clone(), value.clone());
                }
                builder = builder.multipart(form);
            },
            None => {},
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::RequestFailed(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::BodyRead(e.to_string()))?;

        Ok(TransportResponse { status, body })
    }
}
