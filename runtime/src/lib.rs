//! # Apiflow Runtime
//!
//! Runtime implementation for apiflow: the middleware stage that performs
//! declarative API calls and emits lifecycle notifications back into the
//! host dispatch pipeline.
//!
//! ## Core Components
//!
//! - **`ApiMiddleware`**: the orchestration core — pass-through dispatch,
//!   `LOADING` → terminal sequencing, outcome classification, optional
//!   normalization
//! - **`derive_request`**: pure derivation of a concrete request from a
//!   call descriptor and the static configuration
//! - **`HttpTransport`**: reqwest-backed [`Transport`](apiflow_core::Transport)
//! - **`ApiConfig`**: base URL and request-encoding mode, read once at
//!   startup
//!
//! ## Example
//!
//! ```ignore
//! use apiflow_runtime::{ApiConfig, ApiMiddleware, HttpTransport, RequestEncoding};
//! use apiflow_core::NoopNormalizer;
//!
//! let middleware = ApiMiddleware::new(
//!     ApiConfig::from_env()?,
//!     HttpTransport::new()?,
//!     NoopNormalizer,
//! );
//!
//! let outcome = middleware.handle(message, &mut |derived| pipeline.dispatch(derived)).await;
//! ```

pub mod config;
pub mod middleware;
pub mod request;
pub mod serialize;
pub mod transport;

pub use config::{ApiConfig, ConfigError, RequestEncoding};
pub use middleware::ApiMiddleware;
pub use request::{METHOD_OVERRIDE_FIELD, derive_request};
pub use serialize::query_string;
pub use transport::{ClientBuildError, HttpTransport};
