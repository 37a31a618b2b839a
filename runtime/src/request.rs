//! Request parameter derivation.
//!
//! Turns the abstract `(endpoint, method, params)` of a call descriptor
//! into a concrete [`TransportRequest`]. Pure: the only inputs are the
//! descriptor pieces and the static [`ApiConfig`].

use crate::config::{ApiConfig, RequestEncoding};
use crate::serialize::query_string;
use apiflow_core::message::Method;
use apiflow_core::transport::{RequestBody, TransportRequest};
use serde_json::{Map, Value};

/// Reserved form field carrying the real method under form spoofing.
pub const METHOD_OVERRIDE_FIELD: &str = "_method";

/// Derive the concrete request for one call.
///
/// - GET: params become the query string; no body, no extra headers.
/// - non-GET under [`RequestEncoding::FormSpoof`]: the wire method is POST
///   and the real method rides in the form body under `_method`. Params
///   with a null value are skipped, matching form fields that were never
///   filled in.
/// - non-GET under [`RequestEncoding::Json`]: the real method is used, with
///   a JSON body and content-type header. Absent params serialize as `{}`.
///
/// Stored session cookies ride along on every request; the transport's
/// cookie store is the only credential mechanism.
#[must_use]
pub fn derive_request(
    config: &ApiConfig,
    endpoint: &str,
    method: Method,
    params: Option<&Map<String, Value>>,
) -> TransportRequest {
    let base = format!("{}{endpoint}", config.base_url());

    if method.is_get() {
        return TransportRequest {
            url: format!("{base}{}", query_string(params)),
            method,
            headers: Vec::new(),
            body: None,
        };
    }

    match config.encoding() {
        RequestEncoding::FormSpoof => TransportRequest {
            url: base,
            method: Method::Post,
            headers: Vec::new(),
            body: Some(RequestBody::Form(form_fields(method, params))),
        },
        RequestEncoding::Json => TransportRequest {
            url: base,
            method,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(RequestBody::Json(
                Value::Object(params.cloned().unwrap_or_default()).to_string(),
            )),
        },
    }
}

/// Flatten params into multipart form fields, appending the method override.
fn form_fields(method: Method, params: Option<&Map<String, Value>>) -> Vec<(String, String)> {
    let mut fields: Vec<(String, String)> = params
        .into_iter()
        .flat_map(Map::iter)
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), form_value(value)))
        .collect();

    fields.push((
        METHOD_OVERRIDE_FIELD.to_string(),
        method.as_str().to_string(),
    ));
    fields
}

/// Render one param value into its form-field slot.
fn form_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use serde_json::json;

    fn form_config() -> ApiConfig {
        ApiConfig::new("https://api.example.com", RequestEncoding::FormSpoof)
    }

    fn json_config() -> ApiConfig {
        ApiConfig::new("https://api.example.com", RequestEncoding::Json)
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn get_appends_query_and_has_no_body() {
        let params = object(json!({ "limit": 20 }));
        let request = derive_request(&form_config(), "/charges", Method::Get, Some(&params));

        assert_eq!(request.url, "https://api.example.com/charges?limit=20");
        assert_eq!(request.method, Method::Get);
        assert!(request.headers.is_empty());
        assert!(request.body.is_none());
    }

    #[test]
    fn get_without_params_has_bare_url() {
        let request = derive_request(&json_config(), "/charges", Method::Get, None);
        assert_eq!(request.url, "https://api.example.com/charges");
    }

    #[test]
    fn form_spoof_wraps_real_method_in_the_body() {
        let params = object(json!({ "amount": 5000 }));
        let request = derive_request(&form_config(), "/charges", Method::Put, Some(&params));

        assert_eq!(request.url, "https://api.example.com/charges");
        assert_eq!(request.method, Method::Post);
        assert_eq!(
            request.body,
            Some(RequestBody::Form(vec![
                ("amount".to_string(), "5000".to_string()),
                ("_method".to_string(), "PUT".to_string()),
            ]))
        );
    }

    #[test]
    fn form_spoof_skips_null_params() {
        let params = object(json!({ "amount": 5000, "note": null }));
        let request = derive_request(&form_config(), "/charges", Method::Post, Some(&params));

        let Some(RequestBody::Form(fields)) = request.body else {
            panic!("expected form body");
        };
        assert!(fields.iter().all(|(key, _)| key != "note"));
    }

    #[test]
    fn json_mode_keeps_the_real_method() {
        let params = object(json!({ "amount": 5000 }));
        let request = derive_request(&json_config(), "/charges", Method::Patch, Some(&params));

        assert_eq!(request.method, Method::Patch);
        assert_eq!(
            request.headers,
            vec![("Content-Type".to_string(), "application/json".to_string())]
        );
        assert_eq!(
            request.body,
            Some(RequestBody::Json("{\"amount\":5000}".to_string()))
        );
    }

    #[test]
    fn json_mode_serializes_absent_params_as_empty_object() {
        let request = derive_request(&json_config(), "/charges", Method::Delete, None);
        assert_eq!(request.body, Some(RequestBody::Json("{}".to_string())));
    }
}
