//! Request and response envelopes exchanged with the transport.
//!
//! # Responsibility
//! - Mirror the gateway event shape (`httpMethod`, `queryStringParameters`,
//!   `headers`, `body`) and the matching response shape.
//! - Derive the caller's client identifier from forwarding headers.
//!
//! # Invariants
//! - Every response built here carries `Access-Control-Allow-Origin`.
//! - Header lookups are case-insensitive.

use super::cors::{apply_allow_origin, preflight_headers};
use crate::model::pin::ClientId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Status classification of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Created,
    BadRequest,
    NotFound,
    MethodNotAllowed,
    /// Transient store conflict; the caller may retry.
    ServiceUnavailable,
    InternalError,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::InternalError => 500,
            Self::ServiceUnavailable => 503,
        }
    }
}

/// One inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Transport verb; treated as `GET` when absent.
    #[serde(rename = "httpMethod", default)]
    pub method: Option<String>,
    #[serde(rename = "queryStringParameters", default)]
    pub query: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
    /// Correlation id for logs; generated when absent.
    #[serde(rename = "requestId", default)]
    pub request_id: Option<String>,
}

impl Request {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: Some(method.into()),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Upper-cased transport verb.
    pub fn method(&self) -> String {
        self.method
            .as_deref()
            .map(str::trim)
            .filter(|method| !method.is_empty())
            .unwrap_or("GET")
            .to_ascii_uppercase()
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.as_ref()?.get(name).map(String::as_str)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Derives the like-uniqueness key from the caller's network origin.
    ///
    /// Uses the first `X-Forwarded-For` hop, then `X-Real-IP`, then `unknown`.
    pub fn client_id(&self) -> ClientId {
        let forwarded = self
            .header("x-forwarded-for")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|hop| !hop.is_empty());
        let real_ip = self
            .header("x-real-ip")
            .map(str::trim)
            .filter(|value| !value.is_empty());

        forwarded
            .or(real_ip)
            .map_or_else(ClientId::unknown, |origin| ClientId::new(origin))
    }
}

/// One outbound response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
    #[serde(rename = "isBase64Encoded")]
    pub is_base64_encoded: bool,
}

impl Response {
    /// JSON response with the cross-origin allowance.
    pub fn json(status: Status, body: String) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        apply_allow_origin(&mut headers);
        Self {
            status_code: status.code(),
            headers,
            body,
            is_base64_encoded: false,
        }
    }

    /// `{"error": message}` response.
    pub fn error(status: Status, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }

    /// Empty-bodied answer to a pre-flight probe.
    pub fn preflight() -> Self {
        Self {
            status_code: Status::Ok.code(),
            headers: preflight_headers(),
            body: String::new(),
            is_base64_encoded: false,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    pub fn json_body(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::from_str(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::{Request, Response, Status};

    #[test]
    fn client_id_prefers_first_forwarded_hop() {
        let request = Request::new("POST")
            .with_header("X-Forwarded-For", " 203.0.113.7 , 10.0.0.1")
            .with_header("X-Real-IP", "10.0.0.9");
        assert_eq!(request.client_id().as_str(), "203.0.113.7");
    }

    #[test]
    fn client_id_falls_back_to_real_ip_then_unknown() {
        let request = Request::new("POST").with_header("x-real-ip", "10.0.0.9");
        assert_eq!(request.client_id().as_str(), "10.0.0.9");

        let request = Request::new("POST").with_header("x-forwarded-for", " ");
        assert_eq!(request.client_id().as_str(), "unknown");
    }

    #[test]
    fn request_deserializes_gateway_event_with_nulls() {
        let request: Request = serde_json::from_str(
            r#"{"httpMethod":"get","queryStringParameters":null,"headers":null,"body":null}"#,
        )
        .unwrap();
        assert_eq!(request.method(), "GET");
        assert_eq!(request.query_param("id"), None);
        assert_eq!(Request::default().method(), "GET");
    }

    #[test]
    fn error_response_serializes_gateway_shape() {
        let response = Response::error(Status::NotFound, "Pin not found");
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 404);
        assert_eq!(value["isBase64Encoded"], false);
        assert_eq!(value["headers"]["Access-Control-Allow-Origin"], "*");
        assert_eq!(response.json_body().unwrap()["error"], "Pin not found");
    }

    #[test]
    fn preflight_has_empty_body_and_cache_lifetime() {
        let response = Response::preflight();
        assert_eq!(response.status_code, 200);
        assert!(response.body.is_empty());
        assert_eq!(response.header("access-control-max-age"), Some("86400"));
        assert_eq!(
            response.header("Access-Control-Allow-Methods"),
            Some("GET, POST, OPTIONS")
        );
    }
}
