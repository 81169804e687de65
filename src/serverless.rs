//! Adapter between API Gateway proxy events and the axum router.
//!
//! An event is turned into an `http::Request`, dispatched through the same
//! router the HTTP server uses, and the response is collected back into the
//! proxy response shape.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use axum::{
    body::Body,
    http::{HeaderMap, HeaderName, HeaderValue, Method, Request},
    Router,
};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower::ServiceExt;

/// Incoming proxy event
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyEvent {
    pub http_method: String,
    pub path: String,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
    /// Superset of `headers`; preferred when present
    #[serde(default)]
    pub multi_value_headers: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    /// Superset of `query_string_parameters`; preferred when present
    #[serde(default)]
    pub multi_value_query_string_parameters: Option<HashMap<String, Vec<String>>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub is_base64_encoded: bool,
    #[serde(default)]
    pub request_context: Option<RequestContext>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    /// Stage the gateway deployed the API under
    pub stage: Option<String>,
}

/// Outgoing proxy response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyResponse {
    pub status_code: u16,
    /// Last value per header name
    pub headers: BTreeMap<String, String>,
    /// Every value per header name, in response order
    pub multi_value_headers: BTreeMap<String, Vec<String>>,
    pub body: String,
    pub is_base64_encoded: bool,
}

#[derive(Debug)]
pub enum AdapterError {
    InvalidMethod(String),
    InvalidHeader(String),
    InvalidRequest(axum::http::Error),
    InvalidBase64Body(base64::DecodeError),
    NonUtf8Body,
    Body(axum::Error),
}

impl fmt::Display for AdapterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdapterError::InvalidMethod(method) => write!(f, "Invalid HTTP method: {}", method),
            AdapterError::InvalidHeader(name) => write!(f, "Invalid header: {}", name),
            AdapterError::InvalidRequest(err) => write!(f, "Invalid request: {}", err),
            AdapterError::InvalidBase64Body(err) => {
                write!(f, "Request body is not valid base64: {}", err)
            }
            AdapterError::NonUtf8Body => write!(f, "Response body is not valid UTF-8"),
            AdapterError::Body(err) => write!(f, "Failed to read response body: {}", err),
        }
    }
}

impl std::error::Error for AdapterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdapterError::InvalidRequest(err) => Some(err),
            AdapterError::InvalidBase64Body(err) => Some(err),
            AdapterError::Body(err) => Some(err),
            _ => None,
        }
    }
}

impl From<axum::http::Error> for AdapterError {
    fn from(err: axum::http::Error) -> Self {
        AdapterError::InvalidRequest(err)
    }
}

impl From<base64::DecodeError> for AdapterError {
    fn from(err: base64::DecodeError) -> Self {
        AdapterError::InvalidBase64Body(err)
    }
}

/// Handle one proxy event with `router`.
///
/// A leading `/<stage>` segment is stripped from the event path before
/// dispatch. `stage` comes from configuration; when it is unset the stage in
/// the event's request context is used instead.
pub async fn handler(
    router: &Router,
    stage: Option<&str>,
    event: ProxyEvent,
) -> Result<ProxyResponse, AdapterError> {
    let event_stage = event
        .request_context
        .as_ref()
        .and_then(|ctx| ctx.stage.clone());
    let stage = stage.or(event_stage.as_deref());

    let request = into_request(stage, event)?;
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = match router.clone().oneshot(request).await {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let status_code = response.status().as_u16();
    tracing::info!("{} {} -> {}", method, uri, status_code);

    let (headers, multi_value_headers) = collect_headers(response.headers());

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .map_err(AdapterError::Body)?;
    let body = String::from_utf8(bytes.to_vec()).map_err(|_| AdapterError::NonUtf8Body)?;

    Ok(ProxyResponse {
        status_code,
        headers,
        multi_value_headers,
        body,
        is_base64_encoded: false,
    })
}

fn into_request(stage: Option<&str>, event: ProxyEvent) -> Result<Request<Body>, AdapterError> {
    let method = Method::from_bytes(event.http_method.to_uppercase().as_bytes())
        .map_err(|_| AdapterError::InvalidMethod(event.http_method.clone()))?;

    let path = strip_stage(&event.path, stage);
    let query = flatten_pairs(
        event.query_string_parameters.as_ref(),
        event.multi_value_query_string_parameters.as_ref(),
    );
    let uri = if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, encode_query(&query))
    };

    let mut builder = Request::builder().method(method).uri(uri);
    let headers = flatten_pairs(event.headers.as_ref(), event.multi_value_headers.as_ref());
    for (name, value) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| AdapterError::InvalidHeader(name.to_string()))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| AdapterError::InvalidHeader(name.as_str().to_string()))?;
        builder = builder.header(name, value);
    }

    // The flag alone means nothing without a body to decode
    let body = match event.body {
        Some(body) if event.is_base64_encoded => Body::from(STANDARD.decode(body)?),
        Some(body) => Body::from(body),
        None => Body::empty(),
    };
    Ok(builder.body(body)?)
}

/// Remove a leading `/<stage>` segment; anything else passes through.
fn strip_stage<'a>(path: &'a str, stage: Option<&str>) -> &'a str {
    let Some(stage) = stage else {
        return path;
    };

    match path.strip_prefix('/').and_then(|rest| rest.strip_prefix(stage)) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// Flatten single or multi-value maps into sorted pairs, multi-value winning.
fn flatten_pairs<'a>(
    single: Option<&'a HashMap<String, String>>,
    multi: Option<&'a HashMap<String, Vec<String>>>,
) -> Vec<(&'a str, &'a str)> {
    match (multi.filter(|m| !m.is_empty()), single) {
        (Some(multi), _) => {
            let sorted: BTreeMap<_, _> = multi.iter().collect();
            sorted
                .into_iter()
                .flat_map(|(k, values)| values.iter().map(move |v| (k.as_str(), v.as_str())))
                .collect()
        }
        (None, Some(single)) => {
            let sorted: BTreeMap<_, _> = single.iter().collect();
            sorted
                .into_iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect()
        }
        (None, None) => Vec::new(),
    }
}

fn encode_query(pairs: &[(&str, &str)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}

fn collect_headers(
    headers: &HeaderMap,
) -> (BTreeMap<String, String>, BTreeMap<String, Vec<String>>) {
    let mut single = BTreeMap::new();
    let mut multi: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for (name, value) in headers {
        match value.to_str() {
            Ok(value) => {
                single.insert(name.as_str().to_string(), value.to_string());
                multi
                    .entry(name.as_str().to_string())
                    .or_default()
                    .push(value.to_string());
            }
            Err(_) => {
                tracing::warn!("Dropping non-UTF-8 value of response header {}", name.as_str());
            }
        }
    }

    (single, multi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::create_router;
    use crate::config::Config;

    fn event(path: &str) -> ProxyEvent {
        ProxyEvent {
            http_method: "GET".to_string(),
            path: path.to_string(),
            ..ProxyEvent::default()
        }
    }

    fn prod_router() -> Router {
        create_router(&Config {
            stage: Some("prod".to_string()),
            ..Config::default()
        })
    }

    #[test]
    fn test_strip_stage() {
        assert_eq!(strip_stage("/prod", Some("prod")), "/");
        assert_eq!(strip_stage("/prod/", Some("prod")), "/");
        assert_eq!(strip_stage("/prod/users/3", Some("prod")), "/users/3");
        assert_eq!(strip_stage("/users/3", Some("prod")), "/users/3");
        assert_eq!(strip_stage("/production", Some("prod")), "/production");
        assert_eq!(strip_stage("/prod/users", None), "/prod/users");
    }

    #[test]
    fn test_encode_query_sorted_and_escaped() {
        let params = HashMap::from([
            ("b".to_string(), "two words".to_string()),
            ("a".to_string(), "x&y".to_string()),
        ]);
        let pairs = flatten_pairs(Some(&params), None);
        assert_eq!(encode_query(&pairs), "a=x%26y&b=two+words");
    }

    #[test]
    fn test_multi_value_query_preferred() {
        let single = HashMap::from([("tag".to_string(), "b".to_string())]);
        let multi = HashMap::from([
            ("tag".to_string(), vec!["a".to_string(), "b".to_string()]),
            ("id".to_string(), vec!["1".to_string()]),
        ]);

        let pairs = flatten_pairs(Some(&single), Some(&multi));
        assert_eq!(pairs, vec![("id", "1"), ("tag", "a"), ("tag", "b")]);
        assert_eq!(encode_query(&pairs), "id=1&tag=a&tag=b");

        let empty = HashMap::new();
        assert_eq!(flatten_pairs(Some(&single), Some(&empty)), vec![("tag", "b")]);
        assert!(flatten_pairs(None, None).is_empty());
    }

    #[test]
    fn test_collect_headers_keeps_every_value() {
        let mut headers = HeaderMap::new();
        headers.append("set-cookie", HeaderValue::from_static("a=1"));
        headers.append("set-cookie", HeaderValue::from_static("b=2"));
        headers.insert("x-raw", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());

        let (single, multi) = collect_headers(&headers);

        assert_eq!(single.get("set-cookie").map(String::as_str), Some("b=2"));
        assert_eq!(multi["set-cookie"], vec!["a=1", "b=2"]);
        assert!(!single.contains_key("x-raw"));
        assert!(!multi.contains_key("x-raw"));
    }

    #[tokio::test]
    async fn test_handler_root_with_and_without_stage() {
        let router = prod_router();

        let plain = handler(&router, Some("prod"), event("/")).await.unwrap();
        let staged = handler(&router, Some("prod"), event("/prod")).await.unwrap();

        assert_eq!(plain.status_code, 200);
        assert_eq!(plain.body, r#"{"message":"Hello World"}"#);
        assert_eq!(plain, staged);
        assert_eq!(
            plain.headers.get("content-type").map(String::as_str),
            Some("application/json")
        );
        assert_eq!(plain.multi_value_headers["content-type"], vec!["application/json"]);
        assert!(!plain.is_base64_encoded);
    }

    #[tokio::test]
    async fn test_handler_user_echo() {
        let router = prod_router();

        let response = handler(&router, Some("prod"), event("/prod/users/42"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"user":42}"#);

        let response = handler(&router, Some("prod"), event("/prod/users/foo"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 422);
        assert!(response.body.contains("int_parsing"));
    }

    #[tokio::test]
    async fn test_handler_from_json_event() {
        let raw = serde_json::json!({
            "httpMethod": "get",
            "path": "/dev/users",
            "headers": { "accept": "application/json" },
            "queryStringParameters": null,
            "body": null,
            "isBase64Encoded": false,
            "requestContext": { "stage": "dev" }
        });
        let event: ProxyEvent = serde_json::from_value(raw).unwrap();
        let router = create_router(&Config::default());

        let response = handler(&router, Some("dev"), event).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"message":"Get Users!"}"#);

        let out = serde_json::to_value(&response).unwrap();
        assert_eq!(out["statusCode"], 200);
        assert_eq!(out["isBase64Encoded"], false);
    }

    #[tokio::test]
    async fn test_handler_base64_flag_without_body() {
        let raw = serde_json::json!({
            "httpMethod": "GET",
            "path": "/users",
            "body": null,
            "isBase64Encoded": true
        });
        let event: ProxyEvent = serde_json::from_value(raw).unwrap();

        let response = handler(&prod_router(), Some("prod"), event).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"message":"Get Users!"}"#);
    }

    #[tokio::test]
    async fn test_handler_decodes_base64_body() {
        let mut ev = event("/users/7");
        ev.body = Some(STANDARD.encode(b"ignored payload"));
        ev.is_base64_encoded = true;

        let response = handler(&prod_router(), Some("prod"), ev).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"user":7}"#);

        let request = into_request(None, {
            let mut ev = event("/");
            ev.body = Some(STANDARD.encode(b"hello"));
            ev.is_base64_encoded = true;
            ev
        })
        .unwrap();
        let bytes = axum::body::to_bytes(request.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello");
    }

    #[tokio::test]
    async fn test_handler_rejects_invalid_base64_body() {
        let mut ev = event("/");
        ev.body = Some("not base64!".to_string());
        ev.is_base64_encoded = true;

        let result = handler(&prod_router(), Some("prod"), ev).await;
        assert!(matches!(result, Err(AdapterError::InvalidBase64Body(_))));
    }

    #[tokio::test]
    async fn test_handler_uses_event_stage_when_unconfigured() {
        let router = create_router(&Config::default());
        let mut ev = event("/dev/users/3");
        ev.request_context = Some(RequestContext {
            stage: Some("dev".to_string()),
        });

        let response = handler(&router, None, ev).await.unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(response.body, r#"{"user":3}"#);

        // configured stage takes precedence over the event's
        let mut ev = event("/dev/users/3");
        ev.request_context = Some(RequestContext {
            stage: Some("dev".to_string()),
        });
        let response = handler(&router, Some("prod"), ev).await.unwrap();
        assert_eq!(response.status_code, 404);
    }

    #[tokio::test]
    async fn test_handler_rejects_bad_header() {
        let mut ev = event("/");
        ev.headers = Some(HashMap::from([("bad header".to_string(), "x".to_string())]));

        let result = handler(&prod_router(), Some("prod"), ev).await;
        assert!(matches!(result, Err(AdapterError::InvalidHeader(_))));
    }
}
