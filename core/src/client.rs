//! JSON request helper over a pluggable `Transport`.
//!
//! # Design
//! Each verb is split into a pure `build_*` step that produces an
//! `HttpRequest` and a shared `handle_response` step that interprets the
//! `HttpResponse`. `custom_fetch` glues them together with one
//! `Transport::execute` call in between; that await (plus reading the body
//! inside the transport) is the only suspension point of a request.
//!
//! A failing response is handled in one of two ways:
//! - body carries a truthy error-message field → the message goes to the
//!   `Notifier` and the request resolves to `Ok(None)`;
//! - otherwise → `Err(ApiError::Unknown)`.
//!
//! The first branch never surfaces an error to the caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::UtilsConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::notify::{alert_error, LogNotifier, Notifier};
use crate::transport::Transport;

/// Request helper bundling a transport, a notifier and configuration.
///
/// Holds no per-request state; concurrent calls are independent.
#[derive(Debug, Clone)]
pub struct Utils<T, N = LogNotifier> {
    transport: T,
    notifier: N,
    config: UtilsConfig,
}

impl<T: Transport> Utils<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            notifier: LogNotifier,
            config: UtilsConfig::default(),
        }
    }
}

impl<T: Transport, N: Notifier> Utils<T, N> {
    pub fn with_notifier<M: Notifier>(self, notifier: M) -> Utils<T, M> {
        Utils {
            transport: self.transport,
            notifier,
            config: self.config,
        }
    }

    pub fn with_config(mut self, config: UtilsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &UtilsConfig {
        &self.config
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn build_get(&self, url: &str) -> HttpRequest {
        self.bare_request(HttpMethod::Get, url)
    }

    pub fn build_post<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, url, body)
    }

    pub fn build_put<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, url, body)
    }

    pub fn build_delete(&self, url: &str) -> HttpRequest {
        self.bare_request(HttpMethod::Delete, url)
    }

    fn bare_request(&self, method: HttpMethod, url: &str) -> HttpRequest {
        HttpRequest {
            method,
            url: self.config.resolve(url),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        url: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            url: self.config.resolve(url),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// Interpret a response: parsed JSON on success, see module docs otherwise.
    ///
    /// The body is parsed before the status is looked at, so a non-JSON body
    /// is a `Deserialization` error whatever the status.
    pub fn handle_response(&self, response: HttpResponse) -> Result<Option<Value>, ApiError> {
        let data: Value = serde_json::from_str(&response.body)
            .map_err(|e| ApiError::Deserialization(e.to_string()))?;

        if response.is_ok() {
            return Ok(Some(data));
        }

        match structured_message(&data, &self.config.error_field) {
            Some(message) => {
                debug!(status = response.status, %message, "structured error response");
                self.alert_error(Some(&message));
                Ok(None)
            }
            None => {
                warn!(status = response.status, "request failed without an error message");
                Err(ApiError::Unknown)
            }
        }
    }

    /// Run one request through the transport and interpret the response.
    pub async fn custom_fetch(&self, request: HttpRequest) -> Result<Option<Value>, ApiError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        debug!(
            status = response.status,
            content_type = response.header("content-type"),
            "received response"
        );
        self.handle_response(response)
    }

    pub async fn request_get<R: DeserializeOwned>(&self, url: &str) -> Result<Option<R>, ApiError> {
        let request = self.build_get(url);
        decode(self.custom_fetch(request).await?)
    }

    pub async fn request_post<B, R>(&self, url: &str, body: &B) -> Result<Option<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_post(url, body)?;
        decode(self.custom_fetch(request).await?)
    }

    pub async fn request_put<B, R>(&self, url: &str, body: &B) -> Result<Option<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.build_put(url, body)?;
        decode(self.custom_fetch(request).await?)
    }

    pub async fn request_delete<R: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<R>, ApiError> {
        let request = self.build_delete(url);
        decode(self.custom_fetch(request).await?)
    }

    /// Show `err` through this helper's notifier.
    pub fn alert_error(&self, err: Option<&str>) {
        alert_error(&self.notifier, err);
    }
}

/// The error-message field of a failing body, if it holds anything truthy.
fn structured_message(data: &Value, field: &str) -> Option<String> {
    let value = data.get(field)?;
    if !is_truthy(value) {
        return None;
    }
    Some(match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn decode<R: DeserializeOwned>(value: Option<Value>) -> Result<Option<R>, ApiError> {
    value
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| ApiError::Deserialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::notify::{MemoryNotifier, SERVER_ERROR};

    /// Replies with a fixed response and remembers the last request.
    struct CannedTransport {
        status: u16,
        body: String,
        seen: Mutex<Option<HttpRequest>>,
    }

    impl CannedTransport {
        fn new(status: u16, body: &str) -> Self {
            Self {
                status,
                body: body.to_string(),
                seen: Mutex::new(None),
            }
        }
    }

    impl Transport for CannedTransport {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            *self.seen.lock().unwrap() = Some(request);
            Ok(HttpResponse {
                status: self.status,
                headers: Vec::new(),
                body: self.body.clone(),
            })
        }
    }

    struct DeadTransport;

    impl Transport for DeadTransport {
        async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Err(ApiError::Transport("connection refused".to_string()))
        }
    }

    fn utils(status: u16, body: &str) -> Utils<CannedTransport, MemoryNotifier> {
        Utils::new(CannedTransport::new(status, body)).with_notifier(MemoryNotifier::new())
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn build_get_has_no_body_or_headers() {
        let req = utils(200, "{}").build_get("http://localhost:8080/api/lives");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, "http://localhost:8080/api/lives");
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_delete_has_no_body_or_headers() {
        let req = utils(200, "{}").build_delete("http://localhost:8080/api/lives/1");
        assert_eq!(req.method, HttpMethod::Delete);
        assert!(req.body.is_none());
        assert!(req.headers.is_empty());
    }

    #[test]
    fn build_post_serializes_json() {
        let req = utils(200, "{}")
            .build_post("http://localhost/api", &json!({"a": 1}))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body.as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[test]
    fn build_put_serializes_json() {
        #[derive(Serialize)]
        struct Config {
            interval: u32,
        }
        let req = utils(200, "{}")
            .build_put("http://localhost/api/config", &Config { interval: 30 })
            .unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.body.as_deref(), Some(r#"{"interval":30}"#));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn unserializable_body_is_rejected() {
        use std::collections::HashMap;
        // JSON object keys must be strings.
        let body: HashMap<(u8, u8), u8> = HashMap::from([((1, 2), 3)]);
        let err = utils(200, "{}").build_post("/api", &body).unwrap_err();
        assert!(matches!(err, ApiError::Serialization(_)));
    }

    #[test]
    fn success_returns_any_json_shape() {
        let u = utils(200, "{}");
        for body in [r#"{"a":1}"#, "[1,2,3]", "42", r#""text""#, "null", "false"] {
            let expected: Value = serde_json::from_str(body).unwrap();
            let got = u.handle_response(response(200, body)).unwrap();
            assert_eq!(got, Some(expected), "body {body}");
        }
        assert!(u.notifier().messages().is_empty());
    }

    #[test]
    fn structured_error_alerts_and_yields_none() {
        let u = utils(200, "{}");
        let got = u
            .handle_response(response(404, r#"{"err_no":404,"err_msg":"live id: 7 not found"}"#))
            .unwrap();
        assert!(got.is_none());
        assert_eq!(u.notifier().messages(), vec!["live id: 7 not found"]);
    }

    #[test]
    fn non_string_error_message_is_shown_as_json() {
        let u = utils(200, "{}");
        let got = u
            .handle_response(response(400, r#"{"err_msg":{"field":"url"}}"#))
            .unwrap();
        assert!(got.is_none());
        assert_eq!(u.notifier().messages(), vec![r#"{"field":"url"}"#]);
    }

    #[test]
    fn falsy_error_message_is_unknown_error() {
        let u = utils(200, "{}");
        for body in [
            r#"{"err_no":500,"err_msg":""}"#,
            r#"{"err_msg":null}"#,
            r#"{"err_msg":0}"#,
            r#"{"err_msg":false}"#,
            r#"{"error":"wrong field"}"#,
            "[]",
            "null",
        ] {
            let err = u.handle_response(response(500, body)).unwrap_err();
            assert!(matches!(err, ApiError::Unknown), "body {body}");
            assert_eq!(err.to_string(), "Unknown error");
        }
        assert!(u.notifier().messages().is_empty());
    }

    #[test]
    fn non_json_body_is_deserialization_error() {
        let u = utils(200, "{}");
        let err = u.handle_response(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
        let err = u.handle_response(response(502, "Bad Gateway")).unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn custom_error_field() {
        let config = UtilsConfig {
            error_field: "message".to_string(),
            ..UtilsConfig::default()
        };
        let u = utils(200, "{}").with_config(config);
        let got = u.handle_response(response(400, r#"{"message":"bad"}"#)).unwrap();
        assert!(got.is_none());
        assert_eq!(u.notifier().messages(), vec!["bad"]);
    }

    #[test]
    fn alert_error_without_message_shows_server_error() {
        let u = utils(200, "{}");
        u.alert_error(None);
        assert_eq!(u.notifier().messages(), vec![SERVER_ERROR]);
    }

    #[tokio::test]
    async fn request_get_decodes_typed_result() {
        #[derive(serde::Deserialize)]
        struct Info {
            app_name: String,
        }
        let u = utils(200, r#"{"app_name":"bililive"}"#);
        let info: Info = u.request_get("http://localhost/api/info").await.unwrap().unwrap();
        assert_eq!(info.app_name, "bililive");
    }

    #[tokio::test]
    async fn request_get_wrong_shape_is_deserialization_error() {
        let u = utils(200, "[1,2]");
        let err = u.request_get::<String>("/api/info").await.unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[tokio::test]
    async fn request_post_sends_built_request() {
        let u = utils(200, "[]").with_config(UtilsConfig::with_base_url("http://localhost:8080"));
        let got: Option<Value> = u.request_post("/api/lives", &json!({"a": 1})).await.unwrap();
        assert_eq!(got, Some(json!([])));

        let seen = u.transport.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.method, HttpMethod::Post);
        assert_eq!(seen.url, "http://localhost:8080/api/lives");
        assert_eq!(seen.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn request_delete_structured_error_resolves_to_none() {
        let u = utils(404, r#"{"err_msg":"gone"}"#);
        let got: Option<Value> = u.request_delete("/api/lives/1").await.unwrap();
        assert!(got.is_none());
        assert_eq!(u.notifier().messages(), vec!["gone"]);

        let seen = u.transport.seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen.method, HttpMethod::Delete);
        assert!(seen.body.is_none());
    }

    #[tokio::test]
    async fn request_put_unknown_error() {
        let u = utils(500, "{}");
        let err = u
            .request_put::<_, Value>("/api/config", &json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Unknown error");
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let u = Utils::new(DeadTransport).with_notifier(MemoryNotifier::new());
        let err = u.request_get::<Value>("/api/info").await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(u.notifier().messages().is_empty());
    }
}
