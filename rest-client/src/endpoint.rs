//! App-protocol endpoint builder.
//!
//! One [`AppRestBuild`] describes one remote operation: HTTP verb, path,
//! logical method name, and an optional per-call timeout. Building a request
//! resolves the tenant config, serializes the parameters, signs the
//! canonical field set, and issues the call over the dispatcher's shared
//! transport. The timeout override travels on the request itself; shared
//! transport state is never touched.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use url::form_urlencoded;

use crate::client::RestClient;
use crate::error::{ClientError, ClientResult};
use crate::event::NoopEvent;
use crate::result::RestResult;
use crate::signer::{sign, PROTOCOL_VERSION};
use crate::traits::RestBuild;

/// Header carrying the caller's correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Wire timestamp format agreed with the receiving service.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Immutable descriptor for one signed-app operation.
#[derive(Debug, Clone)]
pub struct AppRestBuild {
    /// HTTP verb; GET sends the signed fields as a query string, anything
    /// else as a form body
    pub http_method: Method,
    /// Endpoint path appended to the config's base URL (may already carry
    /// a query string)
    pub path: String,
    /// Logical service method, signed and sent as the `method` field;
    /// empty means the service routes by path alone
    pub method: String,
    /// Per-call timeout override; `None` uses the transport default
    pub timeout: Option<Duration>,
}

impl AppRestBuild {
    /// Descriptor for a read-style (query string) operation.
    pub fn get(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            http_method: Method::GET,
            path: path.into(),
            method: method.into(),
            timeout: None,
        }
    }

    /// Descriptor for a write-style (form body) operation.
    pub fn post(path: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            http_method: Method::POST,
            path: path.into(),
            method: method.into(),
            timeout: None,
        }
    }

    /// Override the transport timeout for calls through this descriptor.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[async_trait]
impl RestBuild for AppRestBuild {
    async fn build_request(
        self: Arc<Self>,
        client: &RestClient,
        key: &str,
        params: Value,
    ) -> RestResult {
        let config = match client.get_config() {
            Ok(config) => config,
            Err(err) => return RestResult::from_error(err, Box::new(NoopEvent)),
        };
        let mut event = config.new_event();

        let content = match serde_json::to_string(&params) {
            Ok(content) => content,
            Err(err) => return RestResult::from_error(err.into(), event),
        };

        let token = match client.api().token().await {
            Ok(token) => token,
            Err(err) => return RestResult::from_error(err, event),
        };

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let signature = sign(
            PROTOCOL_VERSION,
            &config.app_key,
            &self.method,
            &timestamp,
            &content,
            &config.app_secret,
            token.as_deref(),
        );

        // Scoped so the non-Send serializer is dropped before the await below.
        let encoded = {
            let mut encoder = form_urlencoded::Serializer::new(String::new());
            encoder.append_pair("app", &config.app_key);
            encoder.append_pair("version", PROTOCOL_VERSION);
            encoder.append_pair("timestamp", &timestamp);
            encoder.append_pair("content", &content);
            encoder.append_pair("sign", &signature);
            if !self.method.is_empty() {
                encoder.append_pair("method", &self.method);
            }
            if let Some(token) = token.as_deref().filter(|t| !t.is_empty()) {
                encoder.append_pair("token", token);
            }
            encoder.finish()
        };

        let mut url = format!("{}{}", config.app_url, self.path);
        let is_get = self.http_method == Method::GET;
        if is_get {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&encoded);
        }

        event.request_start(self.http_method.as_str(), &url);
        debug!(key, method = %self.http_method, %url, "dispatching signed request");

        let mut request = client.http().request(self.http_method.clone(), url.as_str());
        if let Some(request_id) = client.api().request_id() {
            request = request.header(REQUEST_ID_HEADER, request_id);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        if !is_get {
            event.request_read(encoded.as_bytes());
            request = request
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(encoded);
        }

        match request.send().await {
            Ok(response) => RestResult::from_response(self, response, event),
            Err(err) => RestResult::from_error(ClientError::Transport(err.to_string()), event),
        }
    }

    fn check_json_result(&self, body: &str) -> ClientResult<()> {
        let root: Value = match serde_json::from_str(body) {
            Ok(root) => root,
            Err(_) => return Ok(()),
        };
        // Only an explicit failure envelope fails the call; a body without
        // the marker is passed through untouched.
        let Some(result) = root.get("result") else {
            return Ok(());
        };
        let code = field_string(result, "code");
        let state = field_string(result, "state");
        if code == "200" && state == "ok" {
            return Ok(());
        }
        let message = match field_string(result, "message") {
            m if m.is_empty() => body.to_string(),
            m => m,
        };
        Err(ClientError::service(code, state, message))
    }
}

/// Envelope fields may arrive as strings or bare numbers.
fn field_string(value: &Value, key: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_rejects_failure_envelope() {
        let build = AppRestBuild::post("/jp/product", "add");
        let err = build
            .check_json_result(r#"{"result":{"code":"500","state":"fail","message":"bad id"}}"#)
            .unwrap_err();
        assert_eq!(err.error_code(), Some("500"));
        assert!(err.to_string().contains("bad id"));
    }

    #[test]
    fn test_check_accepts_success_envelope() {
        let build = AppRestBuild::post("/jp/product", "add");
        assert!(build
            .check_json_result(r#"{"result":{"code":"200","state":"ok"},"data":{"id":"111"}}"#)
            .is_ok());
    }

    #[test]
    fn test_check_accepts_numeric_code() {
        let build = AppRestBuild::get("/jp/product", "detail");
        assert!(build
            .check_json_result(r#"{"result":{"code":200,"state":"ok"}}"#)
            .is_ok());
    }

    #[test]
    fn test_check_passes_bodies_without_marker() {
        let build = AppRestBuild::get("/jp/product", "detail");
        assert!(build.check_json_result(r#"{"data":{"id":"111"}}"#).is_ok());
        assert!(build.check_json_result("plain text").is_ok());
    }

    #[test]
    fn test_check_uses_body_when_message_absent() {
        let build = AppRestBuild::post("/jp/product", "add");
        let body = r#"{"result":{"code":"500","state":"fail"}}"#;
        let err = build.check_json_result(body).unwrap_err();
        assert!(err.to_string().contains(body));
    }

    #[test]
    fn test_descriptor_constructors() {
        let build = AppRestBuild::get("/jp/product", "detail")
            .with_timeout(Duration::from_secs(100));
        assert_eq!(build.http_method, Method::GET);
        assert_eq!(build.path, "/jp/product");
        assert_eq!(build.method, "detail");
        assert_eq!(build.timeout, Some(Duration::from_secs(100)));
    }
}
