//! Request dispatcher.
//!
//! A [`RestClient`] owns the shared HTTP transport and an immutable registry
//! of named [`AppConfig`]s, and dispatches operations declared by a
//! caller-supplied [`RestApi`]. Each call spawns one supervised unit of work
//! and delivers exactly one [`RestResult`] through a [`PendingResult`]; the
//! issuing task never blocks. The registry is sealed at build time, so
//! steady-state lookups need no synchronization.

use std::collections::HashMap;
use std::panic::Location;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{ClientError, ClientResult};
use crate::event::NoopEvent;
use crate::result::RestResult;
use crate::traits::RestApi;

struct ClientInner {
    api: Arc<dyn RestApi>,
    configs: HashMap<String, Arc<AppConfig>>,
    http: reqwest::Client,
}

/// Dispatcher for one capability object over a shared transport.
///
/// Cloning is cheap; clones share the transport pool and registry.
#[derive(Clone)]
pub struct RestClient {
    inner: Arc<ClientInner>,
}

/// Builder that collects configs before the registry is sealed.
///
/// All registration happens here, before any call is dispatched; the built
/// client's registry is read-only by construction.
#[derive(Default)]
pub struct RestClientBuilder {
    configs: HashMap<String, Arc<AppConfig>>,
    http: Option<reqwest::Client>,
}

impl RestClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a named config. A later config with the same name wins.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.configs.insert(config.name.clone(), Arc::new(config));
        self
    }

    /// Use a preconfigured transport instead of the default client.
    pub fn http_client(mut self, http: reqwest::Client) -> Self {
        self.http = Some(http);
        self
    }

    /// Seal the registry and bind the capability object.
    pub fn build(self, api: Arc<dyn RestApi>) -> RestClient {
        RestClient {
            inner: Arc::new(ClientInner {
                api,
                configs: self.configs,
                http: self.http.unwrap_or_default(),
            }),
        }
    }
}

impl RestClient {
    pub fn builder() -> RestClientBuilder {
        RestClientBuilder::new()
    }

    /// The capability object this dispatcher serves.
    pub fn api(&self) -> &Arc<dyn RestApi> {
        &self.inner.api
    }

    /// The shared HTTP transport.
    pub fn http(&self) -> &reqwest::Client {
        &self.inner.http
    }

    /// Registered configs, keyed by name.
    pub fn configs(&self) -> &HashMap<String, Arc<AppConfig>> {
        &self.inner.configs
    }

    /// Resolve the config declared by the capability object.
    pub fn get_config(&self) -> ClientResult<Arc<AppConfig>> {
        let name = self.inner.api.config_name();
        self.inner
            .configs
            .get(&name)
            .cloned()
            .ok_or(ClientError::ConfigNotFound(name))
    }

    /// Dispatch one operation without blocking the caller.
    ///
    /// Pre-flight failures (unknown key, unencodable parameters) are
    /// delivered through the same single-shot channel without any I/O. The
    /// spawned work runs under a supervisor that converts a panic into a
    /// terminal [`ClientError::Internal`] result, so exactly one result is
    /// delivered in every case. Must be called within a tokio runtime.
    #[track_caller]
    pub fn execute(&self, key: &str, params: &impl Serialize) -> PendingResult {
        let caller = Location::caller();

        let params = match serde_json::to_value(params) {
            Ok(params) => params,
            Err(err) => {
                return PendingResult::ready(RestResult::from_error(
                    err.into(),
                    Box::new(NoopEvent),
                ))
            }
        };

        let Some(build) = self.inner.api.endpoints().get(key).cloned() else {
            return PendingResult::ready(RestResult::from_error(
                ClientError::EndpointNotFound(key.to_string()),
                Box::new(NoopEvent),
            ));
        };

        debug!(
            key,
            caller = %format_args!("{}:{}", caller.file(), caller.line()),
            "dispatching operation"
        );

        let (tx, rx) = oneshot::channel();
        let client = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            let worker = tokio::spawn(async move {
                build.build_request(&client, &key, params).await
            });
            let result = match worker.await {
                Ok(result) => result,
                Err(fault) => RestResult::from_error(
                    ClientError::Internal(format!("request task failed: {fault}")),
                    Box::new(NoopEvent),
                ),
            };
            let _ = tx.send(result);
        });

        PendingResult { rx }
    }
}

/// Single-delivery handle for an in-flight call.
///
/// The producer writes exactly once and the handle is consumed by value, so
/// the one-result-per-call contract is enforced by the type. The caller may
/// await immediately or hold the handle and collect later.
pub struct PendingResult {
    rx: oneshot::Receiver<RestResult>,
}

impl PendingResult {
    /// Handle that is already resolved (pre-flight outcomes).
    fn ready(result: RestResult) -> Self {
        let (tx, rx) = oneshot::channel();
        // The receiver is held right here; this send cannot fail.
        let _ = tx.send(result);
        Self { rx }
    }

    /// Wait for the single result of this call.
    pub async fn wait(self) -> RestResult {
        match self.rx.await {
            Ok(result) => result,
            Err(_) => RestResult::from_error(
                ClientError::Internal("result producer dropped without delivering".into()),
                Box::new(NoopEvent),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use serde_json::Value;

    use super::*;
    use crate::traits::RestBuild;

    struct EmptyApi;

    #[async_trait]
    impl RestApi for EmptyApi {
        fn endpoints(&self) -> HashMap<String, Arc<dyn RestBuild>> {
            HashMap::new()
        }
        fn config_name(&self) -> String {
            "missing".to_string()
        }
    }

    struct PanicBuild;

    #[async_trait]
    impl RestBuild for PanicBuild {
        async fn build_request(
            self: Arc<Self>,
            _client: &RestClient,
            _key: &str,
            _params: Value,
        ) -> RestResult {
            panic!("endpoint blew up");
        }
    }

    struct PanicApi;

    #[async_trait]
    impl RestApi for PanicApi {
        fn endpoints(&self) -> HashMap<String, Arc<dyn RestBuild>> {
            HashMap::from([(
                "boom".to_string(),
                Arc::new(PanicBuild) as Arc<dyn RestBuild>,
            )])
        }
        fn config_name(&self) -> String {
            "product".to_string()
        }
    }

    #[tokio::test]
    async fn test_unknown_operation_delivers_one_terminal_error() {
        let client = RestClient::builder().build(Arc::new(EmptyApi));
        let result = client.execute("product_add", &()).wait().await;
        assert!(matches!(
            result.err(),
            Some(ClientError::EndpointNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_unregistered_config_is_an_error() {
        let client = RestClient::builder()
            .config(AppConfig::new("product", "hjx", "secret", "http://host"))
            .build(Arc::new(EmptyApi));
        let err = client.get_config().unwrap_err();
        assert!(matches!(err, ClientError::ConfigNotFound(name) if name == "missing"));
    }

    #[tokio::test]
    async fn test_registry_lookup() {
        let client = RestClient::builder()
            .config(AppConfig::new("product", "hjx", "secret", "http://host"))
            .build(Arc::new(PanicApi));
        let config = client.get_config().unwrap();
        assert_eq!(config.name, "product");
        assert_eq!(client.configs().len(), 1);
    }

    #[tokio::test]
    async fn test_panic_is_contained_as_internal_error() {
        let client = RestClient::builder()
            .config(AppConfig::new("product", "hjx", "secret", "http://host"))
            .build(Arc::new(PanicApi));
        let result = client.execute("boom", &()).wait().await;
        match result.err() {
            Some(ClientError::Internal(msg)) => assert!(msg.contains("request task failed")),
            other => panic!("expected internal error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unencodable_params_fail_pre_flight() {
        let client = RestClient::builder().build(Arc::new(EmptyApi));
        // Maps with non-string keys cannot be encoded as JSON objects.
        let params = HashMap::from([(vec![1u8], 1u8)]);
        let result = client.execute("product_add", &params).wait().await;
        assert!(matches!(result.err(), Some(ClientError::Serialize(_))));
    }
}
