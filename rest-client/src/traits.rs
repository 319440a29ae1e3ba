//! Capability seams between call sites and the dispatcher.
//!
//! [`RestApi`] is implemented by each call site and declares which
//! operations exist and which named config backs them. [`RestBuild`] is the
//! per-operation strategy that turns parameters into a signed request. The
//! dispatcher knows nothing about concrete endpoints beyond these traits.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::client::RestClient;
use crate::error::ClientResult;
use crate::result::RestResult;

/// Capability object supplied by the call site.
///
/// The optional capabilities (`token`, `request_id`) default to "absent";
/// implementations override them when the service requires a bearer token
/// or request correlation.
#[async_trait]
pub trait RestApi: Send + Sync {
    /// Operation table: key to endpoint builder.
    ///
    /// Builders are immutable and may be shared by many in-flight calls.
    fn endpoints(&self) -> HashMap<String, Arc<dyn RestBuild>>;

    /// Name of the registered config backing this call site.
    fn config_name(&self) -> String;

    /// Bearer token for the current caller, when the service uses one.
    ///
    /// `Ok(None)` means the capability is absent; an `Err` is terminal for
    /// the call.
    async fn token(&self) -> ClientResult<Option<String>> {
        Ok(None)
    }

    /// Correlation id attached as the `X-Request-ID` header when present.
    fn request_id(&self) -> Option<String> {
        None
    }
}

/// Per-operation build/sign strategy.
///
/// Implementations must be side-effect-free apart from the per-call event
/// instance they create; one builder may serve concurrent calls.
#[async_trait]
pub trait RestBuild: Send + Sync {
    /// Build, sign and issue the request, delivering exactly one result.
    async fn build_request(
        self: Arc<Self>,
        client: &RestClient,
        key: &str,
        params: Value,
    ) -> RestResult;

    /// Inspect a fully-materialized body for the service success envelope.
    ///
    /// The default accepts everything; builders for enveloped services
    /// override it. Only an explicit failure marker fails the call.
    fn check_json_result(&self, _body: &str) -> ClientResult<()> {
        Ok(())
    }
}
