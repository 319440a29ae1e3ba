//! Client framework for signature-authenticated internal REST services.
//!
//! A call site implements [`RestApi`] to declare its operations and names
//! the [`AppConfig`] that backs them, registers configs on a [`RestClient`]
//! through its builder, and dispatches by operation key. Requests carry an
//! md5 signature over a canonical field set; responses come back as a
//! [`RestResult`] that can be streamed or materialized into a [`JsonResult`]
//! after the service envelope check.
//!
//! ```no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use rest_client::{AppConfig, AppRestBuild, RestApi, RestBuild, RestClient};
//!
//! struct ProductApi;
//!
//! impl RestApi for ProductApi {
//!     fn endpoints(&self) -> HashMap<String, Arc<dyn RestBuild>> {
//!         HashMap::from([(
//!             "product_add".to_string(),
//!             Arc::new(AppRestBuild::post("/jp/product", "add")) as Arc<dyn RestBuild>,
//!         )])
//!     }
//!     fn config_name(&self) -> String {
//!         "product".to_string()
//!     }
//! }
//!
//! # async fn run() {
//! let client = RestClient::builder()
//!     .config(AppConfig::new("product", "hjx", "secret", "http://localhost:8080"))
//!     .build(Arc::new(ProductApi));
//!
//! let pending = client.execute("product_add", &serde_json::json!({"id": "111"}));
//! let view = pending.wait().await.json(Some("data")).await;
//! if view.err().is_none() {
//!     let id = view.str_value("id");
//! }
//! # }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod json;
pub mod result;
pub mod signer;
pub mod traits;

pub use client::{PendingResult, RestClient, RestClientBuilder};
pub use config::{AppConfig, EventFactory};
pub use endpoint::{AppRestBuild, REQUEST_ID_HEADER};
pub use error::{ClientError, ClientResult};
pub use event::{NoopEvent, RestEvent, TraceEvent};
pub use json::JsonResult;
pub use result::RestResult;
pub use signer::{sign, PROTOCOL_VERSION};
pub use traits::{RestApi, RestBuild};
