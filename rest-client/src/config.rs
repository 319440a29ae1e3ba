//! Named configuration for one signed-app tenant.
//!
//! Configs are registered into the dispatcher registry once at setup and
//! looked up concurrently by name afterwards; they are never mutated.
//! Designed to deserialize from TOML configuration files.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::event::{NoopEvent, RestEvent};

/// Factory producing one fresh [`RestEvent`] per call.
pub type EventFactory = Arc<dyn Fn() -> Box<dyn RestEvent> + Send + Sync>;

/// Configuration for one named app tenant.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Registry key; the capability object's `config_name` must match it
    pub name: String,
    /// App identifier sent as the `app` field
    #[serde(default)]
    pub app_key: String,
    /// Shared signing secret
    #[serde(default)]
    pub app_secret: String,
    /// Base URL of the remote service
    #[serde(default = "default_app_url")]
    pub app_url: String,
    /// Per-call observer factory; `None` means no observation
    #[serde(skip)]
    pub event_factory: Option<EventFactory>,
}

fn default_app_url() -> String {
    String::new()
}

impl AppConfig {
    /// Create a config with the given identity fields and no observer.
    pub fn new(
        name: impl Into<String>,
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
        app_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            app_url: app_url.into(),
            event_factory: None,
        }
    }

    /// Attach an observer factory invoked once per call.
    pub fn with_event_factory(
        mut self,
        factory: impl Fn() -> Box<dyn RestEvent> + Send + Sync + 'static,
    ) -> Self {
        self.event_factory = Some(Arc::new(factory));
        self
    }

    /// Load the app key and secret from environment variables.
    ///
    /// Returns `None` when either variable is unset, leaving the config
    /// unchanged for the caller to fall back on.
    pub fn credentials_from_env(mut self, key_env: &str, secret_env: &str) -> Option<Self> {
        self.app_key = std::env::var(key_env).ok()?;
        self.app_secret = std::env::var(secret_env).ok()?;
        Some(self)
    }

    /// Instantiate the per-call event, falling back to a no-op.
    pub(crate) fn new_event(&self) -> Box<dyn RestEvent> {
        match &self.event_factory {
            Some(factory) => factory(),
            None => Box::new(NoopEvent),
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("name", &self.name)
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("app_url", &self.app_url)
            .field("event_factory", &self.event_factory.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = AppConfig::new("product", "hjx", "secret", "http://host:8080");
        assert_eq!(config.name, "product");
        assert_eq!(config.app_key, "hjx");
        assert!(config.event_factory.is_none());

        let config = config.with_event_factory(|| Box::new(crate::event::TraceEvent::new()));
        assert!(config.event_factory.is_some());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = AppConfig::new("product", "hjx", "f4dea3417a2f52ae", "http://host");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("f4dea3417a2f52ae"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_config_deserialization() {
        let toml_str = r#"
            name = "product"
            app_key = "hjx"
            app_secret = "f4dea3417a2f52ae29a635be00537395"
            app_url = "http://127.0.0.1:8080"
        "#;

        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.name, "product");
        assert_eq!(config.app_key, "hjx");
        assert_eq!(config.app_url, "http://127.0.0.1:8080");
        assert!(config.event_factory.is_none());
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = toml::from_str(r#"name = "bare""#).unwrap();
        assert_eq!(config.name, "bare");
        assert!(config.app_key.is_empty());
        assert!(config.app_url.is_empty());
    }
}
