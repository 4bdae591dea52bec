//! Serializable proxy settings
//!
//! Lets the proxy setup live in a configuration file next to the pool
//! settings instead of in code.
//!
//! ```
//! use datasource_proxy::settings::{IdStrategy, ProxySettings};
//!
//! let settings = ProxySettings::from_json(r#"{
//!     "data_source_name": "orders",
//!     "id_strategy": "uuid",
//!     "query_log": { "enabled": true, "level": "info", "format": "json" }
//! }"#).unwrap();
//!
//! assert_eq!(settings.id_strategy, IdStrategy::Uuid);
//! ```

use crate::core::{ProxyError, Result};
use crate::listener::logging::{LogFormat, TracingListener};
use crate::proxy::{
    ConnectionIdManager, DefaultConnectionIdManager, GlobalConnectionIdManager,
    UuidConnectionIdManager,
};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub data_source_name: String,
    pub id_strategy: IdStrategy,
    pub query_log: QueryLogSettings,
}

/// Which [`ConnectionIdManager`] to install
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Default,
    Global,
    Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLogSettings {
    pub enabled: bool,
    /// One of `error`, `warn`, `info`, `debug`, `trace`
    pub level: String,
    pub format: LogFormat,
    pub log_methods: bool,
    pub slow_query_threshold_ms: Option<u64>,
}

impl Default for QueryLogSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "debug".to_string(),
            format: LogFormat::Text,
            log_methods: false,
            slow_query_threshold_ms: None,
        }
    }
}

impl ProxySettings {
    /// Parse and validate settings from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| ProxyError::proxy_with_source("Invalid proxy settings", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ProxyError::proxy_with_source("Failed to serialize proxy settings", e))
    }

    /// Validate settings
    pub fn validate(&self) -> Result<()> {
        self.query_log.level()?;
        Ok(())
    }
}

impl IdStrategy {
    pub fn manager(&self) -> Arc<dyn ConnectionIdManager> {
        match self {
            IdStrategy::Default => Arc::new(DefaultConnectionIdManager::new()),
            IdStrategy::Global => Arc::new(GlobalConnectionIdManager::new()),
            IdStrategy::Uuid => Arc::new(UuidConnectionIdManager::new()),
        }
    }
}

impl QueryLogSettings {
    pub fn level(&self) -> Result<Level> {
        Level::from_str(&self.level).map_err(|e| {
            ProxyError::proxy_with_source(format!("Invalid log level '{}'", self.level), e)
        })
    }

    /// Logging listener described by these settings, `None` when disabled
    pub fn listener(&self) -> Result<Option<TracingListener>> {
        if !self.enabled {
            return Ok(None);
        }

        let mut listener = TracingListener::new(self.level()?)
            .format(self.format)
            .log_methods(self.log_methods);
        if let Some(ms) = self.slow_query_threshold_ms {
            listener = listener.slow_query_threshold(Duration::from_millis(ms));
        }
        Ok(Some(listener))
    }
}
