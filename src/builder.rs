use crate::core::Result;
use crate::datasource::DataSource;
use crate::listener::ProxyListener;
use crate::listener::logging::{LogFormat, TracingListener};
use crate::proxy::{
    ConnectionIdManager, ProxyConfig, ProxyConfigBuilder, ProxyDataSource, ProxyFactory,
};
use crate::settings::ProxySettings;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

/// Fluent setup of a [`ProxyDataSource`]
///
/// # Examples
///
/// ```ignore
/// let proxy = ProxyDataSourceBuilder::new(Arc::new(pool))
///     .name("orders")
///     .log_query_by_tracing(Level::INFO)
///     .json_format()
///     .slow_query_threshold(Duration::from_millis(500))
///     .build();
/// ```
pub struct ProxyDataSourceBuilder {
    data_source: Arc<dyn DataSource>,
    config: ProxyConfigBuilder,
    query_logger: Option<TracingListener>,
}

impl ProxyDataSourceBuilder {
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self {
            data_source,
            config: ProxyConfig::builder(),
            query_logger: None,
        }
    }

    /// Set the data source name reported to listeners
    pub fn name(mut self, name: &str) -> Self {
        self.config = self.config.data_source_name(name);
        self
    }

    pub fn listener(mut self, listener: Arc<dyn ProxyListener>) -> Self {
        self.config = self.config.listener(listener);
        self
    }

    pub fn connection_id_manager(mut self, manager: Arc<dyn ConnectionIdManager>) -> Self {
        self.config = self.config.connection_id_manager(manager);
        self
    }

    pub fn proxy_factory(mut self, factory: Arc<dyn ProxyFactory>) -> Self {
        self.config = self.config.proxy_factory(factory);
        self
    }

    /// Log executed queries through `tracing` at `level`
    pub fn log_query_by_tracing(mut self, level: Level) -> Self {
        let logger = self.query_logger.take().unwrap_or_default();
        self.query_logger = Some(logger.at_level(level));
        self
    }

    /// Log queries as JSON. Enables query logging at DEBUG if not enabled yet.
    pub fn json_format(mut self) -> Self {
        let logger = self.query_logger.take().unwrap_or_default();
        self.query_logger = Some(logger.format(LogFormat::Json));
        self
    }

    /// Log queries slower than `threshold` at WARN. Enables query logging
    /// at DEBUG if not enabled yet.
    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        let logger = self.query_logger.take().unwrap_or_default();
        self.query_logger = Some(logger.slow_query_threshold(threshold));
        self
    }

    /// Also log connection acquisition and release
    pub fn log_methods(mut self) -> Self {
        let logger = self.query_logger.take().unwrap_or_default();
        self.query_logger = Some(logger.log_methods(true));
        self
    }

    /// Apply serialized settings on top of what is configured so far
    pub fn settings(mut self, settings: &ProxySettings) -> Result<Self> {
        settings.validate()?;
        if !settings.data_source_name.is_empty() {
            self.config = self.config.data_source_name(&settings.data_source_name);
        }
        self.config = self
            .config
            .connection_id_manager(settings.id_strategy.manager());
        if let Some(logger) = settings.query_log.listener()? {
            self.query_logger = Some(logger);
        }
        Ok(self)
    }

    pub fn build(self) -> ProxyDataSource {
        let mut config = self.config;
        if let Some(logger) = self.query_logger {
            config = config.listener(Arc::new(logger));
        }
        ProxyDataSource::with_config(self.data_source, config.build())
    }
}
