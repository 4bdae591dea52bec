use super::id::ConnectionIdManager;
use super::{ConnectionInfo, ProxyConfig, ProxyConfigBuilder};
use crate::core::{ProxyError, Result};
use crate::datasource::{Connection, DataSource, LogWriter};
use crate::listener::{ListenerChain, MethodExecutionContext, ProxyListener, ProxyMethod, dispatch};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{Level, event};

/// Data source decorator that reports connection acquisition to listeners
///
/// Every call is forwarded to the wrapped data source. The two acquisition
/// calls additionally assign a connection id, notify the configured
/// listeners and hand back the connection produced by the configured
/// [`ProxyFactory`](super::ProxyFactory) instead of the raw one.
///
/// The configuration is held as an immutable [`ProxyConfig`] snapshot.
/// Each setter installs a new snapshot; snapshots obtained earlier through
/// [`ProxyDataSource::proxy_config`] never change.
///
/// # Examples
///
/// ```ignore
/// let proxy = ProxyDataSource::new(Arc::new(pool));
/// proxy.set_data_source_name("orders");
/// proxy.add_listener(Arc::new(TracingListener::default()));
///
/// let conn = proxy.get_connection().await?;
/// conn.execute("UPDATE orders SET state = 'paid' WHERE id = 7").await?;
/// conn.close().await?;
/// ```
pub struct ProxyDataSource {
    data_source: Option<Arc<dyn DataSource>>,
    config: RwLock<Arc<ProxyConfig>>,
}

impl ProxyDataSource {
    /// Create a proxy around `data_source` with the default configuration
    pub fn new(data_source: Arc<dyn DataSource>) -> Self {
        Self::with_config(data_source, ProxyConfig::default())
    }

    pub fn with_config(data_source: Arc<dyn DataSource>, config: ProxyConfig) -> Self {
        Self {
            data_source: Some(data_source),
            config: RwLock::new(Arc::new(config)),
        }
    }

    /// Install or replace the wrapped data source
    ///
    /// Meant for setup, before the proxy is shared.
    pub fn set_data_source(&mut self, data_source: Arc<dyn DataSource>) {
        self.data_source = Some(data_source);
    }

    /// The wrapped data source, if one is installed
    pub fn data_source(&self) -> Option<&Arc<dyn DataSource>> {
        self.data_source.as_ref()
    }

    fn target(&self) -> Result<&Arc<dyn DataSource>> {
        self.data_source
            .as_ref()
            .ok_or_else(|| ProxyError::proxy("data source is not set"))
    }

    /// Current configuration snapshot
    pub fn proxy_config(&self) -> Arc<ProxyConfig> {
        self.config.read().clone()
    }

    pub fn set_proxy_config(&self, config: ProxyConfig) {
        *self.config.write() = Arc::new(config);
    }

    /// Derive a new snapshot from the current one and install it.
    ///
    /// The write lock is held across the read-modify-write so concurrent
    /// updates never drop each other's changes.
    fn update_config(&self, update: impl FnOnce(ProxyConfigBuilder) -> ProxyConfigBuilder) {
        let mut current = self.config.write();
        let next = update(current.to_builder()).build();
        *current = Arc::new(next);
    }

    pub fn data_source_name(&self) -> String {
        self.config.read().data_source_name().to_string()
    }

    pub fn set_data_source_name(&self, name: &str) {
        self.update_config(|builder| builder.data_source_name(name));
    }

    pub fn connection_id_manager(&self) -> Arc<dyn ConnectionIdManager> {
        Arc::clone(self.config.read().connection_id_manager())
    }

    pub fn set_connection_id_manager(&self, manager: Arc<dyn ConnectionIdManager>) {
        self.update_config(|builder| builder.connection_id_manager(manager));
    }

    /// Register a listener after the ones already configured
    ///
    /// Takes effect for acquisitions that start after this call returns.
    pub fn add_listener(&self, listener: Arc<dyn ProxyListener>) {
        self.update_config(|builder| builder.listener(listener));
    }

    /// Replace every registered listener with `listener`
    pub fn replace_listeners(&self, listener: Arc<dyn ProxyListener>) {
        self.update_config(|builder| builder.listeners(ListenerChain::single(listener)));
    }

    #[deprecated(since = "0.1.0", note = "Use `replace_listeners` or `add_listener` instead.")]
    pub fn set_listener(&self, listener: Arc<dyn ProxyListener>) {
        self.replace_listeners(listener);
    }

    /// Route a freshly acquired raw connection through the listeners
    /// and the proxy factory.
    async fn proxy_connection(
        &self,
        raw: Box<dyn Connection>,
        method: ProxyMethod,
    ) -> Result<Box<dyn Connection>> {
        let config = self.proxy_config();

        let connection_id = config.connection_id_manager().get_id(raw.as_ref());
        let connection_info = ConnectionInfo::new(connection_id.clone(), config.data_source_name());
        let context = MethodExecutionContext::new(method, connection_info.clone());

        let factory_config = Arc::clone(&config);
        let result = dispatch::invoke(&config, context, move || async move {
            factory_config.proxy_factory().create_connection(
                raw,
                connection_info,
                Arc::clone(&factory_config),
            )
        })
        .await;

        result.map_err(|err| {
            // No connection was handed out under this id
            config.connection_id_manager().add_closed_id(&connection_id);
            if !err.is_data_access() {
                event!(Level::WARN, error = %err, "connection proxying failed");
            }
            err.reclassify("Failed to perform get_connection")
        })
    }
}

impl Default for ProxyDataSource {
    /// A proxy with nothing to delegate to yet. Install the data source
    /// with [`ProxyDataSource::set_data_source`] before use.
    fn default() -> Self {
        Self {
            data_source: None,
            config: RwLock::new(Arc::new(ProxyConfig::default())),
        }
    }
}

impl fmt::Debug for ProxyDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyDataSource")
            .field("data_source_set", &self.data_source.is_some())
            .field("config", &*self.config.read())
            .finish()
    }
}

#[async_trait]
impl DataSource for ProxyDataSource {
    async fn get_connection(&self) -> Result<Box<dyn Connection>> {
        let raw = self.target()?.get_connection().await.inspect_err(|err| {
            event!(Level::DEBUG, error = %err, "get_connection failed on wrapped data source");
        })?;
        self.proxy_connection(raw, ProxyMethod::GetConnection).await
    }

    async fn get_connection_with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        let raw = self
            .target()?
            .get_connection_with_credentials(username, password)
            .await
            .inspect_err(|err| {
                event!(
                    Level::DEBUG,
                    user = %username,
                    error = %err,
                    "get_connection_with_credentials failed on wrapped data source"
                );
            })?;
        let method = ProxyMethod::GetConnectionWithCredentials {
            username: username.to_string(),
        };
        self.proxy_connection(raw, method).await
    }

    fn log_writer(&self) -> Result<Option<LogWriter>> {
        self.target()?.log_writer()
    }

    fn set_log_writer(&self, writer: Option<LogWriter>) -> Result<()> {
        self.target()?.set_log_writer(writer)
    }

    fn login_timeout(&self) -> Result<Duration> {
        self.target()?.login_timeout()
    }

    fn set_login_timeout(&self, timeout: Duration) -> Result<()> {
        self.target()?.set_login_timeout(timeout)
    }

    fn parent_logger(&self) -> Result<String> {
        self.target()?.parent_logger()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn unwrap_any(&self, target: TypeId) -> Result<&dyn Any> {
        self.target()?.unwrap_any(target)
    }

    fn is_wrapper_for(&self, target: TypeId) -> Result<bool> {
        self.target()?.is_wrapper_for(target)
    }

    /// Releases the wrapped data source. Without one, there is nothing to release.
    async fn close(&self) -> Result<()> {
        match &self.data_source {
            Some(data_source) => data_source.close().await,
            None => Ok(()),
        }
    }
}
