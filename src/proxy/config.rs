use super::factory::{DefaultProxyFactory, ProxyFactory};
use super::id::{ConnectionIdManager, DefaultConnectionIdManager};
use crate::listener::{ListenerChain, ProxyListener};
use std::fmt;
use std::sync::Arc;

/// Proxy configuration snapshot
///
/// A snapshot never changes once built. To change a setting, derive a new
/// snapshot with [`ProxyConfig::to_builder`] and install it on the proxy.
/// Cloning is cheap: collaborators are shared behind `Arc`s.
///
/// # Examples
///
/// ```
/// use datasource_proxy::ProxyConfig;
///
/// let config = ProxyConfig::builder().data_source_name("orders").build();
/// let renamed = config.to_builder().data_source_name("billing").build();
///
/// assert_eq!(config.data_source_name(), "orders");
/// assert_eq!(renamed.data_source_name(), "billing");
/// ```
#[derive(Clone)]
pub struct ProxyConfig {
    data_source_name: String,
    connection_id_manager: Arc<dyn ConnectionIdManager>,
    proxy_factory: Arc<dyn ProxyFactory>,
    listener: ListenerChain,
}

impl ProxyConfig {
    pub fn builder() -> ProxyConfigBuilder {
        ProxyConfigBuilder::new()
    }

    /// Builder pre-filled with this snapshot's settings
    pub fn to_builder(&self) -> ProxyConfigBuilder {
        ProxyConfigBuilder {
            data_source_name: self.data_source_name.clone(),
            connection_id_manager: Arc::clone(&self.connection_id_manager),
            proxy_factory: Arc::clone(&self.proxy_factory),
            listener: self.listener.clone(),
        }
    }

    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }

    pub fn connection_id_manager(&self) -> &Arc<dyn ConnectionIdManager> {
        &self.connection_id_manager
    }

    pub fn proxy_factory(&self) -> &Arc<dyn ProxyFactory> {
        &self.proxy_factory
    }

    pub fn listener(&self) -> &ListenerChain {
        &self.listener
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyConfig")
            .field("data_source_name", &self.data_source_name)
            .field("listener", &self.listener)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ProxyConfig`]
pub struct ProxyConfigBuilder {
    data_source_name: String,
    connection_id_manager: Arc<dyn ConnectionIdManager>,
    proxy_factory: Arc<dyn ProxyFactory>,
    listener: ListenerChain,
}

impl ProxyConfigBuilder {
    /// Builder with the defaults: empty name, sequential ids,
    /// [`DefaultProxyFactory`] and no listeners
    pub fn new() -> Self {
        Self {
            data_source_name: String::new(),
            connection_id_manager: Arc::new(DefaultConnectionIdManager::new()),
            proxy_factory: Arc::new(DefaultProxyFactory),
            listener: ListenerChain::new(),
        }
    }

    /// Set the symbolic data source name
    pub fn data_source_name(mut self, name: &str) -> Self {
        self.data_source_name = name.to_string();
        self
    }

    /// Set the connection id strategy
    pub fn connection_id_manager(mut self, manager: Arc<dyn ConnectionIdManager>) -> Self {
        self.connection_id_manager = manager;
        self
    }

    /// Set the factory producing proxied connections
    pub fn proxy_factory(mut self, factory: Arc<dyn ProxyFactory>) -> Self {
        self.proxy_factory = factory;
        self
    }

    /// Append a listener to the chain
    pub fn listener(mut self, listener: Arc<dyn ProxyListener>) -> Self {
        self.listener = self.listener.with_listener(listener);
        self
    }

    /// Replace the whole listener chain
    pub fn listeners(mut self, chain: ListenerChain) -> Self {
        self.listener = chain;
        self
    }

    pub fn build(self) -> ProxyConfig {
        ProxyConfig {
            data_source_name: self.data_source_name,
            connection_id_manager: self.connection_id_manager,
            proxy_factory: self.proxy_factory,
            listener: self.listener,
        }
    }
}

impl Default for ProxyConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
