use super::{ConnectionInfo, ProxyConfig, ProxyConnection};
use crate::core::Result;
use crate::datasource::Connection;
use std::sync::Arc;

/// Wraps a raw connection into the connection handed to callers
pub trait ProxyFactory: Send + Sync {
    fn create_connection(
        &self,
        raw: Box<dyn Connection>,
        connection_info: ConnectionInfo,
        config: Arc<ProxyConfig>,
    ) -> Result<Box<dyn Connection>>;
}

/// Produces [`ProxyConnection`]s
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultProxyFactory;

impl ProxyFactory for DefaultProxyFactory {
    fn create_connection(
        &self,
        raw: Box<dyn Connection>,
        connection_info: ConnectionInfo,
        config: Arc<ProxyConfig>,
    ) -> Result<Box<dyn Connection>> {
        Ok(Box::new(ProxyConnection::new(raw, connection_info, config)))
    }
}
