pub mod config;
pub mod connection;
pub mod datasource;
pub mod factory;
pub mod id;

pub use config::{ProxyConfig, ProxyConfigBuilder};
pub use connection::ProxyConnection;
pub use datasource::ProxyDataSource;
pub use factory::{DefaultProxyFactory, ProxyFactory};
pub use id::{
    ConnectionIdManager, DefaultConnectionIdManager, GlobalConnectionIdManager,
    UuidConnectionIdManager,
};

use serde::Serialize;

/// Identity of a proxied connection
///
/// Built once per acquisition from the assigned connection id and the
/// name of the data source it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    connection_id: String,
    data_source_name: String,
}

impl ConnectionInfo {
    pub fn new(connection_id: impl Into<String>, data_source_name: impl Into<String>) -> Self {
        Self {
            connection_id: connection_id.into(),
            data_source_name: data_source_name.into(),
        }
    }

    pub fn connection_id(&self) -> &str {
        &self.connection_id
    }

    pub fn data_source_name(&self) -> &str {
        &self.data_source_name
    }
}
