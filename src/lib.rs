// ============================================================================
// datasource-proxy Library
// ============================================================================

//! Data source proxy with pluggable listeners.
//!
//! [`ProxyDataSource`] decorates any [`DataSource`]: every call is forwarded
//! to the wrapped data source, while connection acquisition is reported to
//! [`ProxyListener`]s and the acquired connection is wrapped so its
//! statements and its release are reported too.
//!
//! # Examples
//!
//! ```ignore
//! use datasource_proxy::prelude::*;
//! use std::sync::Arc;
//!
//! let proxy = ProxyDataSourceBuilder::new(Arc::new(pool))
//!     .name("orders")
//!     .log_query_by_tracing(tracing::Level::INFO)
//!     .build();
//!
//! let conn = proxy.get_connection().await?;
//! conn.execute("DELETE FROM carts WHERE expired").await?;
//! conn.close().await?;
//! ```

pub mod core;
pub mod datasource;
pub mod listener;
pub mod proxy;
pub mod settings;
pub mod prelude;
mod builder;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use crate::core::{ProxyError, Result};
pub use datasource::{Connection, DataSource, LogWriter};
pub use builder::ProxyDataSourceBuilder;

// Re-export proxy API
pub use proxy::{
    ConnectionIdManager,
    ConnectionInfo,
    DefaultConnectionIdManager,
    DefaultProxyFactory,
    GlobalConnectionIdManager,
    ProxyConfig,
    ProxyConfigBuilder,
    ProxyConnection,
    ProxyDataSource,
    ProxyFactory,
    UuidConnectionIdManager,
};
pub use listener::{ListenerChain, ProxyListener};
