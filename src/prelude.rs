//! Everything needed to set up a proxy and write listeners.
//!
//! ```
//! use datasource_proxy::prelude::*;
//! ```

pub use crate::core::{ProxyError, Result};
pub use crate::datasource::{Connection, DataSource, LogWriter};
pub use crate::listener::logging::{LogFormat, TracingListener};
pub use crate::listener::{
    ListenerChain, MethodExecutionContext, ProxyListener, ProxyMethod, QueryExecution,
};
pub use crate::proxy::{ConnectionInfo, ProxyConfig, ProxyConnection, ProxyDataSource};
pub use crate::ProxyDataSourceBuilder;
