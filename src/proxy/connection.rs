use super::{ConnectionInfo, ProxyConfig};
use crate::core::{ProxyError, Result};
use crate::datasource::Connection;
use crate::listener::{MethodExecutionContext, ProxyListener, ProxyMethod, QueryExecution, dispatch};
use async_trait::async_trait;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
use tracing::{Level, event};

/// Connection handed out by a [`ProxyDataSource`](super::ProxyDataSource)
///
/// Wraps the raw connection acquired from the underlying data source.
/// Every statement is reported to the query listeners and closing is
/// reported to the method listeners of the config snapshot that was
/// current when the connection was acquired.
pub struct ProxyConnection {
    raw: Box<dyn Connection>,
    connection_info: ConnectionInfo,
    config: Arc<ProxyConfig>,
    closed: AtomicBool,
}

impl ProxyConnection {
    pub fn new(
        raw: Box<dyn Connection>,
        connection_info: ConnectionInfo,
        config: Arc<ProxyConfig>,
    ) -> Self {
        Self {
            raw,
            connection_info,
            config,
            closed: AtomicBool::new(false),
        }
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.connection_info
    }

    /// The connection acquired from the underlying data source
    pub fn raw(&self) -> &dyn Connection {
        self.raw.as_ref()
    }

    pub fn proxy_config(&self) -> &Arc<ProxyConfig> {
        &self.config
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connection for ProxyConnection {
    async fn execute(&self, sql: &str) -> Result<u64> {
        if self.is_closed() {
            return Err(ProxyError::DataAccess("connection is closed".into()));
        }

        let listener = self.config.listener();
        let mut execution = QueryExecution::new(self.connection_info.clone(), sql);
        listener.before_query(&execution);

        let start = Instant::now();
        let result = self.raw.execute(sql).await;
        execution.elapsed = Some(start.elapsed());

        match &result {
            Ok(rows) => execution.affected_rows = Some(*rows),
            Err(err) => execution.error = Some(err.to_string()),
        }

        listener.after_query(&execution);
        result
    }

    /// Closes the raw connection. Closing twice is a no-op.
    ///
    /// If the raw close fails the connection stays open and its id stays
    /// registered, so the caller may retry.
    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let context =
            MethodExecutionContext::new(ProxyMethod::ConnectionClose, self.connection_info.clone());
        let result = dispatch::invoke(&self.config, context, || self.raw.close()).await;

        match &result {
            Ok(()) => self
                .config
                .connection_id_manager()
                .add_closed_id(self.connection_info.connection_id()),
            Err(err) => {
                self.closed.store(false, Ordering::SeqCst);
                event!(
                    Level::DEBUG,
                    connection = %self.connection_info.connection_id(),
                    error = %err,
                    "raw connection close failed"
                );
            }
        }
        result
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
