//! Contract of the handle a [`ProxyDataSource`](crate::ProxyDataSource) decorates.
//!
//! These traits play the role a driver's data source and connection types
//! play: anything that can hand out connections (a pool, a single-connection
//! factory, another proxy) implements [`DataSource`].

use crate::core::{ProxyError, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::{Any, TypeId};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

/// Shared log sink a data source may write diagnostics to
pub type LogWriter = Arc<Mutex<dyn Write + Send>>;

/// A connection handed out by a [`DataSource`]
#[async_trait]
pub trait Connection: Send + Sync {
    /// Execute a statement, returning the number of affected rows
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Release the connection
    ///
    /// Connections without anything to release keep the default no-op.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Access to the concrete connection type for downcasting
    fn as_any(&self) -> &dyn Any;
}

/// A provider of database connections
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Acquire a connection using the data source's own credentials
    async fn get_connection(&self) -> Result<Box<dyn Connection>>;

    /// Acquire a connection for the given user
    async fn get_connection_with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>>;

    fn log_writer(&self) -> Result<Option<LogWriter>>;

    fn set_log_writer(&self, writer: Option<LogWriter>) -> Result<()>;

    /// Maximum time to wait while logging in. Zero means the system default.
    fn login_timeout(&self) -> Result<Duration>;

    fn set_login_timeout(&self, timeout: Duration) -> Result<()>;

    /// Name of the logger this data source reports through
    fn parent_logger(&self) -> Result<String> {
        Err(ProxyError::Unsupported("parent_logger".into()))
    }

    /// Access to the concrete data source type for downcasting
    fn as_any(&self) -> &dyn Any;

    /// Returns an object of the requested type that this data source is or wraps
    fn unwrap_any(&self, target: TypeId) -> Result<&dyn Any> {
        let any = self.as_any();
        if any.type_id() == target {
            Ok(any)
        } else {
            Err(ProxyError::DataAccess(format!(
                "data source is not a wrapper for {target:?}"
            )))
        }
    }

    /// Whether this data source is, or wraps, an object of the requested type
    fn is_wrapper_for(&self, target: TypeId) -> Result<bool> {
        Ok(self.as_any().type_id() == target)
    }

    /// Release the data source
    ///
    /// Data sources that cannot be released keep the default no-op.
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

impl dyn DataSource {
    /// Typed form of [`DataSource::unwrap_any`]
    pub fn unwrap<T: Any>(&self) -> Result<&T> {
        self.unwrap_any(TypeId::of::<T>())?
            .downcast_ref::<T>()
            .ok_or_else(|| {
                ProxyError::DataAccess(format!(
                    "data source is not a wrapper for {}",
                    std::any::type_name::<T>()
                ))
            })
    }

    /// Typed form of [`DataSource::is_wrapper_for`]
    pub fn is_wrapper_for_type<T: Any>(&self) -> Result<bool> {
        self.is_wrapper_for(TypeId::of::<T>())
    }
}
