//! Listener notifications around intercepted calls
//!
//! A [`ProxyListener`] observes two kinds of events:
//! - method events, fired around connection acquisition and release
//! - query events, fired around every statement a proxied connection executes
//!
//! Listeners are combined into a [`ListenerChain`] held by the
//! [`ProxyConfig`](crate::ProxyConfig) snapshot.

pub mod dispatch;
pub mod logging;

use crate::proxy::ConnectionInfo;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// The operation a method event refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyMethod {
    /// `get_connection()` on the data source
    GetConnection,
    /// `get_connection_with_credentials(username, _)` on the data source.
    /// The password is never kept.
    GetConnectionWithCredentials { username: String },
    /// `close()` on a proxied connection
    ConnectionClose,
}

impl ProxyMethod {
    pub fn name(&self) -> &'static str {
        match self {
            ProxyMethod::GetConnection => "get_connection",
            ProxyMethod::GetConnectionWithCredentials { .. } => {
                "get_connection_with_credentials"
            }
            ProxyMethod::ConnectionClose => "close",
        }
    }

    /// Whether this method acquires a new connection
    pub fn is_acquisition(&self) -> bool {
        !matches!(self, ProxyMethod::ConnectionClose)
    }
}

impl fmt::Display for ProxyMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyMethod::GetConnectionWithCredentials { username } => {
                write!(f, "{}(user={})", self.name(), username)
            }
            _ => write!(f, "{}()", self.name()),
        }
    }
}

/// Per-call record passed to method listeners
///
/// Created fresh for each intercepted call. `elapsed` and `error` are
/// only populated by the time `after_method` runs.
#[derive(Debug, Clone)]
pub struct MethodExecutionContext {
    method: ProxyMethod,
    connection_info: ConnectionInfo,
    pub(crate) elapsed: Option<Duration>,
    pub(crate) error: Option<String>,
}

impl MethodExecutionContext {
    pub fn new(method: ProxyMethod, connection_info: ConnectionInfo) -> Self {
        Self {
            method,
            connection_info,
            elapsed: None,
            error: None,
        }
    }

    pub fn method(&self) -> &ProxyMethod {
        &self.method
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.connection_info
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    /// Display text of the failure, if the call failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-statement record passed to query listeners
#[derive(Debug, Clone)]
pub struct QueryExecution {
    connection_info: ConnectionInfo,
    query: String,
    pub(crate) elapsed: Option<Duration>,
    pub(crate) affected_rows: Option<u64>,
    pub(crate) error: Option<String>,
}

impl QueryExecution {
    pub fn new(connection_info: ConnectionInfo, query: &str) -> Self {
        Self {
            connection_info,
            query: query.to_string(),
            elapsed: None,
            affected_rows: None,
            error: None,
        }
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.connection_info
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.elapsed
    }

    pub fn affected_rows(&self) -> Option<u64> {
        self.affected_rows
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Observer of intercepted calls
///
/// Every hook defaults to a no-op, so implementations only override the
/// events they care about. Hooks run synchronously on the calling task
/// and should return quickly.
///
/// ```
/// use datasource_proxy::listener::{ProxyListener, QueryExecution};
///
/// struct SlowQueries;
///
/// impl ProxyListener for SlowQueries {
///     fn after_query(&self, execution: &QueryExecution) {
///         if execution.elapsed().is_some_and(|d| d.as_millis() > 500) {
///             eprintln!("slow: {}", execution.query());
///         }
///     }
/// }
/// ```
pub trait ProxyListener: Send + Sync {
    fn before_method(&self, context: &MethodExecutionContext) {
        let _ = context;
    }

    fn after_method(&self, context: &MethodExecutionContext) {
        let _ = context;
    }

    fn before_query(&self, execution: &QueryExecution) {
        let _ = execution;
    }

    fn after_query(&self, execution: &QueryExecution) {
        let _ = execution;
    }
}

impl<T> ProxyListener for Arc<T>
where
    T: ProxyListener + ?Sized,
{
    fn before_method(&self, context: &MethodExecutionContext) {
        (**self).before_method(context)
    }

    fn after_method(&self, context: &MethodExecutionContext) {
        (**self).after_method(context)
    }

    fn before_query(&self, execution: &QueryExecution) {
        (**self).before_query(execution)
    }

    fn after_query(&self, execution: &QueryExecution) {
        (**self).after_query(execution)
    }
}

/// Immutable, ordered aggregate of listeners
///
/// Adding a listener produces a new chain; chains already handed out
/// keep the listeners they were built with.
#[derive(Clone, Default)]
pub struct ListenerChain {
    listeners: Vec<Arc<dyn ProxyListener>>,
}

impl ListenerChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Chain holding just `listener`
    pub fn single(listener: Arc<dyn ProxyListener>) -> Self {
        Self {
            listeners: vec![listener],
        }
    }

    /// Copy of this chain with `listener` appended
    pub fn with_listener(&self, listener: Arc<dyn ProxyListener>) -> Self {
        let mut listeners = self.listeners.clone();
        listeners.push(listener);
        Self { listeners }
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn ProxyListener>> {
        self.listeners.iter()
    }
}

impl fmt::Debug for ListenerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerChain")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl ProxyListener for ListenerChain {
    fn before_method(&self, context: &MethodExecutionContext) {
        for listener in &self.listeners {
            listener.before_method(context);
        }
    }

    fn after_method(&self, context: &MethodExecutionContext) {
        for listener in &self.listeners {
            listener.after_method(context);
        }
    }

    fn before_query(&self, execution: &QueryExecution) {
        for listener in &self.listeners {
            listener.before_query(execution);
        }
    }

    fn after_query(&self, execution: &QueryExecution) {
        for listener in &self.listeners {
            listener.after_query(execution);
        }
    }
}
