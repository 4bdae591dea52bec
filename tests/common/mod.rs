//! Test doubles shared by the integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use datasource_proxy::listener::{MethodExecutionContext, QueryExecution};
use datasource_proxy::{
    Connection, ConnectionInfo, DataSource, LogWriter, ProxyConfig, ProxyError, ProxyFactory,
    ProxyListener, Result,
};
use parking_lot::Mutex;
use std::any::Any;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Connection whose statements are kept in memory
pub struct MemoryConnection {
    pub serial: u64,
    pub user: Option<String>,
    pub statements: Mutex<Vec<String>>,
    pub closed: AtomicBool,
}

#[async_trait]
impl Connection for MemoryConnection {
    async fn execute(&self, sql: &str) -> Result<u64> {
        if sql.contains("missing_table") {
            return Err(ProxyError::DataAccess("relation \"missing_table\" does not exist".into()));
        }
        self.statements.lock().push(sql.to_string());
        Ok(sql.matches(',').count() as u64 + 1)
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Data source with every optional capability: release and a parent logger
pub struct MemoryDataSource {
    pub acquisitions: AtomicUsize,
    pub failure: Mutex<Option<String>>,
    pub closed: AtomicBool,
    next_serial: AtomicU64,
    login_timeout: Mutex<Duration>,
    log_writer: Mutex<Option<LogWriter>>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self {
            acquisitions: AtomicUsize::new(0),
            failure: Mutex::new(None),
            closed: AtomicBool::new(false),
            next_serial: AtomicU64::new(100),
            login_timeout: Mutex::new(Duration::from_secs(30)),
            log_writer: Mutex::new(None),
        }
    }

    pub fn fail_with(&self, message: &str) {
        *self.failure.lock() = Some(message.to_string());
    }

    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    fn acquire(&self, user: Option<&str>) -> Result<Box<dyn Connection>> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.lock().clone() {
            return Err(ProxyError::DataAccess(message));
        }
        Ok(Box::new(MemoryConnection {
            serial: self.next_serial.fetch_add(1, Ordering::SeqCst),
            user: user.map(str::to_string),
            statements: Mutex::new(Vec::new()),
            closed: AtomicBool::new(false),
        }))
    }
}

#[async_trait]
impl DataSource for MemoryDataSource {
    async fn get_connection(&self) -> Result<Box<dyn Connection>> {
        self.acquire(None)
    }

    async fn get_connection_with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        if password != "secret" {
            self.acquisitions.fetch_add(1, Ordering::SeqCst);
            return Err(ProxyError::DataAccess(format!(
                "password authentication failed for user \"{username}\""
            )));
        }
        self.acquire(Some(username))
    }

    fn log_writer(&self) -> Result<Option<LogWriter>> {
        Ok(self.log_writer.lock().clone())
    }

    fn set_log_writer(&self, writer: Option<LogWriter>) -> Result<()> {
        *self.log_writer.lock() = writer;
        Ok(())
    }

    fn login_timeout(&self) -> Result<Duration> {
        Ok(*self.login_timeout.lock())
    }

    fn set_login_timeout(&self, timeout: Duration) -> Result<()> {
        if timeout > Duration::from_secs(3600) {
            return Err(ProxyError::DataAccess("login timeout too large".into()));
        }
        *self.login_timeout.lock() = timeout;
        Ok(())
    }

    fn parent_logger(&self) -> Result<String> {
        Ok("memory_datasource".to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Data source relying on every trait default
pub struct BareDataSource;

#[async_trait]
impl DataSource for BareDataSource {
    async fn get_connection(&self) -> Result<Box<dyn Connection>> {
        Err(ProxyError::DataAccess("no connections".into()))
    }

    async fn get_connection_with_credentials(
        &self,
        _username: &str,
        _password: &str,
    ) -> Result<Box<dyn Connection>> {
        Err(ProxyError::DataAccess("no connections".into()))
    }

    fn log_writer(&self) -> Result<Option<LogWriter>> {
        Ok(None)
    }

    fn set_log_writer(&self, _writer: Option<LogWriter>) -> Result<()> {
        Ok(())
    }

    fn login_timeout(&self) -> Result<Duration> {
        Ok(Duration::ZERO)
    }

    fn set_login_timeout(&self, _timeout: Duration) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Records notifications as `tag:event:detail` strings
pub struct RecordingListener {
    tag: &'static str,
    events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub fn new(tag: &'static str) -> Arc<Self> {
        Arc::new(Self {
            tag,
            events: Mutex::new(Vec::new()),
        })
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    fn push(&self, event: &str, detail: &str) {
        self.events
            .lock()
            .push(format!("{}:{}:{}", self.tag, event, detail));
    }
}

impl ProxyListener for RecordingListener {
    fn before_method(&self, context: &MethodExecutionContext) {
        self.push("before", context.method().name());
    }

    fn after_method(&self, context: &MethodExecutionContext) {
        let outcome = if context.is_success() { "ok" } else { "err" };
        self.push("after", &format!("{}:{}", context.method().name(), outcome));
    }

    fn before_query(&self, execution: &QueryExecution) {
        self.push("before_query", execution.query());
    }

    fn after_query(&self, execution: &QueryExecution) {
        self.push("after_query", execution.query());
    }
}

/// Factory failing with a caller-chosen error
pub struct FailingFactory {
    pub make_error: fn() -> ProxyError,
    pub calls: AtomicUsize,
}

impl FailingFactory {
    pub fn new(make_error: fn() -> ProxyError) -> Arc<Self> {
        Arc::new(Self {
            make_error,
            calls: AtomicUsize::new(0),
        })
    }
}

impl ProxyFactory for FailingFactory {
    fn create_connection(
        &self,
        _raw: Box<dyn Connection>,
        _connection_info: ConnectionInfo,
        _config: Arc<ProxyConfig>,
    ) -> Result<Box<dyn Connection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err((self.make_error)())
    }
}
