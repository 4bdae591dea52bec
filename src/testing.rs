//! Stubs shared by the unit tests

use crate::core::{ProxyError, Result};
use crate::datasource::{Connection, DataSource, LogWriter};
use crate::listener::{MethodExecutionContext, ProxyListener, QueryExecution};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::any::Any;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

pub(crate) struct StubConnection {
    pub(crate) executed: Mutex<Vec<String>>,
    pub(crate) closes: AtomicUsize,
    /// When set, `close` fails and leaves the connection open
    pub(crate) fail_close: AtomicBool,
}

impl StubConnection {
    pub(crate) fn new() -> Self {
        Self {
            executed: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            fail_close: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Connection for StubConnection {
    async fn execute(&self, sql: &str) -> Result<u64> {
        if sql.starts_with("FAIL") {
            return Err(ProxyError::DataAccess(format!("syntax error in '{sql}'")));
        }
        self.executed.lock().push(sql.to_string());
        Ok(1)
    }

    async fn close(&self) -> Result<()> {
        if self.fail_close.load(Ordering::SeqCst) {
            return Err(ProxyError::DataAccess("close interrupted".into()));
        }
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Hands out `StubConnection`s and counts acquisitions
pub(crate) struct StubDataSource {
    pub(crate) acquisitions: AtomicUsize,
    pub(crate) fail_with: Mutex<Option<String>>,
    login_timeout: Mutex<Duration>,
    log_writer: Mutex<Option<LogWriter>>,
}

impl StubDataSource {
    pub(crate) fn new() -> Self {
        Self {
            acquisitions: AtomicUsize::new(0),
            fail_with: Mutex::new(None),
            login_timeout: Mutex::new(Duration::ZERO),
            log_writer: Mutex::new(None),
        }
    }

    fn acquire(&self) -> Result<Box<dyn Connection>> {
        self.acquisitions.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.fail_with.lock().clone() {
            return Err(ProxyError::DataAccess(message));
        }
        Ok(Box::new(StubConnection::new()))
    }
}

#[async_trait]
impl DataSource for StubDataSource {
    async fn get_connection(&self) -> Result<Box<dyn Connection>> {
        self.acquire()
    }

    async fn get_connection_with_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Box<dyn Connection>> {
        if username.is_empty() || password.is_empty() {
            return Err(ProxyError::DataAccess("invalid credentials".into()));
        }
        self.acquire()
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
        *self.login_timeout.lock() = timeout;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Records every notification as a short tagged string
#[derive(Default)]
pub(crate) struct RecordingListener {
    pub(crate) tag: &'static str,
    pub(crate) events: Mutex<Vec<String>>,
}

impl RecordingListener {
    pub(crate) fn tagged(tag: &'static str) -> Self {
        Self {
            tag,
            events: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }
}

impl ProxyListener for RecordingListener {
    fn before_method(&self, context: &MethodExecutionContext) {
        self.events
            .lock()
            .push(format!("{}:before:{}", self.tag, context.method().name()));
    }

    fn after_method(&self, context: &MethodExecutionContext) {
        self.events
            .lock()
            .push(format!("{}:after:{}", self.tag, context.method().name()));
    }

    fn before_query(&self, execution: &QueryExecution) {
        self.events
            .lock()
            .push(format!("{}:before_query:{}", self.tag, execution.query()));
    }

    fn after_query(&self, execution: &QueryExecution) {
        self.events
            .lock()
            .push(format!("{}:after_query:{}", self.tag, execution.query()));
    }
}
