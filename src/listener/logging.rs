use super::{MethodExecutionContext, ProxyListener, QueryExecution};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{Level, event};

/// Output format of logged entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logs method and query events through `tracing`
///
/// Queries are logged after they complete. Queries slower than the
/// configured threshold are logged at WARN regardless of `level`.
#[derive(Debug, Clone)]
pub struct TracingListener {
    level: Level,
    format: LogFormat,
    log_methods: bool,
    slow_query_threshold: Option<Duration>,
}

#[derive(Serialize)]
struct QueryLogEntry<'a> {
    timestamp: DateTime<Utc>,
    data_source: &'a str,
    connection: &'a str,
    success: bool,
    elapsed_ms: Option<u64>,
    affected_rows: Option<u64>,
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl TracingListener {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            format: LogFormat::Text,
            log_methods: false,
            slow_query_threshold: None,
        }
    }

    pub fn at_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Also log connection acquisition and release
    pub fn log_methods(mut self, enabled: bool) -> Self {
        self.log_methods = enabled;
        self
    }

    pub fn slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn is_slow(&self, execution: &QueryExecution) -> bool {
        match (self.slow_query_threshold, execution.elapsed()) {
            (Some(threshold), Some(elapsed)) => elapsed >= threshold,
            _ => false,
        }
    }

    /// Renders a completed query in the configured format
    pub fn format_query(&self, execution: &QueryExecution) -> String {
        let info = execution.connection_info();
        match self.format {
            LogFormat::Text => {
                let mut line = format!(
                    "Name:{}, Connection:{}, Success:{}, Time:{}, Query:[\"{}\"]",
                    info.data_source_name(),
                    info.connection_id(),
                    execution.is_success(),
                    execution.elapsed().map_or(0, |d| d.as_millis()),
                    execution.query(),
                );
                if let Some(error) = execution.error() {
                    line.push_str(&format!(", Error:{error}"));
                }
                line
            }
            LogFormat::Json => {
                let entry = QueryLogEntry {
                    timestamp: Utc::now(),
                    data_source: info.data_source_name(),
                    connection: info.connection_id(),
                    success: execution.is_success(),
                    elapsed_ms: execution.elapsed().map(|d| d.as_millis() as u64),
                    affected_rows: execution.affected_rows(),
                    query: execution.query(),
                    error: execution.error(),
                };
                // Serializing plain strings and numbers cannot fail
                serde_json::to_string(&entry).unwrap_or_default()
            }
        }
    }

    fn emit(level: Level, message: &str) {
        match level {
            Level::ERROR => event!(Level::ERROR, "{}", message),
            Level::WARN => event!(Level::WARN, "{}", message),
            Level::INFO => event!(Level::INFO, "{}", message),
            Level::DEBUG => event!(Level::DEBUG, "{}", message),
            _ => event!(Level::TRACE, "{}", message),
        }
    }
}

impl Default for TracingListener {
    fn default() -> Self {
        Self::new(Level::DEBUG)
    }
}

impl ProxyListener for TracingListener {
    fn before_method(&self, context: &MethodExecutionContext) {
        if self.log_methods {
            Self::emit(
                self.level,
                &format!(
                    "Name:{}, Method:{}",
                    context.connection_info().data_source_name(),
                    context.method()
                ),
            );
        }
    }

    fn after_method(&self, context: &MethodExecutionContext) {
        if !self.log_methods {
            return;
        }
        let info = context.connection_info();
        let mut line = format!(
            "Name:{}, Connection:{}, Method:{}, Success:{}, Time:{}",
            info.data_source_name(),
            info.connection_id(),
            context.method(),
            context.is_success(),
            context.elapsed().map_or(0, |d| d.as_millis()),
        );
        if let Some(error) = context.error() {
            line.push_str(&format!(", Error:{error}"));
        }
        Self::emit(self.level, &line);
    }

    fn after_query(&self, execution: &QueryExecution) {
        let line = self.format_query(execution);
        if self.is_slow(execution) {
            event!(Level::WARN, slow = true, "{}", line);
        } else {
            Self::emit(self.level, &line);
        }
    }
}
