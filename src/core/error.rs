use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Data access error: {0}")]
    DataAccess(String),

    #[error("Feature not supported: {0}")]
    Unsupported(String),

    #[error("{message}")]
    Proxy {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, ProxyError>;

impl ProxyError {
    /// Adapter failure without an underlying cause
    pub fn proxy(message: impl Into<String>) -> Self {
        Self::Proxy {
            message: message.into(),
            source: None,
        }
    }

    /// Adapter failure carrying the error that caused it
    pub fn proxy_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Proxy {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Whether this error belongs to the data-access category.
    ///
    /// `Unsupported` is a data-access failure too, the same way a
    /// "feature not supported" error is one of a driver's own errors.
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess(_) | Self::Unsupported(_))
    }

    /// Keeps data-access failures as they are and wraps anything else
    /// in a `Proxy` error with the original preserved as its source.
    pub fn reclassify(self, message: &str) -> Self {
        if self.is_data_access() {
            self
        } else {
            Self::proxy_with_source(message, self)
        }
    }
}
