use thiserror::Error;

/// Errors returned by the report and generation clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Unknown report name or an unusable base URL. Raised before any
    /// network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request itself is invalid (unknown output type, missing image).
    /// Raised before any network call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The service answered with a non-success status. Never retried.
    #[error("upstream returned HTTP {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Connection failure or timeout. The only retryable error.
    #[error("transport error calling {url}: {message}")]
    Transport {
        url: String,
        message: String,
        timed_out: bool,
    },

    #[error("gave up after {attempts} attempts: {last_error}")]
    ExhaustedRetries {
        attempts: u32,
        #[source]
        last_error: Box<ClientError>,
    },

    /// Failure building the underlying `reqwest::Client`.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("base64 decode error for {context}: {source}")]
    Decode {
        context: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Maps a `reqwest` send/read failure for `url` to [`ClientError::Transport`].
    pub(crate) fn transport(url: &str, err: &reqwest::Error) -> Self {
        Self::Transport {
            url: url.to_string(),
            message: err.to_string(),
            timed_out: err.is_timeout(),
        }
    }

    /// Stable short name of the error kind, for callers that display
    /// "kind: message".
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::Validation(_) => "validation",
            Self::Upstream { .. } => "upstream",
            Self::Transport { .. } => "transport",
            Self::ExhaustedRetries { .. } => "exhausted_retries",
            Self::Http(_) => "http",
            Self::Deserialize { .. } => "deserialize",
            Self::Decode { .. } => "decode",
            Self::Io(_) => "io",
        }
    }

    /// HTTP status of the upstream failure, looking through retry
    /// exhaustion.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::ExhaustedRetries { last_error, .. } => last_error.status(),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_looks_through_exhausted_retries() {
        let err = ClientError::ExhaustedRetries {
            attempts: 3,
            last_error: Box::new(ClientError::Upstream {
                status: 503,
                body: "busy".to_string(),
            }),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.kind(), "exhausted_retries");
    }

    #[test]
    fn only_transport_is_retryable() {
        let transport = ClientError::Transport {
            url: "http://localhost/api/text_new".to_string(),
            message: "connection refused".to_string(),
            timed_out: false,
        };
        assert!(transport.is_retryable());
        assert!(!ClientError::Validation("x".to_string()).is_retryable());
        assert!(!ClientError::Upstream {
            status: 500,
            body: String::new()
        }
        .is_retryable());
    }
}
