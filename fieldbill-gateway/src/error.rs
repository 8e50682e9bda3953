use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Gateway request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected the query with status {status}: {body}")]
    RemoteRejected { status: StatusCode, body: String },

    #[error("Gateway returned an unexpected body: {message}: {body}")]
    UnexpectedBody { message: String, body: String },

    #[error("Client certificate could not be loaded: {0}")]
    Certificate(String),
}

impl GatewayError {
    /// Whether a retry has a chance of succeeding.
    ///
    /// Timeouts, connection failures and server-side errors are transient.
    /// Client-side rejections and malformed bodies are not; retrying those
    /// repeats the same failure.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::RemoteRejected { status, .. } => status.is_server_error(),
            Self::UnexpectedBody { .. } | Self::Certificate(_) => false,
        }
    }
}
