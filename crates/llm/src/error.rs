use thiserror::Error;

/// Every fallible outcome the translation and dispatch engine can produce, carrying
/// enough information for a caller to render the `{error:{type,message,details,hint}}`
/// envelope without re-deriving it.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The inbound bearer token did not match the configured local API key.
    #[error("missing or invalid bearer token")]
    Unauthorized,

    /// The inbound request, or an admin patch, was malformed.
    #[error("{0}")]
    Validation(String),

    /// The upstream HTTP call failed or returned a non-2xx status.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// The 60s upstream call deadline elapsed.
    #[error("upstream deadline exceeded")]
    Timeout,

    /// A streaming response failed mid-flight, after some events were already emitted.
    #[error("stream failed: {0}")]
    Stream(String),

    /// The upstream stream went 30s without a chunk.
    #[error("stream idled past the timeout")]
    StreamTimeout,

    /// Translation succeeded and the upstream call returned 2xx, but the reply carried
    /// no candidate to translate back.
    #[error("upstream returned no candidate")]
    NoCandidate,

    /// Anything else: persistence failures, unreachable states.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status this error should be reported to the Dialect A client as, when it is
    /// surfaced outside an SSE stream.
    pub fn status_code(&self) -> u16 {
        match self {
            GatewayError::Unauthorized => 401,
            GatewayError::Validation(_) => 400,
            GatewayError::Upstream(_) | GatewayError::NoCandidate => 502,
            GatewayError::Timeout => 504,
            GatewayError::Stream(_) | GatewayError::StreamTimeout => 500,
            GatewayError::Internal(_) => 500,
        }
    }

    /// The Dialect A error `type` string.
    pub fn wire_kind(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized => "authentication_error",
            GatewayError::Validation(_) => "validation_error",
            GatewayError::Upstream(err) => err.kind.wire(),
            GatewayError::Timeout => "timeout_error",
            GatewayError::Stream(_) => "stream_error",
            GatewayError::StreamTimeout => "stream_timeout",
            GatewayError::NoCandidate => "upstream_error",
            GatewayError::Internal(_) => "server_error",
        }
    }

    /// Raw upstream response body, when this error wraps an upstream failure.
    pub fn details(&self) -> Option<&str> {
        match self {
            GatewayError::Upstream(err) => err.details.as_deref(),
            _ => None,
        }
    }
}

/// An upstream HTTP failure, carrying the status-derived Dialect A kind and (when
/// available) the raw response body for diagnostics.
#[derive(Debug, Error)]
#[error("upstream returned {status}: {message}")]
pub struct UpstreamError {
    pub status: u16,
    pub kind: UpstreamErrorKind,
    pub message: String,
    pub details: Option<String>,
}

impl UpstreamError {
    pub fn new(status: u16, message: impl Into<String>, details: Option<String>) -> Self {
        Self {
            status,
            kind: UpstreamErrorKind::from_status(status),
            message: message.into(),
            details,
        }
    }
}

/// Upstream HTTP status bucketed into the Dialect A error vocabulary, per the mapping
/// table in the gateway's error handling design.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    InvalidRequest,
    Authentication,
    Permission,
    RateLimit,
    Overloaded,
    Api,
}

impl UpstreamErrorKind {
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::InvalidRequest,
            401 => Self::Authentication,
            403 => Self::Permission,
            429 => Self::RateLimit,
            500 => Self::Api,
            503 => Self::Overloaded,
            _ => Self::Api,
        }
    }

    pub fn wire(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request_error",
            Self::Authentication => "authentication_error",
            Self::Permission => "permission_error",
            Self::RateLimit => "rate_limit_error",
            Self::Overloaded => "overloaded_error",
            Self::Api => "api_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_upstream_statuses_to_wire_kinds() {
        assert_eq!(UpstreamErrorKind::from_status(400).wire(), "invalid_request_error");
        assert_eq!(UpstreamErrorKind::from_status(401).wire(), "authentication_error");
        assert_eq!(UpstreamErrorKind::from_status(403).wire(), "permission_error");
        assert_eq!(UpstreamErrorKind::from_status(429).wire(), "rate_limit_error");
        assert_eq!(UpstreamErrorKind::from_status(500).wire(), "api_error");
        assert_eq!(UpstreamErrorKind::from_status(503).wire(), "overloaded_error");
        assert_eq!(UpstreamErrorKind::from_status(418).wire(), "api_error");
    }

    #[test]
    fn upstream_errors_always_report_502() {
        let err = GatewayError::Upstream(UpstreamError::new(429, "slow down", None));
        assert_eq!(err.status_code(), 502);
        assert_eq!(err.wire_kind(), "rate_limit_error");
    }

    #[test]
    fn timeout_reports_504() {
        assert_eq!(GatewayError::Timeout.status_code(), 504);
        assert_eq!(GatewayError::Timeout.wire_kind(), "timeout_error");
    }
}
