use thiserror::Error;

/// Gupshup Partner SDK error types
///
/// Every failure inside the SDK surfaces as one of these variants. Nothing is
/// retried internally; use [`GupshupError::is_transient`] to drive an external
/// retry policy.
#[derive(Debug, Error)]
pub enum GupshupError {
    /// Partner login failed (bad credentials, provider outage, transport failure).
    #[error("Authentication failed (status={status_code}): {message}")]
    Authentication {
        message: String,
        status_code: u16,
        response_body: String,
    },

    /// The app token endpoint answered but did not contain a usable token.
    #[error("Token not found in app token response for app {app_id}")]
    TokenNotFound { app_id: String },

    /// Caller passed an unsupported argument. Raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Non-2xx response or transport failure. `status_code` is 0 for transport failures.
    #[error("Gupshup API error (status={status_code}): {message}")]
    Api {
        message: String,
        status_code: u16,
        response_body: String,
    },

    /// A 2xx response whose body was not valid JSON.
    #[error("Response decode error: {message}")]
    Decode {
        message: String,
        response_body: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("App {app_id} not found in partner app list")]
    AppNotFound { app_id: String },
}

impl GupshupError {
    pub(crate) fn api(
        message: impl Into<String>,
        status_code: u16,
        response_body: impl Into<String>,
    ) -> Self {
        Self::Api {
            message: message.into(),
            status_code,
            response_body: response_body.into(),
        }
    }

    pub(crate) fn transport(message: impl Into<String>, error: &reqwest::Error) -> Self {
        Self::api(format!("{}: {}", message.into(), error), 0, String::new())
    }

    /// HTTP status carried by the error, if any. Transport failures report `Some(0)`.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { status_code, .. } | Self::Api { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }

    /// Raw response body carried by the error, if any.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Authentication { response_body, .. }
            | Self::Api { response_body, .. }
            | Self::Decode { response_body, .. } => Some(response_body),
            _ => None,
        }
    }

    /// Whether a retry has a reasonable chance of succeeding.
    ///
    /// Transport failures (status 0), rate limiting (429) and server errors (5xx)
    /// are transient. Decode, argument and token-shape errors are not.
    pub fn is_transient(&self) -> bool {
        match self.status_code() {
            Some(0) | Some(429) => true,
            Some(code) => (500..600).contains(&code),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_error_is_transient() {
        let err = GupshupError::api("connection refused", 0, "");
        assert!(err.is_transient());
        assert_eq!(err.status_code(), Some(0));
    }

    #[test]
    fn test_server_and_rate_limit_errors_are_transient() {
        assert!(GupshupError::api("busy", 503, "").is_transient());
        assert!(GupshupError::api("slow down", 429, "").is_transient());
        assert!(GupshupError::Authentication {
            message: "outage".into(),
            status_code: 502,
            response_body: String::new(),
        }
        .is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        assert!(!GupshupError::api("bad request", 400, "{}").is_transient());
        assert!(!GupshupError::Authentication {
            message: "bad credentials".into(),
            status_code: 401,
            response_body: "{\"error\":\"invalid\"}".into(),
        }
        .is_transient());
        assert!(!GupshupError::InvalidArgument("BOGUS".into()).is_transient());
        assert!(!GupshupError::TokenNotFound {
            app_id: "app-123".into()
        }
        .is_transient());
        assert!(!GupshupError::Decode {
            message: "expected value".into(),
            response_body: "<html>".into(),
        }
        .is_transient());
    }

    #[test]
    fn test_response_body_accessor() {
        let err = GupshupError::api("not found", 404, "{\"status\":\"error\"}");
        assert_eq!(err.response_body(), Some("{\"status\":\"error\"}"));
        assert_eq!(GupshupError::Config("x".into()).response_body(), None);
    }
}
