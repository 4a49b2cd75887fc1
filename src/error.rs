use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, GmailError>;

/// Everything that can go wrong during a triage run.
///
/// Provider failures are mapped from [`google_gmail1::Error`] by HTTP status.
#[derive(Error, Debug)]
pub enum GmailError {
    /// Unclassified provider failure
    #[error("Gmail API error: {0}")]
    ApiError(String),

    /// Expired refresh token, revoked consent, or no client secret
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// HTTP 429
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    /// HTTP 5xx
    #[error("Server error (HTTP {status}): {message}")]
    ServerError { status: u16, message: String },

    /// HTTP 404, usually a message deleted between listing and fetching
    #[error("Not found: {0}")]
    MessageNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    /// HTTP 403, or a mutation attempted under the read-only scope
    #[error("Access forbidden: {0}")]
    Forbidden(String),

    /// Label could not be resolved or created
    #[error("Label error: {0}")]
    LabelError(String),

    /// Match log, config or report file I/O
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Run report encoding
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl GmailError {
    /// Whether the error must abort the whole run.
    ///
    /// Only authentication failures are run-fatal; everything else is scoped
    /// to the message being processed.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GmailError::AuthError(_))
    }

    /// Rate limits, 5xx and connection failures; the same message may
    /// succeed on a later run
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GmailError::RateLimitExceeded(_)
                | GmailError::ServerError { .. }
                | GmailError::NetworkError(_)
        )
    }
}

impl From<google_gmail1::Error> for GmailError {
    fn from(error: google_gmail1::Error) -> Self {
        match error {
            google_gmail1::Error::Failure(ref response) => {
                let status = response.status();
                let status_code = status.as_u16();
                let message = format!(
                    "HTTP {}: {}",
                    status_code,
                    status.canonical_reason().unwrap_or("Unknown")
                );

                match status_code {
                    401 => GmailError::AuthError(message),
                    429 => GmailError::RateLimitExceeded(message),
                    404 => GmailError::MessageNotFound(message),
                    400 => GmailError::BadRequest(message),
                    403 => GmailError::Forbidden(message),
                    500..=599 => GmailError::ServerError {
                        status: status_code,
                        message,
                    },
                    _ => GmailError::ApiError(message),
                }
            }
            google_gmail1::Error::BadRequest(ref err) => GmailError::BadRequest(format!("{}", err)),
            google_gmail1::Error::MissingToken(ref err) => {
                GmailError::AuthError(format!("Could not obtain access token: {}", err))
            }
            google_gmail1::Error::HttpError(err) => GmailError::NetworkError(err.to_string()),
            google_gmail1::Error::Io(err) => GmailError::NetworkError(err.to_string()),
            _ => GmailError::ApiError(error.to_string()),
        }
    }
}
