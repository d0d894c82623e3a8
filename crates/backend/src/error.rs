use serde::Deserialize;

/// PostgreSQL SQLSTATE for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Errors from the persistence client.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The HTTP request itself failed (network, DNS, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A row with the same unique key already exists.
    #[error("Duplicate key violates unique constraint: {0}")]
    Conflict(String),

    /// The backend answered with a non-2xx status.
    #[error("{message}")]
    Api {
        status: u16,
        /// SQLSTATE (row API) or error label (storage API), when present.
        code: Option<String>,
        message: String,
    },

    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// The backend could not be reached or refused the call outright.
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Error body returned by the row API (`{code, message, details, hint}`)
/// or the storage API (`{statusCode, error, message}`).
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    error: Option<String>,
    message: Option<String>,
    details: Option<String>,
}

impl BackendError {
    /// `true` for the duplicate-key condition a repeated upvote produces.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Classify a non-2xx response from its status and raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();

        if parsed.code.as_deref() == Some(UNIQUE_VIOLATION) {
            let detail = parsed
                .details
                .or(parsed.message)
                .unwrap_or_else(|| body.to_string());
            return Self::Conflict(detail);
        }

        let message = parsed
            .message
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("Request failed with status {status}")
                } else {
                    body.to_string()
                }
            });

        Self::Api {
            status,
            code: parsed.code.or(parsed.error),
            message,
        }
    }
}
