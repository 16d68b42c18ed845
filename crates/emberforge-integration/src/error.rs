use thiserror::Error;

/// Failures from the remote generation call
///
/// Everything except `InvalidResponse` means the service could not be
/// reached or did not answer usefully; `InvalidResponse` means it answered
/// with a payload that failed validation. The factory recovers from both by
/// substituting the offline fallback.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Generation service is offline or unreachable")]
    Offline,

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Whether the service was unreachable, as opposed to answering badly
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, ClientError::InvalidResponse(_))
    }

    /// Transient transport failures worth a single retry
    pub fn is_transient(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Offline)
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Offline
        } else if err.is_decode() {
            ClientError::InvalidResponse(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let offline = ClientError::Offline;
        assert!(offline.to_string().contains("offline"));

        let server = ClientError::ServerError {
            status: 500,
            message: "Internal".into(),
        };
        assert!(server.to_string().contains("500"));

        let timeout = ClientError::Timeout;
        assert!(timeout.to_string().contains("timed out"));

        let invalid = ClientError::InvalidResponse("missing name".into());
        assert!(invalid.to_string().contains("missing name"));
    }

    #[test]
    fn test_unavailable_classification() {
        assert!(ClientError::Offline.is_unavailable());
        assert!(ClientError::Timeout.is_unavailable());
        assert!(ClientError::Network("reset".into()).is_unavailable());
        assert!(ClientError::ServerError {
            status: 503,
            message: String::new()
        }
        .is_unavailable());
        assert!(!ClientError::InvalidResponse("bad json".into()).is_unavailable());
    }

    #[test]
    fn test_transient_classification() {
        assert!(ClientError::Timeout.is_transient());
        assert!(ClientError::Offline.is_transient());
        assert!(!ClientError::ServerError {
            status: 500,
            message: String::new()
        }
        .is_transient());
        assert!(!ClientError::InvalidResponse("bad".into()).is_transient());
    }
}
