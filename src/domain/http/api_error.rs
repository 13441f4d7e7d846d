use reqwest::StatusCode;
use thiserror::Error;

/// Classified failure of a single backend request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("could not connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("endpoint {url} not found")]
    NotFound { url: String },

    #[error("server error {status} from {url}: {body}")]
    Server { url: String, status: u16, body: String },

    #[error("request to {url} rejected with {status}: {body}")]
    Client { url: String, status: u16, body: String },

    #[error("could not decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("{0}")]
    Other(String),
}

impl ApiError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout { url: url.to_string() }
        } else if err.is_connect() {
            ApiError::ConnectionFailed { url: url.to_string(), reason: err.to_string() }
        } else if err.is_decode() {
            ApiError::Decode { url: url.to_string(), reason: err.to_string() }
        } else if let Some(status) = err.status() {
            ApiError::from_status(url, status, String::new())
        } else {
            ApiError::Other(err.to_string())
        }
    }

    pub fn from_status(url: &str, status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            404 => ApiError::NotFound { url: url.to_string() },
            code if code >= 500 => ApiError::Server { url: url.to_string(), status: code, body },
            code => ApiError::Client { url: url.to_string(), status: code, body },
        }
    }

    /// True when the backend itself is unreachable or failing, as opposed to rejecting the request.
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ApiError::ConnectionFailed { .. } | ApiError::Timeout { .. } | ApiError::Server { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Message suitable for showing to an operator.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::ConnectionFailed { .. } | ApiError::Timeout { .. } => {
                "Could not connect to the server. Check that the backend is running on port 3003.".to_string()
            }
            ApiError::NotFound { .. } => "Endpoint not found. Check that the application is configured correctly.".to_string(),
            ApiError::Server { .. } => "Internal server error. Try again in a few moments.".to_string(),
            ApiError::Client { status, body, .. } if body.is_empty() => format!("Request rejected by the server ({}).", status),
            ApiError::Client { body, .. } => body.clone(),
            ApiError::Decode { .. } | ApiError::Other(_) => {
                let message = self.to_string();
                if message.is_empty() { "Unknown error while loading data.".to_string() } else { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let url = "http://localhost/api/revenue";
        assert!(ApiError::from_status(url, StatusCode::NOT_FOUND, String::new()).is_not_found());
        assert!(matches!(ApiError::from_status(url, StatusCode::BAD_GATEWAY, String::new()), ApiError::Server { status: 502, .. }));
        assert!(matches!(ApiError::from_status(url, StatusCode::BAD_REQUEST, "no spots".into()), ApiError::Client { status: 400, .. }));
    }

    #[test]
    fn test_unavailable_only_for_backend_failures() {
        let url = "http://localhost/api";
        assert!(ApiError::Timeout { url: url.into() }.is_unavailable());
        assert!(ApiError::ConnectionFailed { url: url.into(), reason: "refused".into() }.is_unavailable());
        assert!(ApiError::from_status(url, StatusCode::SERVICE_UNAVAILABLE, String::new()).is_unavailable());
        assert!(!ApiError::from_status(url, StatusCode::NOT_FOUND, String::new()).is_unavailable());
        assert!(!ApiError::from_status(url, StatusCode::UNPROCESSABLE_ENTITY, String::new()).is_unavailable());
    }

    #[test]
    fn test_user_messages() {
        let url = "http://localhost/api";
        assert!(ApiError::Timeout { url: url.into() }.user_message().starts_with("Could not connect"));
        assert!(ApiError::NotFound { url: url.into() }.user_message().starts_with("Endpoint not found"));
        assert!(ApiError::Server { url: url.into(), status: 500, body: String::new() }.user_message().starts_with("Internal server error"));
        assert_eq!(
            ApiError::Client { url: url.into(), status: 400, body: "Error processing event: No available parking spots".into() }.user_message(),
            "Error processing event: No available parking spots"
        );
    }
}
