//! Failure classification for retry decisions.

use crate::hosting::HostingError;

/// Whether a failure is worth retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network-level failures, 429 and 5xx responses.
    Transient,
    /// Everything else: other 4xx, malformed responses, bad credentials.
    Fatal,
}

/// Classify an HTTP status code.
pub fn classify_status(status: u16) -> ErrorClass {
    match status {
        429 => ErrorClass::Transient,
        500..=599 => ErrorClass::Transient,
        _ => ErrorClass::Fatal,
    }
}

/// Classify a hosting failure.
pub fn classify(error: &HostingError) -> ErrorClass {
    match error {
        HostingError::Timeout | HostingError::ConnectionFailed(_) => ErrorClass::Transient,
        HostingError::Api { status, .. } => classify_status(*status),
        HostingError::AuthenticationFailed(_) | HostingError::MalformedResponse(_) => {
            ErrorClass::Fatal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status_rate_limited() {
        assert_eq!(classify_status(429), ErrorClass::Transient);
    }

    #[test]
    fn test_classify_status_server_errors() {
        assert_eq!(classify_status(500), ErrorClass::Transient);
        assert_eq!(classify_status(502), ErrorClass::Transient);
        assert_eq!(classify_status(503), ErrorClass::Transient);
        assert_eq!(classify_status(599), ErrorClass::Transient);
    }

    #[test]
    fn test_classify_status_client_errors() {
        assert_eq!(classify_status(400), ErrorClass::Fatal);
        assert_eq!(classify_status(401), ErrorClass::Fatal);
        assert_eq!(classify_status(404), ErrorClass::Fatal);
        assert_eq!(classify_status(422), ErrorClass::Fatal);
    }

    #[test]
    fn test_classify_network_failures_transient() {
        assert_eq!(classify(&HostingError::Timeout), ErrorClass::Transient);
        assert_eq!(
            classify(&HostingError::ConnectionFailed("reset by peer".to_string())),
            ErrorClass::Transient
        );
    }

    #[test]
    fn test_classify_api_errors_by_status() {
        let server = HostingError::Api {
            status: 503,
            message: "unavailable".to_string(),
        };
        assert_eq!(classify(&server), ErrorClass::Transient);

        let not_found = HostingError::Api {
            status: 404,
            message: "no such upload".to_string(),
        };
        assert_eq!(classify(&not_found), ErrorClass::Fatal);
    }

    #[test]
    fn test_classify_fatal_kinds() {
        assert_eq!(
            classify(&HostingError::MalformedResponse("not json".to_string())),
            ErrorClass::Fatal
        );
        assert_eq!(
            classify(&HostingError::AuthenticationFailed("bad token".to_string())),
            ErrorClass::Fatal
        );
    }
}
