//! Socket error classification

use std::io::{self, ErrorKind};

/// Classify socket errors to pick a log level
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Check if error is a client disconnect (broken pipe or connection reset)
    ///
    /// When a client disconnects, we can receive either:
    /// - `BrokenPipe` (os error 32) - writing to a closed socket
    /// - `ConnectionReset` (os error 104) - peer forcibly closed the connection
    #[must_use]
    pub fn is_client_disconnect(error: &io::Error) -> bool {
        matches!(
            error.kind(),
            ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
        )
    }

    /// Check if error is a read or write timeout
    #[must_use]
    pub fn is_timeout(error: &io::Error) -> bool {
        error.kind() == ErrorKind::TimedOut
    }

    /// Errors that are routine for a public server and logged at DEBUG
    #[must_use]
    pub fn is_expected(error: &io::Error) -> bool {
        Self::is_client_disconnect(error) || Self::is_timeout(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broken_pipe_is_disconnect() {
        let err = io::Error::new(ErrorKind::BrokenPipe, "broken pipe");
        assert!(ErrorClassifier::is_client_disconnect(&err));
    }

    #[test]
    fn test_connection_reset_is_disconnect() {
        let err = io::Error::from(ErrorKind::ConnectionReset);
        assert!(ErrorClassifier::is_client_disconnect(&err));
        assert!(ErrorClassifier::is_expected(&err));
    }

    #[test]
    fn test_timeout() {
        let err = io::Error::from(ErrorKind::TimedOut);
        assert!(!ErrorClassifier::is_client_disconnect(&err));
        assert!(ErrorClassifier::is_timeout(&err));
        assert!(ErrorClassifier::is_expected(&err));
    }

    #[test]
    fn test_other_errors_unexpected() {
        let err = io::Error::other("boom");
        assert!(!ErrorClassifier::is_expected(&err));
    }
}
