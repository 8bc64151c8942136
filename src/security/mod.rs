//! Request authorization
//!
//! [`SecurityValidator::authorize`] runs three checks in a fixed order:
//! traversal patterns, the per-client rate limit, then selector shape. Only
//! the rate-limit step has side effects. Sandbox confinement of the resolved
//! path is enforced separately by [`crate::filesystem::FileSystem::resolve`];
//! both must pass.

mod rate_limit;

pub use rate_limit::{RateLimiter, RateState};

use std::net::IpAddr;

use crate::constants::security::{MAX_SELECTOR_LENGTH, TRAVERSAL_PATTERNS};
use crate::error::GopherError;
use crate::protocol::Request;

/// Gatekeeper run on every parsed request before any filesystem access
#[derive(Debug, Clone)]
pub struct SecurityValidator {
    rate_limiter: RateLimiter,
}

impl SecurityValidator {
    #[must_use]
    pub fn new(rate_limiter: RateLimiter) -> Self {
        Self { rate_limiter }
    }

    #[must_use]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    /// Authorize `request` from `client`
    ///
    /// A request rejected for traversal is not counted against the client's
    /// rate budget.
    pub fn authorize(&self, request: &Request, client: IpAddr) -> Result<(), GopherError> {
        let selector = request.selector();
        detect_traversal(selector)?;
        self.rate_limiter.check(client)?;
        validate_selector(selector)
    }
}

/// Reject selectors carrying a literal or encoded traversal sequence
///
/// # Examples
/// ```
/// use gopher_server::security::detect_traversal;
///
/// assert!(detect_traversal("/docs/readme.txt").is_ok());
/// assert!(detect_traversal("/docs/../etc").is_err());
/// assert!(detect_traversal("/%2E%2E/etc").is_err());
/// ```
pub fn detect_traversal(selector: &str) -> Result<(), GopherError> {
    let lowered = selector.to_ascii_lowercase();
    let segment_escape = lowered.split('/').any(|segment| segment == "..");

    if segment_escape || TRAVERSAL_PATTERNS.iter().any(|p| lowered.contains(p)) {
        return Err(GopherError::PathTraversal {
            selector: selector.to_string(),
        });
    }
    Ok(())
}

/// Enforce the selector length limit and printable-ASCII alphabet
pub fn validate_selector(selector: &str) -> Result<(), GopherError> {
    if selector.len() > MAX_SELECTOR_LENGTH {
        return Err(GopherError::SelectorTooLong {
            len: selector.len(),
            max: MAX_SELECTOR_LENGTH,
        });
    }

    if !selector.bytes().all(|b| (0x20..=0x7e).contains(&b)) {
        return Err(GopherError::InvalidSelector);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::RequestCeiling;
    use std::net::Ipv4Addr;
    use std::time::Duration;

    fn client() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    fn validator(max: u32) -> SecurityValidator {
        SecurityValidator::new(RateLimiter::new(
            RequestCeiling::new(max).unwrap(),
            Duration::from_secs(60),
        ))
    }

    fn kind_of(selector: &str) -> Option<ErrorKind> {
        validator(100)
            .authorize(&Request::parse(selector), client())
            .err()
            .map(|e| e.kind())
    }

    #[test]
    fn test_plain_selectors_pass() {
        for s in ["/", "/docs", "/docs/readme.txt", "/a-b_c.d~e", "/file.name.txt"] {
            assert_eq!(kind_of(s), None, "{s}");
        }
    }

    #[test]
    fn test_traversal_variants_rejected() {
        for s in [
            "/../etc/passwd",
            "..",
            "/docs/..",
            "/%2e%2e/etc",
            "/%2E%2E/etc",
            "/%2e./etc",
            "/.%2E/etc",
            "/docs%2fsecret",
            "/docs%5Csecret",
            "/file%00.txt",
            "/docs\\..\\etc",
            "/nul\0byte",
        ] {
            assert_eq!(kind_of(s), Some(ErrorKind::PathTraversal), "{s:?}");
        }
    }

    #[test]
    fn test_single_dot_segment_is_not_traversal() {
        assert!(detect_traversal("/./docs").is_ok());
        assert!(detect_traversal("/.hidden").is_ok());
    }

    #[test]
    fn test_selector_too_long() {
        let long = format!("/{}", "a".repeat(MAX_SELECTOR_LENGTH));
        assert_eq!(kind_of(&long), Some(ErrorKind::SelectorTooLong));

        let exact = format!("/{}", "a".repeat(MAX_SELECTOR_LENGTH - 1));
        assert_eq!(kind_of(&exact), None);
    }

    #[test]
    fn test_control_and_non_ascii_rejected() {
        assert_eq!(kind_of("/bell\x07"), Some(ErrorKind::InvalidSelector));
        assert_eq!(kind_of("/del\x7f"), Some(ErrorKind::InvalidSelector));
        assert_eq!(kind_of("/caf\u{e9}"), Some(ErrorKind::InvalidSelector));
    }

    #[test]
    fn test_rate_limit_checked_after_traversal() {
        let validator = validator(1);
        let req = Request::parse("/ok");
        validator.authorize(&req, client()).unwrap();

        // Traversal wins over the exhausted budget
        let bad = Request::parse("/../x");
        let err = validator.authorize(&bad, client()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PathTraversal);

        let err = validator.authorize(&req, client()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    }

    #[test]
    fn test_rate_limit_checked_before_shape() {
        let validator = validator(1);
        validator
            .authorize(&Request::parse("/ok"), client())
            .unwrap();
        let err = validator
            .authorize(&Request::parse("/bad\x01"), client())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    }

    #[test]
    fn test_shape_failures_still_count_toward_rate() {
        let validator = validator(2);
        let bad = Request::parse("/bad\x01");
        assert!(validator.authorize(&bad, client()).is_err());
        assert!(validator.authorize(&bad, client()).is_err());
        let err = validator
            .authorize(&Request::parse("/ok"), client())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimitExceeded);
    }
}
